use super::{GalaxySet, GalaxySlot, InstalledSystems};
use bevy::prelude::*;

pub struct GalaxyAnimationPlugin;

impl Plugin for GalaxyAnimationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AnimationState>().add_systems(
            Update,
            rotate_particle_systems
                .in_set(GalaxySet::Animate)
                .after(GalaxySet::Regenerate),
        );
    }
}

#[derive(Resource, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnimationState {
    #[default]
    Idle,
    Running,
}

/// Seconds per radian of y rotation. The center turns slower than the arms.
fn rotation_divisor(slot: GalaxySlot) -> f32 {
    match slot {
        GalaxySlot::StarField => 36.0,
        GalaxySlot::Center => 42.0,
    }
}

/// Y rotation of a slot after `elapsed` seconds of wall-clock time.
pub fn slot_rotation(slot: GalaxySlot, elapsed: f32) -> f32 {
    -elapsed / rotation_divisor(slot)
}

fn rotate_particle_systems(
    time: Res<Time<Real>>,
    systems: Res<InstalledSystems>,
    mut state: ResMut<AnimationState>,
    mut transforms: Query<&mut Transform>,
) {
    if *state == AnimationState::Idle {
        if !systems.any_installed() {
            return;
        }
        *state = AnimationState::Running;
    }

    let elapsed = time.elapsed_secs();
    for slot in [GalaxySlot::StarField, GalaxySlot::Center] {
        let Some(installed) = systems.slot(slot) else {
            continue;
        };
        // freshly installed entities only exist once commands are applied
        if let Ok(mut transform) = transforms.get_mut(installed.entity) {
            transform.rotation = Quat::from_rotation_y(slot_rotation(slot, elapsed));
        }
    }
}
