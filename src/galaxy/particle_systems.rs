use super::{
    apply_regenerate_commands, generate_galactic_center, generate_star_field, GenerationError,
    ParticleBuffer,
};
use crate::graphics::{particle_mesh, GalaxyPointMaterial, PointStyle};
use crate::prelude::*;
use bevy::{
    pbr::NotShadowCaster,
    prelude::*,
    render::view::NoFrustumCulling,
};
use std::time::Instant;

pub struct ParticleSystemsPlugin;

impl Plugin for ParticleSystemsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(InstalledSystems::default()).add_systems(
            Update,
            (apply_regenerate_commands, manage_particle_systems)
                .chain()
                .in_set(GalaxySet::Regenerate),
        );
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GalaxySet {
    Regenerate,
    Animate,
}

/// Tag on the scene entity occupying a slot.
#[derive(Component, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GalaxySlot {
    StarField,
    Center,
}

/// Scene resources of one installed particle system.
#[derive(Debug)]
pub struct InstalledSlot {
    pub entity: Entity,
    pub particle_count: usize,
    mesh: Handle<Mesh>,
    material: Handle<GalaxyPointMaterial>,
}

/// Owner of both slots. Only `manage_particle_systems` mutates it.
#[derive(Resource, Default, Debug)]
pub struct InstalledSystems {
    pub star_field: Option<InstalledSlot>,
    pub center: Option<InstalledSlot>,
    star_generation: i32,
    center_generation: i32,
}

impl InstalledSystems {
    pub fn slot(&self, slot: GalaxySlot) -> Option<&InstalledSlot> {
        match slot {
            GalaxySlot::StarField => self.star_field.as_ref(),
            GalaxySlot::Center => self.center.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: GalaxySlot) -> &mut Option<InstalledSlot> {
        match slot {
            GalaxySlot::StarField => &mut self.star_field,
            GalaxySlot::Center => &mut self.center,
        }
    }

    pub fn any_installed(&self) -> bool {
        self.star_field.is_some() || self.center.is_some()
    }
}

/// Scene-side access needed to swap particle systems in and out.
pub struct SceneAccess<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<GalaxyPointMaterial>,
}

impl SceneAccess<'_, '_, '_> {
    /// Releases mesh and material, then detaches the entity from the scene.
    fn dispose(&mut self, slot: GalaxySlot, installed: InstalledSlot) {
        self.meshes.remove(&installed.mesh);
        self.materials.remove(&installed.material);
        self.commands.entity(installed.entity).despawn();
        debug!(
            "disposed {:?} ({} particles)",
            slot, installed.particle_count
        );
    }

    /// Replaces whatever occupies `slot` with the particles built by `build`.
    /// The previous occupant is released first, whatever `build` returns.
    pub fn install(
        &mut self,
        systems: &mut InstalledSystems,
        slot: GalaxySlot,
        style: &PointStyle,
        build: impl FnOnce() -> Result<ParticleBuffer, GenerationError>,
    ) -> Result<(), GenerationError> {
        self.release(systems, slot);
        let started = Instant::now();
        let buffer = build()?;
        self.attach(systems, slot, style, &buffer, started);
        Ok(())
    }

    /// `install` for builders that cannot fail.
    pub fn install_buffer(
        &mut self,
        systems: &mut InstalledSystems,
        slot: GalaxySlot,
        style: &PointStyle,
        build: impl FnOnce() -> ParticleBuffer,
    ) {
        self.release(systems, slot);
        let started = Instant::now();
        let buffer = build();
        self.attach(systems, slot, style, &buffer, started);
    }

    fn release(&mut self, systems: &mut InstalledSystems, slot: GalaxySlot) {
        if let Some(previous) = systems.slot_mut(slot).take() {
            self.dispose(slot, previous);
        }
    }

    /// An empty buffer leaves the slot empty.
    fn attach(
        &mut self,
        systems: &mut InstalledSystems,
        slot: GalaxySlot,
        style: &PointStyle,
        buffer: &ParticleBuffer,
        started: Instant,
    ) {
        if buffer.is_empty() {
            return;
        }

        let mesh = self.meshes.add(particle_mesh(buffer));
        let material = self.materials.add(GalaxyPointMaterial::new(style));
        let entity = self
            .commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::IDENTITY,
                Visibility::Inherited,
                NotShadowCaster,
                // quads are grown in the shader past the mesh bounds
                NoFrustumCulling,
                slot,
            ))
            .id();

        info!(
            "installed {:?}: {} particles in {:.1} ms",
            slot,
            buffer.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        *systems.slot_mut(slot) = Some(InstalledSlot {
            entity,
            particle_count: buffer.len(),
            mesh,
            material,
        });
    }
}

/// Rebuilds every slot whose generation is behind the parameter store.
/// The star field goes first so a full regeneration installs the center after it.
pub fn manage_particle_systems(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<GalaxyPointMaterial>>,
    mut systems: ResMut<InstalledSystems>,
    galaxy_config: Res<GalaxyConfig>,
) {
    let params = &galaxy_config.params;
    let mut scene = SceneAccess {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &mut materials,
    };

    if systems.star_generation != galaxy_config.star_generation {
        systems.star_generation = galaxy_config.star_generation;

        let style = PointStyle::star_field(params.star_size);
        scene.install_buffer(&mut systems, GalaxySlot::StarField, &style, || {
            generate_star_field(params)
        });
    }

    if systems.center_generation != galaxy_config.center_generation {
        systems.center_generation = galaxy_config.center_generation;

        let style = PointStyle::flat(params.star_size, params.center_color);
        let result = scene.install(&mut systems, GalaxySlot::Center, &style, || {
            if params.has_center() {
                generate_galactic_center(params)
            } else {
                Ok(ParticleBuffer::default())
            }
        });
        if let Err(err) = result {
            warn!("galactic center left empty: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::GalaxyConfigPlugin;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<GalaxyPointMaterial>()
            .add_plugins((GalaxyConfigPlugin, ParticleSystemsPlugin));
        app
    }

    fn slot_entities(app: &mut App, slot: GalaxySlot) -> usize {
        let world = app.world_mut();
        world
            .query::<&GalaxySlot>()
            .iter(world)
            .filter(|tag| **tag == slot)
            .count()
    }

    fn request(app: &mut App, params: GalaxyParams, target: RegenerateTarget) {
        app.world_mut()
            .send_event(RegenerateGalaxy { params, target });
        app.update();
    }

    fn small_params() -> GalaxyParams {
        GalaxyParams {
            star_count: 2000,
            center_count: 500,
            ..default()
        }
    }

    #[test]
    fn startup_installs_both_slots() {
        let mut app = test_app();
        app.update();

        assert_eq!(slot_entities(&mut app, GalaxySlot::StarField), 1);
        assert_eq!(slot_entities(&mut app, GalaxySlot::Center), 1);

        let systems = app.world().resource::<InstalledSystems>();
        let defaults = GalaxyParams::default();
        assert_eq!(
            systems.slot(GalaxySlot::StarField).map(|s| s.particle_count),
            Some(defaults.star_count as usize)
        );
        assert_eq!(
            systems.slot(GalaxySlot::Center).map(|s| s.particle_count),
            Some(defaults.center_count as usize)
        );
    }

    #[test]
    fn repeated_regeneration_keeps_one_system_per_slot() {
        let mut app = test_app();
        app.update();

        for star_count in [1000, 3000, 500, 2000] {
            let params = GalaxyParams {
                star_count,
                ..small_params()
            };
            request(&mut app, params, RegenerateTarget::All);

            assert_eq!(slot_entities(&mut app, GalaxySlot::StarField), 1);
            assert_eq!(slot_entities(&mut app, GalaxySlot::Center), 1);
            assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 2);
            assert_eq!(
                app.world()
                    .resource::<Assets<GalaxyPointMaterial>>()
                    .len(),
                2
            );
            let systems = app.world().resource::<InstalledSystems>();
            assert_eq!(
                systems.star_field.as_ref().map(|s| s.particle_count),
                Some(star_count as usize)
            );
        }
    }

    #[test]
    fn center_command_leaves_star_field_alone() {
        let mut app = test_app();
        app.update();
        request(&mut app, small_params(), RegenerateTarget::All);
        let star_entity = app
            .world()
            .resource::<InstalledSystems>()
            .star_field
            .as_ref()
            .map(|s| s.entity);
        let center_entity = app
            .world()
            .resource::<InstalledSystems>()
            .center
            .as_ref()
            .map(|s| s.entity);

        let params = GalaxyParams {
            center_count: 800,
            ..small_params()
        };
        request(&mut app, params, RegenerateTarget::Center);

        let systems = app.world().resource::<InstalledSystems>();
        assert_eq!(systems.star_field.as_ref().map(|s| s.entity), star_entity);
        assert_ne!(systems.center.as_ref().map(|s| s.entity), center_entity);
        assert_eq!(systems.center.as_ref().map(|s| s.particle_count), Some(800));
        assert_eq!(slot_entities(&mut app, GalaxySlot::Center), 1);
    }

    #[test]
    fn zero_center_count_installs_no_center() {
        let mut app = test_app();
        app.update();

        let params = GalaxyParams {
            center_count: 0,
            ..small_params()
        };
        request(&mut app, params, RegenerateTarget::All);

        assert!(app.world().resource::<InstalledSystems>().center.is_none());
        assert_eq!(slot_entities(&mut app, GalaxySlot::Center), 0);
        assert_eq!(slot_entities(&mut app, GalaxySlot::StarField), 1);
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 1);
    }

    #[test]
    fn base_variant_clears_center() {
        let mut app = test_app();
        app.update();

        let params = GalaxyParams {
            variant: GalaxyVariant::Base,
            ..small_params()
        };
        request(&mut app, params, RegenerateTarget::All);

        assert_eq!(slot_entities(&mut app, GalaxySlot::Center), 0);
        assert_eq!(slot_entities(&mut app, GalaxySlot::StarField), 1);
    }

    #[test]
    fn failed_center_generation_still_releases_previous() {
        let mut app = test_app();
        app.update();
        request(&mut app, small_params(), RegenerateTarget::All);

        let params = GalaxyParams {
            center_count: 5,
            center_size: f32::NAN,
            ..small_params()
        };
        request(&mut app, params, RegenerateTarget::Center);

        assert!(app.world().resource::<InstalledSystems>().center.is_none());
        assert_eq!(slot_entities(&mut app, GalaxySlot::Center), 0);
        assert_eq!(
            app.world()
                .resource::<Assets<GalaxyPointMaterial>>()
                .len(),
            1
        );
    }

    #[test]
    fn star_field_reinstall_despawns_previous_entity() {
        let mut app = test_app();
        app.update();
        let first = app
            .world()
            .resource::<InstalledSystems>()
            .star_field
            .as_ref()
            .map(|s| s.entity);

        let params = GalaxyParams {
            star_count: 1,
            ..small_params()
        };
        request(&mut app, params, RegenerateTarget::All);

        let systems = app.world().resource::<InstalledSystems>();
        let second = systems.star_field.as_ref().map(|s| s.entity);
        assert_eq!(systems.star_field.as_ref().map(|s| s.particle_count), Some(1));
        assert_ne!(first, second);
        assert!(first.is_some_and(|entity| app.world().get_entity(entity).is_err()));
        assert_eq!(slot_entities(&mut app, GalaxySlot::StarField), 1);
    }
}
