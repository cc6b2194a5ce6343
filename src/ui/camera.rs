use super::PanelPointerCapture;
use bevy::{
    input::mouse::{AccumulatedMouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
    transform::TransformSystem,
};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(PostUpdate, camera_control_system.before(TransformSystem::TransformPropagate));
    }
}

const START_POSITION: Vec3 = Vec3::new(3.0, 5.0, 8.0);
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 40.0;
const ROTATE_SPEED: f32 = 0.005;
const DAMPING: f32 = 0.15;
// keep away from the poles, looking_at degenerates there
const MAX_PITCH: f32 = 1.5;

fn spawn_camera(mut commands: Commands, mut clearcolor: ResMut<ClearColor>) {
    *clearcolor = ClearColor(Color::BLACK);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 100.0,
            ..default()
        }),
        Transform::from_translation(START_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        CameraMain::default(),
    ));
}

/// Orbit state around `target_pos`. Drags feed angular velocity that decays every frame.
#[derive(Component, Clone, Debug)]
pub struct CameraMain {
    target_pos: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    smooth_zoom_buffer: f32,
}

impl Default for CameraMain {
    fn default() -> Self {
        Self::looking_from(START_POSITION, Vec3::ZERO)
    }
}

impl CameraMain {
    fn looking_from(eye: Vec3, target_pos: Vec3) -> Self {
        let offset = eye - target_pos;
        let distance = offset.length();
        Self {
            target_pos,
            yaw: f32::atan2(offset.x, offset.z),
            pitch: (offset.y / distance).asin(),
            zoom: (distance - MIN_DISTANCE) / (MAX_DISTANCE - MIN_DISTANCE),
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            smooth_zoom_buffer: 0.0,
        }
    }

    fn distance(&self) -> f32 {
        MIN_DISTANCE + self.zoom * (MAX_DISTANCE - MIN_DISTANCE)
    }

    fn translation(&self) -> Vec3 {
        let direction = vec3(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        );
        self.target_pos + direction * self.distance()
    }

    fn drag(&mut self, delta: Vec2) {
        self.yaw_velocity -= delta.x * ROTATE_SPEED;
        self.pitch_velocity += delta.y * ROTATE_SPEED;
    }

    /// Applies a share of the pending rotation and zoom, then lets it decay.
    fn settle(&mut self) {
        self.yaw += self.yaw_velocity * DAMPING;
        self.pitch = (self.pitch + self.pitch_velocity * DAMPING).clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw_velocity *= 1.0 - DAMPING;
        self.pitch_velocity *= 1.0 - DAMPING;

        // scroll delta is cached to a buffer
        // buffer is converted to actual zoom over time for a smooth zooming effect
        let smooth_zoom_min = 0.001f32;
        let smooth_zoom_factor = 0.2f32;

        let smooth_zoom_amount = if self.smooth_zoom_buffer < 0.0 {
            f32::min(
                self.smooth_zoom_buffer * smooth_zoom_factor,
                (-smooth_zoom_min).max(self.smooth_zoom_buffer),
            )
        } else {
            f32::max(
                self.smooth_zoom_buffer * smooth_zoom_factor,
                smooth_zoom_min.min(self.smooth_zoom_buffer),
            )
        };
        self.zoom = (self.zoom - smooth_zoom_amount).clamp(0., 1.);
        self.smooth_zoom_buffer -= smooth_zoom_amount;
    }
}

pub fn camera_control_system(
    mut query: Query<(&mut Transform, &mut CameraMain)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    pointer_capture: Res<PanelPointerCapture>,
    mut scroll_evr: EventReader<MouseWheel>,
) {
    let Ok((mut transform, mut camera_main)) = query.single_mut() else {
        return;
    };

    if pointer_capture.0 {
        scroll_evr.clear();
    } else {
        if mouse_buttons.pressed(MouseButton::Left) {
            camera_main.drag(mouse_motion.delta);
        }
        for ev in scroll_evr.read() {
            let step = match ev.unit {
                MouseScrollUnit::Line => 0.05,
                MouseScrollUnit::Pixel => 0.002,
            };
            camera_main.smooth_zoom_buffer += ev.y * step;
        }
    }

    camera_main.settle();

    transform.translation = camera_main.translation();
    transform.look_at(camera_main.target_pos, Vec3::Y);
}
