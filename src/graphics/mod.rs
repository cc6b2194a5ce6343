use bevy::prelude::*;

mod point_material;
mod point_mesh;

pub use point_material::{GalaxyPointMaterial, PointStyle};
pub use point_mesh::particle_mesh;

pub struct GraphicsPlugin;

impl Plugin for GraphicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(point_material::PointMaterialPlugin);
    }
}
