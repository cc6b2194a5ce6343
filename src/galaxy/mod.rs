mod animation;
mod error;
mod galactic_center;
mod galaxy_config;
mod particle_systems;
mod star_field;

pub use animation::GalaxyAnimationPlugin;
pub use error::GenerationError;
pub use galactic_center::generate_galactic_center;
pub use galaxy_config::{
    apply_regenerate_commands, GalaxyConfig, GalaxyConfigPlugin, GalaxyConfigUi, GalaxyParams,
    GalaxyVariant, RegenerateGalaxy, RegenerateTarget,
};
pub use particle_systems::{GalaxySet, GalaxySlot, InstalledSystems, ParticleSystemsPlugin};
pub use star_field::{generate_star_field, ParticleBuffer};
