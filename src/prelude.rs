pub use crate::galaxy::{
    GalaxyConfig, GalaxyConfigUi, GalaxyParams, GalaxyVariant, RegenerateGalaxy,
    RegenerateTarget,
};
