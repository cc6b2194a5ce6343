use bevy::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GalaxyVariant {
    /// Spiral arms only
    Base,
    /// Spiral arms plus a galactic center bulge
    #[default]
    Extended,
}

/// Every tunable of the particle field. Always replaced as a whole.
#[derive(Clone, PartialEq, Debug)]
pub struct GalaxyParams {
    pub variant: GalaxyVariant,

    pub star_count: u32,
    pub star_size: f32,
    pub radius: f32,
    pub radius_offset: f32,
    pub branch_count: u32,
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,
    pub inside_color: [f32; 3],
    pub outside_color: [f32; 3],

    pub center_count: u32,
    pub center_size: f32, // rejection sampling envelope, not point size
    pub center_height: f32,
    pub center_width: f32,
    pub center_color: [f32; 3],
}

const fn rgb_u8(r: u8, g: u8, b: u8) -> [f32; 3] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            variant: GalaxyVariant::Extended,
            star_count: 100_000,
            star_size: 0.01,
            radius: 5.0,
            radius_offset: 0.5,
            branch_count: 3,
            spin: 1.0,
            randomness: 0.2,
            randomness_power: 1.7,
            inside_color: rgb_u8(0xff, 0x60, 0x30),
            outside_color: rgb_u8(0x0a, 0x33, 0x85),
            center_count: 20_000,
            center_size: 1.5,
            center_height: 4.0,
            center_width: 1.2,
            center_color: rgb_u8(0xff, 0xc5, 0x8a),
        }
    }
}

impl GalaxyParams {
    pub const MIN: Self = Self {
        variant: GalaxyVariant::Base,
        star_count: 100,
        star_size: 0.001,
        radius: 1.0,
        radius_offset: 0.0,
        branch_count: 2,
        spin: -2.0,
        randomness: 0.0,
        randomness_power: 1.0,
        inside_color: [0.0; 3],
        outside_color: [0.0; 3],
        center_count: 0,
        center_size: 0.1,
        center_height: 1.0,
        center_width: 0.5,
        center_color: [0.0; 3],
    };
    pub const MAX: Self = Self {
        variant: GalaxyVariant::Extended,
        star_count: 200_000,
        star_size: 0.1,
        radius: 12.0,
        radius_offset: 5.0,
        branch_count: 8,
        spin: 2.0,
        randomness: 1.0,
        randomness_power: 10.0,
        inside_color: [1.0; 3],
        outside_color: [1.0; 3],
        center_count: 100_000,
        center_size: 6.0,
        center_height: 10.0,
        center_width: 4.0,
        center_color: [1.0; 3],
    };

    /// Radial bias actually applied by the generator. The base variant has none.
    pub fn effective_radius_offset(&self) -> f32 {
        match self.variant {
            GalaxyVariant::Base => 0.0,
            GalaxyVariant::Extended => self.radius_offset,
        }
    }

    pub fn has_center(&self) -> bool {
        self.variant == GalaxyVariant::Extended
    }
}

/// Which particle systems a command asks to rebuild.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RegenerateTarget {
    /// Star field, and the center after it
    All,
    /// Galactic center only
    Center,
}

impl RegenerateTarget {
    pub fn merge(self, other: Self) -> Self {
        if self == Self::All || other == Self::All {
            Self::All
        } else {
            Self::Center
        }
    }
}

/// Command carrying a full replacement parameter set.
#[derive(Event, Clone, Debug)]
pub struct RegenerateGalaxy {
    pub params: GalaxyParams,
    pub target: RegenerateTarget,
}

/// The parameter store. Generation counters tell the particle system manager
/// which slots are out of date.
#[derive(Resource, Clone, Debug, Default)]
pub struct GalaxyConfig {
    pub params: GalaxyParams,
    pub star_generation: i32,
    pub center_generation: i32,
}

impl GalaxyConfig {
    pub fn apply(&mut self, command: &RegenerateGalaxy) {
        self.params = command.params.clone();
        if command.target == RegenerateTarget::All {
            self.star_generation += 1;
        }
        self.center_generation += 1;
    }
}

/// Draft edited by the tweak panel, only copied into a command when an edit finishes.
#[derive(Resource, Clone, Debug, Default)]
pub struct GalaxyConfigUi(pub GalaxyParams);

pub struct GalaxyConfigPlugin;

impl Plugin for GalaxyConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GalaxyConfig::default())
            .insert_resource(GalaxyConfigUi::default())
            .add_event::<RegenerateGalaxy>()
            .add_systems(Startup, request_initial_galaxy);
    }
}

fn request_initial_galaxy(
    galaxy_config_ui: Res<GalaxyConfigUi>,
    mut regenerate: EventWriter<RegenerateGalaxy>,
) {
    regenerate.write(RegenerateGalaxy {
        params: galaxy_config_ui.0.clone(),
        target: RegenerateTarget::All,
    });
}

/// Applies every pending command to the store, in arrival order.
pub fn apply_regenerate_commands(
    mut requests: EventReader<RegenerateGalaxy>,
    mut galaxy_config: ResMut<GalaxyConfig>,
) {
    for command in requests.read() {
        debug!("applying {:?} regeneration", command.target);
        galaxy_config.apply(command);
    }
}
