use crate::prelude::*;
use bevy::prelude::*;
use rand::prelude::*;
use rayon::prelude::*;
use std::f32::consts::TAU;

/// Positions (and optionally per-particle colors) of one particle system,
/// index aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBuffer {
    pub positions: Vec<[f32; 3]>,
    pub colors: Option<Vec<[f32; 3]>>,
}

impl ParticleBuffer {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Arm a star belongs to. Interleaving by index keeps arm populations within one of each other.
pub fn branch_index(index: u32, branch_count: u32) -> u32 {
    index % branch_count.max(1)
}

pub fn branch_angle(index: u32, branch_count: u32) -> f32 {
    let branch_count = branch_count.max(1);
    TAU * branch_index(index, branch_count) as f32 / branch_count as f32
}

/// Signed jitter whose magnitude is shaped by `randomness_power`.
/// Powers above 1 pull most samples towards zero and leave a long tail.
fn jitter<R: Rng + ?Sized>(rng: &mut R, params: &GalaxyParams, on_radius: f32) -> f32 {
    let magnitude = rng.random::<f32>().powf(params.randomness_power);
    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };

    magnitude * sign * params.randomness * on_radius
}

/// Noiseless arm position for a star at `on_radius` on the arm at `branch_angle`.
pub fn spiral_point(params: &GalaxyParams, on_radius: f32, branch_angle: f32) -> Vec3 {
    let spin_angle = on_radius * params.spin;
    // the offset is already part of the on_radius range; adding it again is intended
    let arm_radius = on_radius + params.effective_radius_offset();
    let angle = branch_angle + spin_angle;

    vec3(angle.sin() * arm_radius, 0.0, angle.cos() * arm_radius)
}

pub fn star_color(params: &GalaxyParams, on_radius: f32) -> Vec3 {
    let outer = params.radius + params.effective_radius_offset();
    let inside = Vec3::from_array(params.inside_color);
    let outside = Vec3::from_array(params.outside_color);

    inside.lerp(outside, on_radius / outer)
}

pub struct StarSample {
    pub on_radius: f32,
    pub position: Vec3,
    pub color: Vec3,
}

pub fn sample_star<R: Rng + ?Sized>(params: &GalaxyParams, index: u32, rng: &mut R) -> StarSample {
    let on_radius = rng.random::<f32>() * (params.radius + params.effective_radius_offset());
    let branch_angle = branch_angle(index, params.branch_count);

    let offset = vec3(
        jitter(rng, params, on_radius),
        jitter(rng, params, on_radius),
        jitter(rng, params, on_radius),
    );

    StarSample {
        on_radius,
        position: spiral_point(params, on_radius, branch_angle) + offset,
        color: star_color(params, on_radius),
    }
}

/// Spiral arm star field. Unseeded: every call gives a different but
/// statistically equivalent buffer of exactly `star_count` stars.
pub fn generate_star_field(params: &GalaxyParams) -> ParticleBuffer {
    let (positions, colors): (Vec<[f32; 3]>, Vec<[f32; 3]>) = (0..params.star_count)
        .into_par_iter()
        .map_init(rand::rng, |rng, index| {
            let star = sample_star(params, index, rng);
            (star.position.to_array(), star.color.to_array())
        })
        .unzip();

    ParticleBuffer {
        positions,
        colors: Some(colors),
    }
}
