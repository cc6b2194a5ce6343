use super::{GenerationError, ParticleBuffer};
use crate::prelude::*;
use rand::prelude::*;
use rayon::prelude::*;

/// Consecutive rejections allowed for one sample before the pass gives up.
/// Within the panel ranges the acceptance rate stays above a few percent.
pub const MAX_REJECTIONS_PER_SAMPLE: u32 = 100_000;

/// Draws a point inside the bulge by rejection sampling, then squashes it.
/// Returns the attempts spent when the cap is reached.
pub fn sample_center<R: Rng + ?Sized>(params: &GalaxyParams, rng: &mut R) -> Result<[f32; 3], u32> {
    let size = params.center_size;
    let threshold = size / 3.0;

    for _ in 0..MAX_REJECTIONS_PER_SAMPLE {
        let x = rng.random::<f32>() * size - size / 3.0;
        let y = rng.random::<f32>() * size - size / 3.0;
        let z = rng.random::<f32>() * size - size / 3.0;

        if x * x + y * y + z * z <= threshold {
            return Ok([x, y / params.center_height, z / params.center_width]);
        }
    }

    Err(MAX_REJECTIONS_PER_SAMPLE)
}

/// Dense ellipsoidal bulge at the origin, `center_count` points, flat colored.
pub fn generate_galactic_center(params: &GalaxyParams) -> Result<ParticleBuffer, GenerationError> {
    let requested = params.center_count as usize;

    let samples: Vec<Result<[f32; 3], u32>> = (0..params.center_count)
        .into_par_iter()
        .map_init(rand::rng, |rng, _| sample_center(params, rng))
        .collect();

    let mut positions = Vec::with_capacity(requested);
    for sample in samples {
        match sample {
            Ok(position) => positions.push(position),
            Err(attempts) => {
                return Err(GenerationError::Stalled {
                    produced: positions.len(),
                    requested,
                    attempts,
                })
            }
        }
    }

    Ok(ParticleBuffer {
        positions,
        colors: None,
    })
}
