// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthetic sources and visibilities, for when there are no files to read.
//!
//! Everything is drawn from a seeded [`StdRng`], so the same seed and
//! configuration always give the same data.

mod error;

pub use error::SyntheticError;

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_MAX_UV, DEFAULT_MAX_W, DEFAULT_SEED, MAX_GAUSSIAN_ATTEMPTS,
        SYNTHETIC_SOURCE_INTENSITY,
    },
    dft::{Source, Visibility},
    DftConfig, DftFloat,
};

/// How synthetic visibility coordinates are drawn. All ranges are inclusive
/// and in wavelengths (before the uv scale is applied).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticParams {
    pub min_u: f64,
    pub max_u: f64,
    pub min_v: f64,
    pub max_v: f64,
    pub min_w: f64,
    pub max_w: f64,

    /// Draw from a normal distribution centred on each range (with a
    /// standard deviation of a sixth of the range) instead of uniformly.
    pub gaussian_distribution: bool,

    pub seed: u64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            min_u: -DEFAULT_MAX_UV,
            max_u: DEFAULT_MAX_UV,
            min_v: -DEFAULT_MAX_UV,
            max_v: DEFAULT_MAX_UV,
            min_w: -DEFAULT_MAX_W,
            max_w: DEFAULT_MAX_W,
            gaussian_distribution: false,
            seed: DEFAULT_SEED,
        }
    }
}

impl SyntheticParams {
    fn ranges(&self) -> [(&'static str, f64, f64); 3] {
        [
            ("u", self.min_u, self.max_u),
            ("v", self.min_v, self.max_v),
            ("w", self.min_w, self.max_w),
        ]
    }

    pub fn validate(&self) -> Result<(), SyntheticError> {
        for (name, min, max) in self.ranges() {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(SyntheticError::BadRange { name, min, max });
            }
        }
        Ok(())
    }
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Make `config.num_sources` sources at uniformly-random positions on a sky of
/// `config.grid_size` cells square, centred on the phase centre. All sources
/// have the same intensity.
pub fn generate_sources<F: DftFloat>(config: &DftConfig, seed: u64) -> Vec<Source<F>> {
    let mut rng = seeded_rng(seed);
    let half_width = config.grid_size as f64 / 2.0;
    let sources = (0..config.num_sources)
        .map(|_| {
            let x = uniform_in_range(&mut rng, -half_width, half_width);
            let y = uniform_in_range(&mut rng, -half_width, half_width);
            Source::new(
                F::demote(x * config.cell_size_rad),
                F::demote(y * config.cell_size_rad),
                F::demote(SYNTHETIC_SOURCE_INTENSITY),
            )
        })
        .collect();
    debug!("Generated {} synthetic sources", config.num_sources);
    sources
}

/// Make `config.num_visibilities` visibilities with coordinates drawn from the
/// ranges in `params`, then multiplied by `config.uv_scale`.
pub fn generate_visibilities<F: DftFloat>(
    config: &DftConfig,
    params: &SyntheticParams,
) -> Result<Vec<Visibility<F>>, SyntheticError> {
    params.validate()?;
    let mut rng = seeded_rng(params.seed);
    let draw = |rng: &mut StdRng, min: f64, max: f64| {
        if params.gaussian_distribution {
            gaussian_in_range(rng, min, max)
        } else {
            Ok(uniform_in_range(rng, min, max))
        }
    };

    let mut visibilities = Vec::with_capacity(config.num_visibilities);
    for _ in 0..config.num_visibilities {
        let u = draw(&mut rng, params.min_u, params.max_u)?;
        let v = draw(&mut rng, params.min_v, params.max_v)?;
        let w = if config.force_zero_w_term {
            0.0
        } else {
            draw(&mut rng, params.min_w, params.max_w)?
        };
        visibilities.push(Visibility::new(
            F::demote(u * config.uv_scale),
            F::demote(v * config.uv_scale),
            F::demote(w * config.uv_scale),
        ));
    }
    debug!(
        "Generated {} synthetic visibilities ({} distribution)",
        visibilities.len(),
        if params.gaussian_distribution {
            "Gaussian"
        } else {
            "uniform"
        }
    );
    Ok(visibilities)
}

fn uniform_in_range<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if min == max {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

/// Draw a normal variate with the Marsaglia polar method, centred on the
/// range with a standard deviation of a sixth of its width, rejecting values
/// outside the range. Every draw (including rejections of the polar method
/// itself) counts against [`MAX_GAUSSIAN_ATTEMPTS`].
pub(crate) fn gaussian_in_range<R: Rng>(
    rng: &mut R,
    min: f64,
    max: f64,
) -> Result<f64, SyntheticError> {
    if min == max {
        return Ok(min);
    }
    let mean = (min + max) / 2.0;
    let std_dev = (max - min) / 6.0;

    for _ in 0..MAX_GAUSSIAN_ATTEMPTS {
        let x: f64 = rng.gen_range(-1.0..1.0);
        let y: f64 = rng.gen_range(-1.0..1.0);
        let s = x * x + y * y;
        if s >= 1.0 || s == 0.0 {
            continue;
        }

        let z = x * (-2.0 * s.ln() / s).sqrt();
        let value = mean + std_dev * z;
        if (min..=max).contains(&value) {
            return Ok(value);
        }
    }

    Err(SyntheticError::GaussianRetriesExhausted {
        attempts: MAX_GAUSSIAN_ATTEMPTS,
        min,
        max,
    })
}
