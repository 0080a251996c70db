// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The configuration of a single DFT run.
//!
//! A [`DftConfig`] is built once (from defaults, an argument file and/or the
//! command line) and then only ever handed out by shared reference, so
//! nothing can change it while a batch is in flight.

mod error;
#[cfg(test)]
mod tests;

pub use error::ConfigError;

use log::Level;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{constants::*, dft::DirectionCorrection};

/// The floating-point precision used for all DFT arithmetic and file
/// formatting.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 32-bit floats.
    #[strum(serialize = "single")]
    Single,

    /// 64-bit floats.
    #[default]
    #[strum(serialize = "double")]
    Double,
}

impl Precision {
    pub fn bits(self) -> u32 {
        match self {
            Precision::Single => 32,
            Precision::Double => 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DftConfig {
    /// The number of sky-model sources given to the DFT.
    pub num_sources: usize,

    /// The number of visibilities to predict.
    pub num_visibilities: usize,

    /// Zero the w-coordinate of every visibility before it is transformed.
    pub force_zero_w_term: bool,

    /// Flip the sign of the u and w coordinates when reading and writing
    /// visibility files (right-ascension sign convention).
    pub right_ascension: bool,

    pub precision: Precision,

    /// The maximum number of work-items in a single parallel group.
    pub max_threads_per_block: usize,

    /// How the curved-sky correction of each source is calculated.
    pub direction_correction: DirectionCorrection,

    /// Report progress at the "info" log level. If false, progress is
    /// reported at the "debug" level.
    pub enable_messages: bool,

    /// The size of a sky cell \[radians\]. Source positions in files are in
    /// cells.
    pub cell_size_rad: f64,

    /// The observing frequency \[Hz\], used to convert visibility coordinates
    /// in files from metres to wavelengths.
    pub frequency_hz: f64,

    /// The width and height of the synthetic sky \[cells\].
    pub grid_size: usize,

    /// Synthesised visibility coordinates are multiplied by this factor.
    pub uv_scale: f64,
}

impl Default for DftConfig {
    fn default() -> Self {
        Self {
            num_sources: 1,
            num_visibilities: 1,
            force_zero_w_term: false,
            right_ascension: false,
            precision: Precision::default(),
            max_threads_per_block: DEFAULT_MAX_THREADS_PER_BLOCK,
            direction_correction: DirectionCorrection::default(),
            enable_messages: true,
            cell_size_rad: DEFAULT_CELL_SIZE_RAD,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            grid_size: DEFAULT_GRID_SIZE,
            uv_scale: DEFAULT_UV_SCALE,
        }
    }
}

impl DftConfig {
    /// Get a copy of this configuration with the source and visibility counts
    /// replaced.
    pub fn with_counts(&self, num_sources: usize, num_visibilities: usize) -> DftConfig {
        DftConfig {
            num_sources,
            num_visibilities,
            ..self.clone()
        }
    }

    /// Check that the values in this configuration can be used for a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_threads_per_block == 0 {
            return Err(ConfigError::ZeroThreadsPerBlock);
        }
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }

        for (name, value) in [
            ("cell size", self.cell_size_rad),
            ("frequency", self.frequency_hz),
            ("uv scale", self.uv_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        Ok(())
    }

    /// The factor that converts metres into wavelengths at the configured
    /// frequency.
    pub fn metres_to_wavelengths(&self) -> f64 {
        self.frequency_hz / VEL_C
    }

    /// The log level used for progress messages.
    pub(crate) fn message_level(&self) -> Level {
        if self.enable_messages {
            Level::Info
        } else {
            Level::Debug
        }
    }
}
