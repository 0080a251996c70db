// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both `predict` and
//! `generate` need to know how to transform and how to synthesise, so those
//! argument groups live here.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::str::FromStr;

use clap::Parser;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use super::HyperdftError;
use crate::{
    constants::{
        DEFAULT_CELL_SIZE_RAD, DEFAULT_FREQUENCY_HZ, DEFAULT_GRID_SIZE,
        DEFAULT_MAX_THREADS_PER_BLOCK, DEFAULT_MAX_UV, DEFAULT_MAX_W, DEFAULT_SEED,
        DEFAULT_UV_SCALE,
    },
    synthetic::SyntheticParams,
    DeviceKind, DftConfig, DirectionCorrection, Precision,
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref PRECISION_HELP: String =
        format!("The floating-point precision of the transform and output files. Supported values: {}. Default: {}. GPU builds only support the precision they were compiled with",
                Precision::iter().join(", "), Precision::default());

    static ref CELL_SIZE_HELP: String =
        format!("The size of a sky cell; source positions are in cells [radians]. Default: {DEFAULT_CELL_SIZE_RAD:e}");

    static ref FREQUENCY_HELP: String =
        format!("The observing frequency, used to convert u, v and w from metres to wavelengths [MHz]. Default: {}", DEFAULT_FREQUENCY_HZ / 1e6);

    static ref THREADS_PER_BLOCK_HELP: String =
        format!("The maximum number of visibilities handled by one group of workers. Default: {DEFAULT_MAX_THREADS_PER_BLOCK}");

    static ref GRID_SIZE_HELP: String =
        format!("The width of the synthetic sky [cells]. Default: {DEFAULT_GRID_SIZE}");

    static ref UV_SCALE_HELP: String =
        format!("Synthetic u, v and w are multiplied by this. Default: {DEFAULT_UV_SCALE}");

    static ref MAX_UV_HELP: String =
        format!("Synthetic u and v are drawn from [-max, max] [wavelengths]. Default: {DEFAULT_MAX_UV}");

    static ref MAX_W_HELP: String =
        format!("Synthetic w is drawn from [-max, max] [wavelengths]. Default: {DEFAULT_MAX_W}");

    static ref SEED_HELP: String =
        format!("The seed of the random-number generator for synthetic data. Default: {DEFAULT_SEED}");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// Deserialise an argument file into whatever type is expected, picking the
/// format from the file's extension. Errors are returned from the enclosing
/// function as [`HyperdftError::ArgFile`].
macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::str::FromStr;

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());
        let contents = match arg_file_type {
            Some(_) => std::fs::read_to_string(&$arg_file)?,
            None => {
                return Err(HyperdftError::ArgFile(format!(
                    "Argument file '{}' doesn't have a recognised file extension! Valid extensions are: {}",
                    $arg_file.display(), *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        };

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                toml::from_str(&contents).map_err(|err| HyperdftError::ArgFile(format!(
                    "Couldn't decode toml structure from '{}':\n{err}",
                    $arg_file.display()
                )))?
            }
            _ => {
                debug!("Parsing json file...");
                serde_json::from_str(&contents).map_err(|err| HyperdftError::ArgFile(format!(
                    "Couldn't decode json structure from '{}':\n{err}",
                    $arg_file.display()
                )))?
            }
        }
    });
}

#[derive(Error, Debug)]
pub(super) enum TransformArgsError {
    #[error("'{0}' is not a valid precision; valid values are: {}", Precision::iter().join(", "))]
    BadPrecision(String),

    #[error("This build of hyperdft uses {device} precision on the GPU, but {requested} precision was requested. Use --cpu, or don't specify a precision")]
    GpuPrecision {
        requested: Precision,
        device: Precision,
    },
}

impl From<TransformArgsError> for HyperdftError {
    fn from(e: TransformArgsError) -> Self {
        Self::Config(e.to_string())
    }
}

/// How the transform is done, and how files are interpreted.
#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct TransformArgs {
    #[clap(long, help = PRECISION_HELP.as_str(), help_heading = "TRANSFORM")]
    pub(super) precision: Option<String>,

    /// Use the exact curved-sky correction (n = sqrt(1 - l^2 - m^2)) rather
    /// than the small-angle approximation.
    #[clap(long, help_heading = "TRANSFORM")]
    #[serde(default)]
    pub(super) exact_correction: bool,

    /// Set the w-coordinate of every visibility to 0.
    #[clap(long, help_heading = "TRANSFORM")]
    #[serde(default)]
    pub(super) force_zero_w: bool,

    /// Flip the signs of u and w when reading and writing visibility files.
    #[clap(long, help_heading = "TRANSFORM")]
    #[serde(default)]
    pub(super) right_ascension: bool,

    #[clap(long, help = CELL_SIZE_HELP.as_str(), help_heading = "TRANSFORM")]
    pub(super) cell_size: Option<f64>,

    #[clap(long, help = FREQUENCY_HELP.as_str(), help_heading = "TRANSFORM")]
    pub(super) frequency: Option<f64>,

    #[clap(long, help = THREADS_PER_BLOCK_HELP.as_str(), help_heading = "TRANSFORM")]
    pub(super) threads_per_block: Option<usize>,

    /// Report the launches of the transform at the debug level only.
    #[clap(long, help_heading = "TRANSFORM")]
    #[serde(default)]
    pub(super) no_messages: bool,

    /// Use the CPU for the transform. This is deliberately made non-default
    /// because using a GPU is much faster.
    #[cfg(any(feature = "cuda", feature = "hip"))]
    #[clap(long, help_heading = "TRANSFORM")]
    #[serde(default)]
    pub(super) cpu: bool,
}

impl TransformArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            precision: self.precision.or(other.precision),
            exact_correction: self.exact_correction || other.exact_correction,
            force_zero_w: self.force_zero_w || other.force_zero_w,
            right_ascension: self.right_ascension || other.right_ascension,
            cell_size: self.cell_size.or(other.cell_size),
            frequency: self.frequency.or(other.frequency),
            threads_per_block: self.threads_per_block.or(other.threads_per_block),
            no_messages: self.no_messages || other.no_messages,
            #[cfg(any(feature = "cuda", feature = "hip"))]
            cpu: self.cpu || other.cpu,
        }
    }

    /// Turn these arguments into a configuration (without source or
    /// visibility counts) and the device to run on.
    pub(super) fn parse(self) -> Result<(DftConfig, DeviceKind), HyperdftError> {
        let TransformArgs {
            precision,
            exact_correction,
            force_zero_w,
            right_ascension,
            cell_size,
            frequency,
            threads_per_block,
            no_messages,
            #[cfg(any(feature = "cuda", feature = "hip"))]
            cpu,
        } = self;

        #[cfg(any(feature = "cuda", feature = "hip"))]
        let device = if cpu { DeviceKind::Cpu } else { DeviceKind::Gpu };
        #[cfg(not(any(feature = "cuda", feature = "hip")))]
        let device = DeviceKind::Cpu;

        let precision = match precision {
            Some(p) => {
                let requested = Precision::from_str(&p.to_lowercase())
                    .map_err(|_| TransformArgsError::BadPrecision(p))?;
                let available = device.get_precision(requested);
                if available != requested {
                    return Err(TransformArgsError::GpuPrecision {
                        requested,
                        device: available,
                    }
                    .into());
                }
                requested
            }
            None => device.get_precision(Precision::default()),
        };

        let config = DftConfig {
            force_zero_w_term: force_zero_w,
            right_ascension,
            precision,
            max_threads_per_block: threads_per_block.unwrap_or(DEFAULT_MAX_THREADS_PER_BLOCK),
            direction_correction: if exact_correction {
                DirectionCorrection::Exact
            } else {
                DirectionCorrection::SmallAngle
            },
            enable_messages: !no_messages,
            cell_size_rad: cell_size.unwrap_or(DEFAULT_CELL_SIZE_RAD),
            frequency_hz: frequency
                .map(|f| f * 1e6) // MHz -> Hz
                .unwrap_or(DEFAULT_FREQUENCY_HZ),
            ..Default::default()
        };

        let mut printer = InfoPrinter::new("Transform".into());
        let mut block = vec![format!("Using the {device} with {precision} precision").into()];
        if let Ok(info) = device.get_device_info() {
            block.push(info.into());
        }
        printer.push_block(block);
        printer.push_line(
            format!(
                "{} direction correction, at most {} threads per block",
                config.direction_correction, config.max_threads_per_block
            )
            .into(),
        );
        printer.push_block(vec![
            format!("Cell size:  {:e} rad", config.cell_size_rad).into(),
            format!("Frequency:  {} MHz", config.frequency_hz / 1e6).into(),
        ]);
        if force_zero_w {
            printer.push_line("Forcing w to 0".into());
        }
        if right_ascension {
            printer.push_line("Flipping the signs of u and w in visibility files".into());
        }
        printer.display();

        Ok((config, device))
    }
}

/// What to synthesise when there are no files to read.
#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct SyntheticArgs {
    /// The number of synthetic sources. Default: 1
    #[clap(long, help_heading = "SYNTHETIC DATA")]
    pub(super) num_sources: Option<usize>,

    /// The number of synthetic visibilities. Default: 1
    #[clap(long, help_heading = "SYNTHETIC DATA")]
    pub(super) num_visibilities: Option<usize>,

    #[clap(long, help = SEED_HELP.as_str(), help_heading = "SYNTHETIC DATA")]
    pub(super) seed: Option<u64>,

    /// Draw synthetic u, v and w from normal distributions centred on their
    /// ranges rather than uniformly.
    #[clap(long, help_heading = "SYNTHETIC DATA")]
    #[serde(default)]
    pub(super) gaussian: bool,

    #[clap(long, help = MAX_UV_HELP.as_str(), help_heading = "SYNTHETIC DATA")]
    pub(super) max_uv: Option<f64>,

    #[clap(long, help = MAX_W_HELP.as_str(), help_heading = "SYNTHETIC DATA")]
    pub(super) max_w: Option<f64>,

    #[clap(long, help = GRID_SIZE_HELP.as_str(), help_heading = "SYNTHETIC DATA")]
    pub(super) grid_size: Option<usize>,

    #[clap(long, help = UV_SCALE_HELP.as_str(), help_heading = "SYNTHETIC DATA")]
    pub(super) uv_scale: Option<f64>,
}

impl SyntheticArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            num_sources: self.num_sources.or(other.num_sources),
            num_visibilities: self.num_visibilities.or(other.num_visibilities),
            seed: self.seed.or(other.seed),
            gaussian: self.gaussian || other.gaussian,
            max_uv: self.max_uv.or(other.max_uv),
            max_w: self.max_w.or(other.max_w),
            grid_size: self.grid_size.or(other.grid_size),
            uv_scale: self.uv_scale.or(other.uv_scale),
        }
    }

    /// Fill in the synthetic parts of `config` and get the parameters for
    /// drawing visibilities.
    pub(super) fn parse(self, config: &mut DftConfig) -> SyntheticParams {
        let SyntheticArgs {
            num_sources,
            num_visibilities,
            seed,
            gaussian,
            max_uv,
            max_w,
            grid_size,
            uv_scale,
        } = self;

        config.num_sources = num_sources.unwrap_or(config.num_sources);
        config.num_visibilities = num_visibilities.unwrap_or(config.num_visibilities);
        config.grid_size = grid_size.unwrap_or(DEFAULT_GRID_SIZE);
        config.uv_scale = uv_scale.unwrap_or(DEFAULT_UV_SCALE);

        let max_uv = max_uv.unwrap_or(DEFAULT_MAX_UV);
        let max_w = max_w.unwrap_or(DEFAULT_MAX_W);
        SyntheticParams {
            min_u: -max_uv,
            max_u: max_uv,
            min_v: -max_uv,
            max_v: max_uv,
            min_w: -max_w,
            max_w,
            gaussian_distribution: gaussian,
            seed: seed.unwrap_or(DEFAULT_SEED),
        }
    }
}
