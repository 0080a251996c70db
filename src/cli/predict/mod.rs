// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Predict visibility intensities from sky-model sources.

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{
    display_warnings, InfoPrinter, SyntheticArgs, TransformArgs, Warn, ARG_FILE_HELP,
};
use crate::{
    compare::compare_visibilities,
    io::{read_sources, read_visibilities, write_visibilities},
    synthetic::{generate_sources, generate_visibilities, SyntheticParams},
    Accelerator, BatchExecutor, CpuDevice, DeviceKind, DftConfig, DftFloat, HyperdftError,
    Precision, Source,
};

const DEFAULT_OUTPUT_FILENAME: &str = "hyperdft_predicted.txt";
const DEFAULT_TOLERANCE_SINGLE: f64 = 1e-2;
const DEFAULT_TOLERANCE_DOUBLE: f64 = 1e-6;

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("Path to the output visibility file. Default: {DEFAULT_OUTPUT_FILENAME}");

    static ref TOLERANCE_HELP: String =
        format!("The largest allowed difference when comparing. Default: {DEFAULT_TOLERANCE_SINGLE:e} (single precision), {DEFAULT_TOLERANCE_DOUBLE:e} (double precision)");
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct PredictCliArgs {
    /// Path to the sources file. If not given, synthetic sources are used.
    #[clap(short, long, help_heading = "INPUT FILES")]
    pub(super) sources: Option<PathBuf>,

    /// Path to the visibility file. If not given, synthetic visibilities are
    /// used.
    #[clap(short = 'i', long, help_heading = "INPUT FILES")]
    pub(super) visibilities: Option<PathBuf>,

    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    /// Compare the predictions against the brightnesses in the visibility
    /// file, failing if they differ by more than the tolerance.
    #[clap(long, help_heading = "COMPARISON")]
    #[serde(default)]
    pub(super) compare: bool,

    #[clap(long, help = TOLERANCE_HELP.as_str(), help_heading = "COMPARISON")]
    pub(super) tolerance: Option<f64>,
}

impl PredictCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            sources: self.sources.or(other.sources),
            visibilities: self.visibilities.or(other.visibilities),
            output: self.output.or(other.output),
            compare: self.compare || other.compare,
            tolerance: self.tolerance.or(other.tolerance),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct PredictArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "transform")]
    #[serde(default)]
    pub(super) transform_args: TransformArgs,

    #[clap(flatten)]
    #[serde(rename = "synthetic")]
    #[serde(default)]
    pub(super) synthetic_args: SyntheticArgs,

    #[clap(flatten)]
    #[serde(rename = "predict")]
    #[serde(default)]
    pub(super) predict_args: PredictCliArgs,
}

impl PredictArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified
    /// into a single struct. Where applicable, it will prefer CLI parameters
    /// over those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<PredictArgs, HyperdftError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let PredictArgs {
                args_file: _,
                transform_args,
                synthetic_args,
                predict_args,
            } = unpack_arg_file!(arg_file);

            Ok(PredictArgs {
                args_file: None,
                transform_args: cli_args.transform_args.merge(transform_args),
                synthetic_args: cli_args.synthetic_args.merge(synthetic_args),
                predict_args: cli_args.predict_args.merge(predict_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<PredictParams, HyperdftError> {
        debug!("{:#?}", self);

        // Expose all the struct fields to ensure they're all used.
        let PredictArgs {
            args_file: _,
            transform_args,
            synthetic_args,
            predict_args:
                PredictCliArgs {
                    sources,
                    visibilities,
                    output,
                    compare,
                    tolerance,
                },
        } = self;

        let (mut config, device) = transform_args.parse()?;

        if sources.is_some() && synthetic_args.num_sources.is_some() {
            "A sources file was given; ignoring the number of synthetic sources".warn();
        }
        if visibilities.is_some() && synthetic_args.num_visibilities.is_some() {
            "A visibility file was given; ignoring the number of synthetic visibilities".warn();
        }
        let synthetic_params = synthetic_args.parse(&mut config);
        config.validate()?;

        let mut input_printer = InfoPrinter::new("Inputs".into());
        let sources = match sources {
            Some(path) => {
                input_printer.push_line(format!("Sources from {}", path.display()).into());
                SourceInput::File(path)
            }
            None => {
                input_printer.push_line(
                    format!(
                        "{} synthetic sources on a {} cell grid (seed {})",
                        config.num_sources, config.grid_size, synthetic_params.seed
                    )
                    .into(),
                );
                SourceInput::Synthetic {
                    seed: synthetic_params.seed,
                }
            }
        };
        let visibilities = match visibilities {
            Some(path) => {
                input_printer.push_line(format!("Visibilities from {}", path.display()).into());
                VisibilityInput::File(path)
            }
            None => {
                synthetic_params.validate()?;
                input_printer.push_line(
                    format!(
                        "{} synthetic visibilities ({}), |u|,|v| <= {}, |w| <= {}",
                        config.num_visibilities,
                        if synthetic_params.gaussian_distribution {
                            "Gaussian"
                        } else {
                            "uniform"
                        },
                        synthetic_params.max_u,
                        synthetic_params.max_w
                    )
                    .into(),
                );
                VisibilityInput::Synthetic(synthetic_params)
            }
        };
        input_printer.display();

        let tolerance = match (compare, &visibilities) {
            (false, _) => {
                if tolerance.is_some() {
                    "A tolerance was given without --compare; ignoring it".warn();
                }
                None
            }
            (true, VisibilityInput::Synthetic(_)) => {
                return Err(PredictArgsError::CompareWithoutVisibilities.into())
            }
            (true, VisibilityInput::File(_)) => {
                let tolerance = tolerance.unwrap_or(match config.precision {
                    Precision::Single => DEFAULT_TOLERANCE_SINGLE,
                    Precision::Double => DEFAULT_TOLERANCE_DOUBLE,
                });
                if !tolerance.is_finite() || tolerance < 0.0 {
                    return Err(PredictArgsError::BadTolerance(tolerance).into());
                }
                Some(tolerance)
            }
        };

        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        let mut output_printer = InfoPrinter::new("Outputs".into());
        output_printer.push_line(format!("Predictions to {}", output.display()).into());
        if let Some(tolerance) = tolerance {
            output_printer.push_line(format!("Comparing with a tolerance of {tolerance:e}").into());
        }
        output_printer.display();

        display_warnings();

        Ok(PredictParams {
            config,
            device,
            sources,
            visibilities,
            output,
            tolerance,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), HyperdftError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()
    }
}

#[derive(Error, Debug)]
pub(super) enum PredictArgsError {
    #[error("Comparing predictions requires a visibility file with brightnesses to compare against")]
    CompareWithoutVisibilities,

    #[error("The comparison tolerance must be a finite number >= 0; got {0}")]
    BadTolerance(f64),

    #[error("Predictions differ from the visibility file's brightnesses by up to {max_abs_diff:e} (visibility {worst_index}), which is more than the tolerance {tolerance:e}")]
    ComparisonFailed {
        max_abs_diff: f64,
        worst_index: usize,
        tolerance: f64,
    },
}

#[derive(Debug)]
enum SourceInput {
    File(PathBuf),
    Synthetic { seed: u64 },
}

#[derive(Debug)]
enum VisibilityInput {
    File(PathBuf),
    Synthetic(SyntheticParams),
}

/// Everything needed to predict, after the arguments have been checked.
#[derive(Debug)]
struct PredictParams {
    /// The source and visibility counts are only right for synthetic inputs;
    /// they are replaced once everything has been read.
    config: DftConfig,
    device: DeviceKind,
    sources: SourceInput,
    visibilities: VisibilityInput,
    output: PathBuf,
    tolerance: Option<f64>,
}

impl PredictParams {
    fn run(&self) -> Result<(), HyperdftError> {
        match self.device {
            DeviceKind::Cpu => match self.config.precision {
                Precision::Single => self.predict::<f32, _>(CpuDevice::new()),
                Precision::Double => self.predict::<f64, _>(CpuDevice::new()),
            },

            #[cfg(any(feature = "cuda", feature = "hip"))]
            DeviceKind::Gpu => self.predict::<crate::gpu::GpuFloat, _>(crate::gpu::GpuDevice),
        }
    }

    fn predict<F, A>(&self, device: A) -> Result<(), HyperdftError>
    where
        F: DftFloat,
        A: Accelerator<F>,
    {
        debug!("Predicting on {}", device.describe()?);

        let sources: Vec<Source<F>> = match &self.sources {
            SourceInput::File(path) => read_sources(path, &self.config)?,
            SourceInput::Synthetic { seed } => generate_sources(&self.config, *seed),
        };
        let (visibilities, brightness, weights) = match &self.visibilities {
            VisibilityInput::File(path) => {
                let file = read_visibilities(path, &self.config)?;
                (file.visibilities, Some(file.brightness), file.weights)
            }
            VisibilityInput::Synthetic(params) => {
                let visibilities = generate_visibilities(&self.config, params)?;
                let weights = vec![F::one(); visibilities.len()];
                (visibilities, None, weights)
            }
        };

        let config = self.config.with_counts(sources.len(), visibilities.len());
        info!(
            "Predicting {} visibilities from {} sources",
            config.num_visibilities, config.num_sources
        );
        let executor = BatchExecutor::new(device, &config);
        let (intensities, report) = executor.run_new(&sources, &visibilities)?;
        info!(
            "Transform took {:.3?} ({} groups of up to {} workers)",
            report.launch.elapsed, report.geometry.num_groups, report.geometry.group_size
        );

        write_visibilities(&self.output, &visibilities, &intensities, &weights, &config)?;
        info!("Wrote {}", self.output.display());

        if let (Some(tolerance), Some(expected)) = (self.tolerance, brightness) {
            let comparison = compare_visibilities(&expected, &intensities);
            info!(
                "Largest difference: {:e}, RMS difference: {:e}",
                comparison.max_abs_diff, comparison.rms_diff
            );
            if !comparison.within(tolerance) {
                let worst_index = comparison.worst_index.unwrap_or_default();
                warn!(
                    "Visibility {worst_index}: expected {}, predicted {}",
                    expected[worst_index], intensities[worst_index]
                );
                return Err(PredictArgsError::ComparisonFailed {
                    max_abs_diff: comparison.max_abs_diff,
                    worst_index,
                    tolerance,
                }
                .into());
            }
            info!("All predictions are within {tolerance:e} of the expected values");
        }

        Ok(())
    }
}
