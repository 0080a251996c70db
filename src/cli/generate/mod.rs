// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Write synthetic sources and visibilities to files, optionally with
//! predicted brightnesses so that `predict --compare` has something to check
//! against.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{display_warnings, InfoPrinter, SyntheticArgs, TransformArgs, ARG_FILE_HELP};
use crate::{
    io::{write_sources, write_visibilities},
    synthetic::{generate_sources, generate_visibilities, SyntheticParams},
    Accelerator, BatchExecutor, CpuDevice, DeviceKind, DftConfig, DftFloat, HyperdftError,
    Precision,
};

const DEFAULT_SOURCES_FILENAME: &str = "hyperdft_sources.txt";
const DEFAULT_VISIBILITIES_FILENAME: &str = "hyperdft_visibilities.txt";

lazy_static::lazy_static! {
    static ref SOURCES_OUTPUT_HELP: String =
        format!("Path to the output sources file. Default: {DEFAULT_SOURCES_FILENAME}");

    static ref VISIBILITIES_OUTPUT_HELP: String =
        format!("Path to the output visibility file. Default: {DEFAULT_VISIBILITIES_FILENAME}");
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct GenerateCliArgs {
    #[clap(long, help = SOURCES_OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) sources_output: Option<PathBuf>,

    #[clap(long, help = VISIBILITIES_OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) visibilities_output: Option<PathBuf>,

    /// Fill the brightness columns of the visibility file with the predicted
    /// intensities of the synthetic sources. Otherwise they are 0.
    #[clap(long, help_heading = "OUTPUT FILES")]
    #[serde(default)]
    pub(super) predict: bool,
}

impl GenerateCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            sources_output: self.sources_output.or(other.sources_output),
            visibilities_output: self.visibilities_output.or(other.visibilities_output),
            predict: self.predict || other.predict,
        }
    }
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct GenerateArgs {
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
    #[serde(rename = "generate")]
    #[serde(default)]
    pub(super) generate_args: GenerateCliArgs,
}

impl GenerateArgs {
    /// Consolidate the command-line arguments with those in the argument file
    /// (if any), preferring the command line.
    pub(super) fn merge(self) -> Result<GenerateArgs, HyperdftError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let GenerateArgs {
                args_file: _,
                transform_args,
                synthetic_args,
                generate_args,
            } = unpack_arg_file!(arg_file);

            Ok(GenerateArgs {
                args_file: None,
                transform_args: cli_args.transform_args.merge(transform_args),
                synthetic_args: cli_args.synthetic_args.merge(synthetic_args),
                generate_args: cli_args.generate_args.merge(generate_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<GenerateParams, HyperdftError> {
        debug!("{:#?}", self);

        let GenerateArgs {
            args_file: _,
            transform_args,
            synthetic_args,
            generate_args:
                GenerateCliArgs {
                    sources_output,
                    visibilities_output,
                    predict,
                },
        } = self;

        let (mut config, device) = transform_args.parse()?;
        let synthetic_params = synthetic_args.parse(&mut config);
        config.validate()?;
        synthetic_params.validate()?;

        let sources_output =
            sources_output.unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCES_FILENAME));
        let visibilities_output =
            visibilities_output.unwrap_or_else(|| PathBuf::from(DEFAULT_VISIBILITIES_FILENAME));
        if sources_output == visibilities_output {
            return Err(GenerateArgsError::SameOutputs(sources_output).into());
        }

        let mut printer = InfoPrinter::new("Synthetic data".into());
        printer.push_block(vec![
            format!(
                "{} sources on a {} cell grid",
                config.num_sources, config.grid_size
            )
            .into(),
            format!("  written to {}", sources_output.display()).into(),
        ]);
        printer.push_block(vec![
            format!(
                "{} visibilities, |u|,|v| <= {}, |w| <= {}",
                config.num_visibilities, synthetic_params.max_u, synthetic_params.max_w
            )
            .into(),
            format!("  written to {}", visibilities_output.display()).into(),
        ]);
        printer.push_line(format!("Seed: {}", synthetic_params.seed).into());
        if predict {
            printer.push_line("Brightnesses are predicted".into());
        }
        printer.display();

        display_warnings();

        Ok(GenerateParams {
            config,
            device,
            synthetic_params,
            sources_output,
            visibilities_output,
            predict,
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
pub(super) enum GenerateArgsError {
    #[error("The sources and visibilities can't both be written to '{}'", .0.display())]
    SameOutputs(PathBuf),
}

#[derive(Debug)]
struct GenerateParams {
    config: DftConfig,
    device: DeviceKind,
    synthetic_params: SyntheticParams,
    sources_output: PathBuf,
    visibilities_output: PathBuf,
    predict: bool,
}

impl GenerateParams {
    fn run(&self) -> Result<(), HyperdftError> {
        match self.device {
            DeviceKind::Cpu => match self.config.precision {
                Precision::Single => self.generate::<f32, _>(CpuDevice::new()),
                Precision::Double => self.generate::<f64, _>(CpuDevice::new()),
            },

            #[cfg(any(feature = "cuda", feature = "hip"))]
            DeviceKind::Gpu => self.generate::<crate::gpu::GpuFloat, _>(crate::gpu::GpuDevice),
        }
    }

    fn generate<F, A>(&self, device: A) -> Result<(), HyperdftError>
    where
        F: DftFloat,
        A: Accelerator<F>,
    {
        let sources = generate_sources::<F>(&self.config, self.synthetic_params.seed);
        write_sources(&self.sources_output, &sources, &self.config)?;
        info!("Wrote {}", self.sources_output.display());

        let visibilities = generate_visibilities::<F>(&self.config, &self.synthetic_params)?;
        let brightness = if self.predict {
            let (intensities, report) =
                BatchExecutor::new(device, &self.config).run_new(&sources, &visibilities)?;
            info!("Predicted brightnesses in {:.3?}", report.launch.elapsed);
            intensities
        } else {
            vec![Complex::default(); visibilities.len()]
        };
        let weights = vec![F::one(); visibilities.len()];
        write_visibilities(
            &self.visibilities_output,
            &visibilities,
            &brightness,
            &weights,
            &self.config,
        )?;
        info!("Wrote {}", self.visibilities_output.display());

        Ok(())
    }
}
