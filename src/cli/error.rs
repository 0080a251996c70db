// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all hyperdft-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::{generate::GenerateArgsError, predict::PredictArgsError};
use crate::{
    io::{ReadSourcesError, ReadVisibilitiesError, WriteError},
    synthetic::SyntheticError,
    AcceleratorError, ConfigError, DftError,
};

/// The *only* publicly visible error from hyperdft. Where there's something
/// the user can do about an error, the message says so.
#[derive(Error, Debug)]
pub enum HyperdftError {
    /// An error related to predict.
    #[error("{0}\n\nSee `hyperdft predict --help` for the available options")]
    Predict(String),

    /// An error related to generate.
    #[error("{0}\n\nSee `hyperdft generate --help` for the available options")]
    Generate(String),

    /// The configuration can't be used.
    #[error("{0}\n\nCheck the transform options (e.g. --cell-size, --frequency, --threads-per-block)")]
    Config(String),

    /// An error reading or writing source files.
    #[error("{0}\n\nSource files have a count line, then one 'x y intensity' line per source")]
    SourceFile(String),

    /// An error reading or writing visibility files.
    #[error("{0}\n\nVisibility files have a count line, then one 'u v w re im weight' line per visibility")]
    VisFile(String),

    /// Predictions didn't agree with the expected values.
    #[error("{0}")]
    Comparison(String),

    /// An error from the CPU or GPU doing the work.
    #[error("{0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv)")]
    Accelerator(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files must be toml or json, with one table per argument group")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<PredictArgsError> for HyperdftError {
    fn from(e: PredictArgsError) -> Self {
        match e {
            PredictArgsError::ComparisonFailed { .. } => Self::Comparison(e.to_string()),
            _ => Self::Predict(e.to_string()),
        }
    }
}

impl From<GenerateArgsError> for HyperdftError {
    fn from(e: GenerateArgsError) -> Self {
        Self::Generate(e.to_string())
    }
}

impl From<ConfigError> for HyperdftError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<DftError> for HyperdftError {
    fn from(e: DftError) -> Self {
        match e {
            DftError::Config(e) => Self::from(e),
            DftError::Accelerator(e) => Self::from(e),
            DftError::InputLength { .. } => Self::Generic(e.to_string()),
        }
    }
}

impl From<AcceleratorError> for HyperdftError {
    fn from(e: AcceleratorError) -> Self {
        Self::Accelerator(e.to_string())
    }
}

impl From<ReadSourcesError> for HyperdftError {
    fn from(e: ReadSourcesError) -> Self {
        Self::SourceFile(e.to_string())
    }
}

impl From<ReadVisibilitiesError> for HyperdftError {
    fn from(e: ReadVisibilitiesError) -> Self {
        Self::VisFile(e.to_string())
    }
}

impl From<WriteError> for HyperdftError {
    fn from(e: WriteError) -> Self {
        match e {
            WriteError::IO(e) => Self::from(e),
            WriteError::LengthMismatch { .. } => Self::Generic(e.to_string()),
        }
    }
}

impl From<SyntheticError> for HyperdftError {
    fn from(e: SyntheticError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for HyperdftError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
