// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all DFT-related errors.

use thiserror::Error;

use crate::{config::ConfigError, device::AcceleratorError};

#[derive(Error, Debug)]
pub enum DftError {
    #[error("Expected {expected} {what}, but {got} were supplied")]
    InputLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Something went wrong with device memory or the launch. Any device
    /// memory acquired before the failure has been released.
    #[error("Accelerator failure: {0}")]
    Accelerator(#[from] AcceleratorError),
}
