// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::panic::Location;

use thiserror::Error;

/// A failure to acquire, populate, read or compute with device memory.
#[derive(Error, Debug)]
pub enum AcceleratorError {
    #[error("{file}:{line}: Device allocation failed: {msg}")]
    Malloc {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: Copy to device failed: {msg}")]
    CopyToDevice {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: Copy from device failed: {msg}")]
    CopyFromDevice {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: Kernel launch failed: {msg}")]
    Launch {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[cfg(any(feature = "cuda", feature = "hip"))]
    #[error(transparent)]
    Gpu(#[from] crate::gpu::GpuError),
}

#[derive(Clone, Copy)]
pub(super) enum DeviceCall {
    Malloc,
    CopyToDevice,
    CopyFromDevice,
    Launch,
}

impl DeviceCall {
    /// Make an error for this call, attributed to whoever called the function
    /// that called this one.
    #[track_caller]
    pub(super) fn error(self, msg: impl Into<Box<str>>) -> AcceleratorError {
        let msg = msg.into();
        let location = Location::caller();
        let (file, line) = (location.file(), location.line());
        match self {
            DeviceCall::Malloc => AcceleratorError::Malloc { msg, file, line },
            DeviceCall::CopyToDevice => AcceleratorError::CopyToDevice { msg, file, line },
            DeviceCall::CopyFromDevice => AcceleratorError::CopyFromDevice { msg, file, line },
            DeviceCall::Launch => AcceleratorError::Launch { msg, file, line },
        }
    }
}
