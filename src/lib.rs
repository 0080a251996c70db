// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Direct Fourier transform (DFT) of sky-model point sources into predicted
//! visibilities, on the CPU or a CUDA/HIP-capable GPU.
//!
//! The transform itself is in [`dft`]; [`device`] supplies the accelerators
//! it runs on. Everything else reads, writes or synthesises the inputs.

mod cli;
pub mod compare;
pub mod config;
pub mod constants;
pub mod device;
pub mod dft;
#[cfg(any(feature = "cuda", feature = "hip"))]
pub mod gpu;
pub mod io;
mod precision;
pub mod synthetic;

// Re-exports.
pub use cli::{Hyperdft, HyperdftError};
pub use config::{ConfigError, DftConfig, Precision};
pub use device::{Accelerator, AcceleratorError, CpuDevice, DeviceKind};
pub use dft::{
    extract_visibilities, BatchExecutor, DftError, DftReport, DirectionCorrection, LaunchGeometry,
    Source, Visibility,
};
pub use precision::DftFloat;

pub use num_complex::Complex;
