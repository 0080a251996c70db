// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The direct Fourier transform of point sources into visibilities.
//!
//! [`kernel`] holds the per-visibility accumulation, which is a pure function
//! and can be evaluated anywhere. [`extract_visibilities`] runs that kernel
//! over a batch of visibilities on an [`Accelerator`](crate::Accelerator).

mod error;
mod executor;
mod geometry;
pub mod kernel;
mod types;

pub use error::DftError;
pub use executor::{extract_visibilities, BatchExecutor, DftReport};
pub use geometry::LaunchGeometry;
pub use kernel::{DftKernel, DirectionCorrection};
pub use types::{Source, Visibility};
