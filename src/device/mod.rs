// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Devices that can run the DFT kernel.
//!
//! An [`Accelerator`] owns its own memory space. The batch executor moves
//! inputs into that space, asks the device to run the kernel over a
//! [`LaunchGeometry`], and moves the results back out. Device buffers are
//! released when they are dropped.

mod cpu;
mod error;

pub use cpu::{CpuDevice, HostBuffer};
pub use error::AcceleratorError;

use std::time::Duration;

use num_complex::Complex;
use strum_macros::Display;

use crate::{
    dft::{DftKernel, LaunchGeometry, Source, Visibility},
    DftFloat, Precision,
};

/// Element types that may live in device memory.
pub trait DeviceData: bytemuck::Pod + Send + Sync {}
impl<T: bytemuck::Pod + Send + Sync> DeviceData for T {}

/// A device that runs the DFT kernel in precision `F`.
pub trait Accelerator<F: DftFloat> {
    /// Memory owned by the device. Dropping it releases the memory.
    type Buffer<T: DeviceData>;

    /// What kind of device this is.
    fn kind(&self) -> DeviceKind;

    /// A one-line, human-readable description of the device.
    fn describe(&self) -> Result<String, AcceleratorError>;

    /// Allocate space for `len` elements.
    fn malloc<T: DeviceData>(&self, len: usize) -> Result<Self::Buffer<T>, AcceleratorError>;

    /// Copy `src` into `buffer`. Their lengths must match.
    fn copy_to_device<T: DeviceData>(
        &self,
        buffer: &mut Self::Buffer<T>,
        src: &[T],
    ) -> Result<(), AcceleratorError>;

    /// Copy `buffer` into `dst`. Their lengths must match.
    fn copy_from_device<T: DeviceData>(
        &self,
        buffer: &Self::Buffer<T>,
        dst: &mut [T],
    ) -> Result<(), AcceleratorError>;

    /// Block until all outstanding device work has completed.
    fn synchronise(&self) -> Result<(), AcceleratorError>;

    /// Run `kernel` over `geometry`. This returns once every worker has
    /// finished.
    fn launch(
        &self,
        geometry: &LaunchGeometry,
        kernel: &DftKernel,
        sources: &Self::Buffer<Source<F>>,
        visibilities: &Self::Buffer<Visibility<F>>,
        intensities: &mut Self::Buffer<Complex<F>>,
    ) -> Result<LaunchReport, AcceleratorError>;
}

/// What happened during a kernel launch. This is diagnostic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchReport {
    /// The time taken by the kernel, as measured by the device.
    pub elapsed: Duration,

    /// The number of workers scheduled by the launch geometry.
    pub workers_launched: usize,

    /// The number of workers that wrote a result. Only devices that can count
    /// this report it.
    pub workers_active: Option<usize>,
}

/// The kinds of device available to this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeviceKind {
    /// The CPU, emulating an accelerator with a thread pool. The precision is
    /// chosen at runtime.
    #[strum(serialize = "CPU")]
    Cpu,

    /// A CUDA- or HIP-capable device. The precision depends on the compile
    /// features used.
    #[cfg(any(feature = "cuda", feature = "hip"))]
    #[strum(serialize = "GPU")]
    Gpu,
}

impl DeviceKind {
    /// The precision this device computes in, given the precision that was
    /// asked for.
    pub fn get_precision(self, requested: Precision) -> Precision {
        match self {
            DeviceKind::Cpu => requested,

            #[cfg(feature = "gpu-single")]
            DeviceKind::Gpu => Precision::Single,

            #[cfg(all(any(feature = "cuda", feature = "hip"), not(feature = "gpu-single")))]
            DeviceKind::Gpu => Precision::Double,
        }
    }

    /// Get a formatted string with information on the device.
    pub fn get_device_info(self) -> Result<String, AcceleratorError> {
        match self {
            DeviceKind::Cpu => Ok(get_cpu_info()),

            #[cfg(any(feature = "cuda", feature = "hip"))]
            DeviceKind::Gpu => {
                let (device_info, driver_info) = crate::gpu::get_device_info()?;
                #[cfg(feature = "cuda")]
                let device_type = "CUDA";
                #[cfg(feature = "hip")]
                let device_type = "HIP";
                Ok(format!(
                    "{} (capability {}, {} MiB), {device_type} driver {}, runtime {}",
                    device_info.name,
                    device_info.capability,
                    device_info.total_global_mem,
                    driver_info.driver_version,
                    driver_info.runtime_version
                ))
            }
        }
    }
}

/// Get a formatted string with information on the host CPU.
pub(crate) fn get_cpu_info() -> String {
    let num_threads = rayon::current_num_threads();

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        // Non-exhaustive but perhaps most-interesting CPU features.
        let avx = std::arch::is_x86_feature_detected!("avx");
        let avx2 = std::arch::is_x86_feature_detected!("avx2");
        let avx512 = std::arch::is_x86_feature_detected!("avx512f");

        let features = match (avx512, avx2, avx) {
            (true, _, _) => "AVX512 available",
            (false, true, _) => "AVX2 available",
            (false, false, true) => "AVX available",
            (false, false, false) => "AVX unavailable!",
        };
        format!(
            "{} CPU ({features}), {num_threads} threads",
            std::env::consts::ARCH
        )
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    format!("{} CPU, {num_threads} threads", std::env::consts::ARCH)
}
