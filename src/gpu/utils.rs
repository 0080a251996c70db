// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Utilities for CUDA/HIP devices.

use std::{ffi::CStr, os::raw::c_char, panic::Location};

use super::{bindings::get_gpu_device_info, GpuError};

#[derive(Debug, Clone)]
pub(crate) struct GpuDriverInfo {
    /// Formatted CUDA/HIP driver version, e.g. "11.7".
    pub(crate) driver_version: Box<str>,
    /// Formatted CUDA/HIP runtime version, e.g. "11.7".
    pub(crate) runtime_version: Box<str>,
}

#[derive(Debug, Clone)]
pub(crate) struct GpuDeviceInfo {
    pub(crate) name: Box<str>,
    pub(crate) capability: Box<str>,
    /// \[MebiBytes (MiB)\]
    pub(crate) total_global_mem: usize,
}

/// Get CUDA/HIP device and driver information for device 0.
#[track_caller]
pub(crate) fn get_device_info() -> Result<(GpuDeviceInfo, GpuDriverInfo), GpuError> {
    let device = 0;
    let mut name: [c_char; 256] = [0; 256];
    let mut device_major = 0;
    let mut device_minor = 0;
    let mut total_global_mem = 0;
    let mut driver_version = 0;
    let mut runtime_version = 0;
    unsafe {
        let error_message_ptr = get_gpu_device_info(
            device,
            name.as_mut_ptr(),
            &mut device_major,
            &mut device_minor,
            &mut total_global_mem,
            &mut driver_version,
            &mut runtime_version,
        );
        if !error_message_ptr.is_null() {
            let error_message = CStr::from_ptr(error_message_ptr).to_string_lossy();
            let location = Location::caller();
            return Err(GpuError::Generic {
                msg: error_message.into(),
                file: location.file(),
                line: location.line(),
            });
        }
    }

    // The GPU code always null-terminates the name.
    let name = unsafe { CStr::from_ptr(name.as_ptr()) }.to_string_lossy();
    let device_info = GpuDeviceInfo {
        name: name.into(),
        capability: format!("{device_major}.{device_minor}").into_boxed_str(),
        total_global_mem: total_global_mem / 1048576,
    };

    #[cfg(feature = "cuda")]
    let (driver_version, runtime_version) = (
        format_version(driver_version, 1000, 10),
        format_version(runtime_version, 1000, 10),
    );
    #[cfg(feature = "hip")]
    let (driver_version, runtime_version) = (
        format_version(driver_version, 10_000_000, 10_000),
        format_version(runtime_version, 10_000_000, 10_000),
    );

    Ok((
        device_info,
        GpuDriverInfo {
            driver_version,
            runtime_version,
        },
    ))
}

/// CUDA encodes versions as `1000 * major + 10 * minor`; HIP as
/// `10_000_000 * major + 10_000 * minor + patch`.
fn format_version(version: i32, major_div: i32, minor_div: i32) -> Box<str> {
    format!("{}.{}", version / major_div, (version / minor_div) % 100).into_boxed_str()
}
