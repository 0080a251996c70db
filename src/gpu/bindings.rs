// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rust declarations of the C interface in `src_gpu/dft.h`. `GpuFloat` must be
//! the same type as `FLOAT_T` there, which `build.rs` ensures by defining
//! `SINGLE` with the "gpu-single" feature.

use super::GpuFloat;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub(crate) struct DftSource {
    pub(crate) l: GpuFloat,
    pub(crate) m: GpuFloat,
    pub(crate) intensity: GpuFloat,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub(crate) struct DftVisibility {
    pub(crate) u: GpuFloat,
    pub(crate) v: GpuFloat,
    pub(crate) w: GpuFloat,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub(crate) struct DftComplex {
    pub(crate) re: GpuFloat,
    pub(crate) im: GpuFloat,
}

extern "C" {
    pub(crate) fn extract_visibilities_gpu(
        d_sources: *const DftSource,
        num_sources: i32,
        d_visibilities: *const DftVisibility,
        d_intensities: *mut DftComplex,
        num_visibilities: i32,
        exact_correction: i32,
        num_groups: u32,
        group_size: u32,
        elapsed_ms: *mut f32,
    ) -> *const std::os::raw::c_char;

    pub(crate) fn get_gpu_device_info(
        device: i32,
        name: *mut std::os::raw::c_char,
        device_major: *mut i32,
        device_minor: *mut i32,
        total_global_mem: *mut usize,
        driver_version: *mut i32,
        runtime_version: *mut i32,
    ) -> *const std::os::raw::c_char;
}
