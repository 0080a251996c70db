// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! GPU code to be used by hyperdft.

#![allow(non_snake_case)]
#![allow(clippy::upper_case_acronyms)]

mod bindings;
#[cfg(test)]
mod tests;
mod utils;

use std::{
    ffi::{c_void, CStr},
    panic::Location,
    ptr::null_mut,
    time::Duration,
};

use log::trace;
use num_complex::Complex;
use thiserror::Error;

pub(crate) use utils::get_device_info;

use crate::{
    device::{Accelerator, AcceleratorError, DeviceData, DeviceKind, LaunchReport},
    dft::{DftKernel, DirectionCorrection, LaunchGeometry, Source, Visibility},
};

// The precision of the GPU code is fixed when it is compiled.
cfg_if::cfg_if! {
    if #[cfg(feature = "gpu-single")] {
        /// f32 (using the "gpu-single" feature)
        pub type GpuFloat = f32;
    } else {
        /// f64 (not using "gpu-single")
        pub type GpuFloat = f64;
    }
}

// Import CUDA/HIP functions into the same names.
#[cfg(feature = "cuda")]
use cuda_runtime_sys::{
    cudaDeviceSynchronize as gpuDeviceSynchronize, cudaError::cudaSuccess as gpuSuccess,
    cudaFree as gpuFree, cudaGetErrorString as gpuGetErrorString,
    cudaGetLastError as gpuGetLastError, cudaMalloc as gpuMalloc, cudaMemcpy as gpuMemcpy,
    cudaMemcpyKind::cudaMemcpyDeviceToHost as gpuMemcpyDeviceToHost,
    cudaMemcpyKind::cudaMemcpyHostToDevice as gpuMemcpyHostToDevice,
    cudaMemset as gpuMemset,
};
#[cfg(feature = "hip")]
use hip_sys::hiprt::{
    hipDeviceSynchronize as gpuDeviceSynchronize, hipError_t::hipSuccess as gpuSuccess,
    hipFree as gpuFree, hipGetErrorString as gpuGetErrorString, hipGetLastError as gpuGetLastError,
    hipMalloc as gpuMalloc, hipMemcpy as gpuMemcpy,
    hipMemcpyKind::hipMemcpyDeviceToHost as gpuMemcpyDeviceToHost,
    hipMemcpyKind::hipMemcpyHostToDevice as gpuMemcpyHostToDevice, hipMemset as gpuMemset,
};

#[cfg(feature = "cuda")]
const API_PREFIX: &str = "cuda";
#[cfg(feature = "hip")]
const API_PREFIX: &str = "hip";

// The Rust types are handed to the GPU code as the C types.
static_assertions::assert_eq_size!(Source<GpuFloat>, bindings::DftSource);
static_assertions::assert_eq_align!(Source<GpuFloat>, bindings::DftSource);
static_assertions::assert_eq_size!(Visibility<GpuFloat>, bindings::DftVisibility);
static_assertions::assert_eq_align!(Visibility<GpuFloat>, bindings::DftVisibility);
static_assertions::assert_eq_size!(Complex<GpuFloat>, bindings::DftComplex);
static_assertions::assert_eq_align!(Complex<GpuFloat>, bindings::DftComplex);

macro_rules! gpu_kernel_call {
    ($gpu_fn:path, $($args:expr),* $(,)?) => {{
        #[allow(unused_unsafe)]
        unsafe {
            let error_message_ptr = $gpu_fn($($args),*);
            if error_message_ptr.is_null() {
                Ok(())
            } else {
                // Get the GPU error message behind the pointer.
                let error_message = std::ffi::CStr::from_ptr(error_message_ptr).to_string_lossy();
                Err(GpuError::Kernel {
                    msg: format!("{}: {error_message}", stringify!($gpu_fn)).into(),
                    file: file!(),
                    line: line!(),
                })
            }
        }
    }};
}
pub(crate) use gpu_kernel_call;

#[derive(Clone, Copy)]
pub(crate) enum GpuCall {
    Malloc,
    CopyToDevice,
    CopyFromDevice,
    Memset,
    Synchronise,
}

impl GpuCall {
    #[track_caller]
    fn error(self, msg: impl Into<Box<str>>) -> GpuError {
        let msg = msg.into();
        let location = Location::caller();
        let (file, line) = (location.file(), location.line());
        match self {
            GpuCall::Malloc => GpuError::Malloc { msg, file, line },
            GpuCall::CopyToDevice => GpuError::CopyToDevice { msg, file, line },
            GpuCall::CopyFromDevice => GpuError::CopyFromDevice { msg, file, line },
            GpuCall::Memset | GpuCall::Synchronise => GpuError::Generic { msg, file, line },
        }
    }
}

/// Run [`gpuGetLastError`] (and, in debug mode or when asked to synchronise,
/// [`gpuDeviceSynchronize`]). If either of these calls return an error, it is
/// converted to a Rust error and returned from this function. The single
/// argument describes what the just-performed operation was and makes the
/// returned error a helpful one.
///
/// # Safety
///
/// This function interfaces directly with the CUDA/HIP API. Rust errors attempt
/// to catch problems but there are no guarantees.
#[track_caller]
unsafe fn check_for_errors(gpu_call: GpuCall) -> Result<(), GpuError> {
    // Only do a device sync if we're in debug mode, for performance.
    let debug_mode = matches!(std::env::var("DEBUG").as_deref(), Ok("true"));
    if debug_mode || matches!(gpu_call, GpuCall::Synchronise) {
        let code = gpuDeviceSynchronize();
        if code != gpuSuccess {
            let msg = CStr::from_ptr(gpuGetErrorString(code)).to_string_lossy();
            return Err(gpu_call.error(msg));
        }
    }

    let code = gpuGetLastError();
    if code != gpuSuccess {
        let msg = CStr::from_ptr(gpuGetErrorString(code)).to_string_lossy();
        return Err(gpu_call.error(msg));
    }

    Ok(())
}

/// A Rust-managed pointer to GPU device memory. When this is dropped,
/// [`gpuFree`] is called on the pointer.
#[derive(Debug)]
pub struct DevicePointer<T> {
    pub(crate) ptr: *mut T,

    /// The number of bytes allocated against `ptr`.
    size: usize,
}

impl<T> Drop for DevicePointer<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                gpuFree(self.ptr.cast());
            }
        }
    }
}

impl<T> DevicePointer<T> {
    /// Get a const pointer to the device memory.
    pub(crate) fn get(&self) -> *const T {
        self.ptr as *const T
    }

    /// Get a mutable pointer to the device memory.
    pub(crate) fn get_mut(&mut self) -> *mut T {
        self.ptr
    }

    /// The the number of bytes allocated in this [`DevicePointer`].
    pub fn get_size(&self) -> usize {
        self.size
    }

    /// Get the number of elements allocated against the buffer.
    pub fn get_num_elements(&self) -> usize {
        match std::mem::size_of::<T>() {
            0 => 0,
            s => self.size / s,
        }
    }

    /// Allocate a number of bytes on the device.
    #[track_caller]
    pub(crate) fn malloc(size: usize) -> Result<DevicePointer<T>, GpuError> {
        if size == 0 {
            Ok(Self::default())
        } else {
            let mut d_ptr = std::ptr::null_mut();
            unsafe {
                gpuMalloc(&mut d_ptr, size);
                check_for_errors(GpuCall::Malloc)?;
            }
            Ok(Self {
                ptr: d_ptr.cast(),
                size,
            })
        }
    }

    /// Re-allocate a number of bytes on the device. Nothing is done if `size`
    /// is smaller than `self.size`. The original bytes are not preserved if a
    /// new buffer is made.
    #[track_caller]
    fn realloc(&mut self, size: usize) -> Result<(), GpuError> {
        if size <= self.size {
            return Ok(());
        }

        let mut new = Self::malloc(size)?;
        std::mem::swap(self, &mut new);
        Ok(())
    }

    /// Copy a slice of data to a new allocation on the device.
    #[cfg(test)]
    #[track_caller]
    pub(crate) fn copy_to_device(v: &[T]) -> Result<DevicePointer<T>, GpuError> {
        let mut d_ptr = Self::malloc(std::mem::size_of_val(v))?;
        d_ptr.overwrite(v)?;
        Ok(d_ptr)
    }

    /// Copy a slice of data from the device. There must be an equal number of
    /// bytes in the `DevicePointer` and `v`. The contents of `v` are
    /// overwritten.
    #[track_caller]
    pub(crate) fn copy_from_device(&self, v: &mut [T]) -> Result<(), GpuError> {
        if self.ptr.is_null() {
            return Err(GpuCall::CopyFromDevice
                .error("Attempted to copy data from a null device pointer"));
        }

        let size = std::mem::size_of_val(v);
        if size != self.size {
            return Err(GpuCall::CopyFromDevice.error(format!(
                "Device buffer size {} is not equal to provided buffer size {size} (length {})",
                self.size,
                v.len()
            )));
        }

        unsafe {
            gpuMemcpy(
                v.as_mut_ptr().cast(),
                self.ptr.cast(),
                size,
                gpuMemcpyDeviceToHost,
            );
            check_for_errors(GpuCall::CopyFromDevice)
        }
    }

    /// Overwrite the device memory allocated against this [`DevicePointer`]
    /// with `v`. If `v` is bigger than what is already allocated, the buffer
    /// is re-allocated first.
    #[track_caller]
    pub(crate) fn overwrite(&mut self, v: &[T]) -> Result<(), GpuError> {
        // Nothing to do if the collection is empty.
        if v.is_empty() {
            return Ok(());
        }

        let size = std::mem::size_of_val(v);
        self.realloc(size)?;
        unsafe {
            gpuMemcpy(
                self.get_mut() as *mut c_void,
                v.as_ptr().cast(),
                size,
                gpuMemcpyHostToDevice,
            );
            check_for_errors(GpuCall::CopyToDevice)
        }
    }

    /// Clear all of the bytes in the buffer by writing zeros.
    #[track_caller]
    pub(crate) fn clear(&mut self) -> Result<(), GpuError> {
        if self.size == 0 {
            return Ok(());
        }
        unsafe {
            let code = gpuMemset(self.get_mut().cast(), 0, self.size);
            if code != gpuSuccess {
                let msg = CStr::from_ptr(gpuGetErrorString(code)).to_string_lossy();
                return Err(GpuCall::Memset.error(msg));
            }
            check_for_errors(GpuCall::Memset)
        }
    }
}

impl<T> Default for DevicePointer<T> {
    fn default() -> Self {
        Self {
            ptr: null_mut(),
            size: 0,
        }
    }
}

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("{file}:{line}: {}Memcpy to device failed: {msg}", API_PREFIX)]
    CopyToDevice {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: {}Memcpy from device failed: {msg}", API_PREFIX)]
    CopyFromDevice {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: {}Malloc error: {msg}", API_PREFIX)]
    Malloc {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: {} kernel error: {msg}", API_PREFIX.to_uppercase())]
    Kernel {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: {msg}")]
    Generic {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },
}

/// Convert a count to the C integer type that the GPU code expects.
#[track_caller]
fn to_c<T: TryFrom<usize>>(value: usize, what: &str) -> Result<T, GpuError> {
    T::try_from(value).map_err(|_| {
        let location = Location::caller();
        GpuError::Generic {
            msg: format!("Too many {what} for the GPU code ({value})").into(),
            file: location.file(),
            line: location.line(),
        }
    })
}

/// The CUDA/HIP device. Only device 0 is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpuDevice;

impl Accelerator<GpuFloat> for GpuDevice {
    type Buffer<T: DeviceData> = DevicePointer<T>;

    fn kind(&self) -> DeviceKind {
        DeviceKind::Gpu
    }

    fn describe(&self) -> Result<String, AcceleratorError> {
        DeviceKind::Gpu.get_device_info()
    }

    #[track_caller]
    fn malloc<T: DeviceData>(&self, len: usize) -> Result<DevicePointer<T>, AcceleratorError> {
        let size = len
            .checked_mul(std::mem::size_of::<T>())
            .ok_or_else(|| GpuCall::Malloc.error(format!("{len} elements is too many")))?;
        let mut buffer = DevicePointer::malloc(size)?;
        // Match the CPU device; new buffers are zeroed.
        buffer.clear()?;
        trace!("Allocated {size} bytes on the GPU");
        Ok(buffer)
    }

    #[track_caller]
    fn copy_to_device<T: DeviceData>(
        &self,
        buffer: &mut DevicePointer<T>,
        src: &[T],
    ) -> Result<(), AcceleratorError> {
        let size = std::mem::size_of_val(src);
        if size != buffer.get_size() {
            return Err(GpuCall::CopyToDevice
                .error(format!(
                    "Device buffer size {} is not equal to provided buffer size {size} (length {})",
                    buffer.get_size(),
                    src.len()
                ))
                .into());
        }
        buffer.overwrite(src)?;
        Ok(())
    }

    #[track_caller]
    fn copy_from_device<T: DeviceData>(
        &self,
        buffer: &DevicePointer<T>,
        dst: &mut [T],
    ) -> Result<(), AcceleratorError> {
        if dst.is_empty() && buffer.get_size() == 0 {
            return Ok(());
        }
        buffer.copy_from_device(dst)?;
        Ok(())
    }

    #[track_caller]
    fn synchronise(&self) -> Result<(), AcceleratorError> {
        unsafe { check_for_errors(GpuCall::Synchronise)? };
        Ok(())
    }

    #[track_caller]
    fn launch(
        &self,
        geometry: &LaunchGeometry,
        kernel: &DftKernel,
        sources: &DevicePointer<Source<GpuFloat>>,
        visibilities: &DevicePointer<Visibility<GpuFloat>>,
        intensities: &mut DevicePointer<Complex<GpuFloat>>,
    ) -> Result<LaunchReport, AcceleratorError> {
        let n = kernel.num_visibilities;
        if sources.get_num_elements() != kernel.num_sources
            || visibilities.get_num_elements() != n
            || intensities.get_num_elements() != n
        {
            let location = Location::caller();
            return Err(AcceleratorError::Launch {
                msg: format!(
                    "Kernel expects {} sources and {n} visibilities, but the buffers hold {}, {} and {}",
                    kernel.num_sources,
                    sources.get_num_elements(),
                    visibilities.get_num_elements(),
                    intensities.get_num_elements()
                )
                .into(),
                file: location.file(),
                line: location.line(),
            });
        }

        let num_sources: i32 = to_c(kernel.num_sources, "sources")?;
        let num_visibilities: i32 = to_c(n, "visibilities")?;
        let num_groups: u32 = to_c(geometry.num_groups, "thread blocks")?;
        let group_size: u32 = to_c(geometry.group_size, "threads per block")?;
        let exact = i32::from(kernel.correction == DirectionCorrection::Exact);
        let mut elapsed_ms = 0.0_f32;
        gpu_kernel_call!(
            bindings::extract_visibilities_gpu,
            sources.get().cast(),
            num_sources,
            visibilities.get().cast(),
            intensities.get_mut().cast(),
            num_visibilities,
            exact,
            num_groups,
            group_size,
            &mut elapsed_ms,
        )?;

        Ok(LaunchReport {
            elapsed: Duration::from_secs_f32(elapsed_ms.max(0.0) / 1000.0),
            workers_launched: geometry.num_workers(),
            workers_active: None,
        })
    }
}
