// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An accelerator emulated on the host.
//!
//! Device memory is a separate heap allocation per buffer, and groups of
//! workers are spread over the rayon thread pool. Workers within a group run
//! in order on one thread.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

use log::trace;
use num_complex::Complex;
use rayon::prelude::*;

use super::{
    error::DeviceCall, get_cpu_info, Accelerator, AcceleratorError, DeviceData, DeviceKind,
    LaunchReport,
};
use crate::{
    dft::{kernel::dft_worker, DftKernel, LaunchGeometry, Source, Visibility},
    DftFloat,
};

/// A host-emulated accelerator.
#[derive(Debug, Clone, Default)]
pub struct CpuDevice {
    /// If set, allocations that would take the live "device" memory over this
    /// many bytes fail.
    memory_limit: Option<usize>,

    /// Shared with every buffer allocated by this device.
    bytes_in_use: Arc<AtomicUsize>,
}

impl CpuDevice {
    pub fn new() -> CpuDevice {
        CpuDevice::default()
    }

    /// A device that can hold at most `bytes` bytes at once.
    pub fn with_memory_limit(bytes: usize) -> CpuDevice {
        CpuDevice {
            memory_limit: Some(bytes),
            bytes_in_use: Arc::default(),
        }
    }

    /// The number of bytes currently held by live buffers of this device.
    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use.load(Ordering::SeqCst)
    }

    /// Claim `bytes` against the memory limit.
    fn reserve(&self, bytes: usize) -> Result<(), usize> {
        let limit = self.memory_limit;
        self.bytes_in_use
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |in_use| {
                let new = in_use.checked_add(bytes)?;
                match limit {
                    Some(limit) if new > limit => None,
                    _ => Some(new),
                }
            })
            .map(|_| ())
    }
}

/// Memory owned by a [`CpuDevice`]. The bytes are given back to the device
/// when this is dropped.
#[derive(Debug)]
pub struct HostBuffer<T> {
    data: Vec<T>,
    num_bytes: usize,
    bytes_in_use: Arc<AtomicUsize>,
}

impl<T> HostBuffer<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of bytes allocated against this buffer.
    pub fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Drop for HostBuffer<T> {
    fn drop(&mut self) {
        self.bytes_in_use.fetch_sub(self.num_bytes, Ordering::SeqCst);
    }
}

impl<F: DftFloat> Accelerator<F> for CpuDevice {
    type Buffer<T: DeviceData> = HostBuffer<T>;

    fn kind(&self) -> DeviceKind {
        DeviceKind::Cpu
    }

    fn describe(&self) -> Result<String, AcceleratorError> {
        Ok(get_cpu_info())
    }

    #[track_caller]
    fn malloc<T: DeviceData>(&self, len: usize) -> Result<HostBuffer<T>, AcceleratorError> {
        let num_bytes = len.checked_mul(std::mem::size_of::<T>()).ok_or_else(|| {
            DeviceCall::Malloc.error(format!("{len} elements overflow the address space"))
        })?;

        if let Err(in_use) = self.reserve(num_bytes) {
            return Err(DeviceCall::Malloc.error(format!(
                "Cannot allocate {num_bytes} bytes; {in_use} of {} bytes are in use",
                self.memory_limit.unwrap_or(usize::MAX)
            )));
        }
        // From here, dropping the buffer gives the reservation back.
        let mut buffer = HostBuffer {
            data: Vec::new(),
            num_bytes,
            bytes_in_use: Arc::clone(&self.bytes_in_use),
        };
        if let Err(e) = buffer.data.try_reserve_exact(len) {
            return Err(DeviceCall::Malloc.error(e.to_string()));
        }
        buffer.data.resize(len, T::zeroed());

        trace!("Allocated {num_bytes} bytes on the CPU device");
        Ok(buffer)
    }

    #[track_caller]
    fn copy_to_device<T: DeviceData>(
        &self,
        buffer: &mut HostBuffer<T>,
        src: &[T],
    ) -> Result<(), AcceleratorError> {
        if buffer.len() != src.len() {
            return Err(DeviceCall::CopyToDevice.error(format!(
                "Device buffer length {} is not equal to provided buffer length {}",
                buffer.len(),
                src.len()
            )));
        }
        buffer.data.copy_from_slice(src);
        Ok(())
    }

    #[track_caller]
    fn copy_from_device<T: DeviceData>(
        &self,
        buffer: &HostBuffer<T>,
        dst: &mut [T],
    ) -> Result<(), AcceleratorError> {
        if buffer.len() != dst.len() {
            return Err(DeviceCall::CopyFromDevice.error(format!(
                "Device buffer length {} is not equal to provided buffer length {}",
                buffer.len(),
                dst.len()
            )));
        }
        dst.copy_from_slice(&buffer.data);
        Ok(())
    }

    fn synchronise(&self) -> Result<(), AcceleratorError> {
        // Copies and launches on this device are already blocking.
        Ok(())
    }

    #[track_caller]
    fn launch(
        &self,
        geometry: &LaunchGeometry,
        kernel: &DftKernel,
        sources: &HostBuffer<Source<F>>,
        visibilities: &HostBuffer<Visibility<F>>,
        intensities: &mut HostBuffer<Complex<F>>,
    ) -> Result<LaunchReport, AcceleratorError> {
        let n = kernel.num_visibilities;
        if sources.len() != kernel.num_sources {
            return Err(DeviceCall::Launch.error(format!(
                "Kernel expects {} sources, but the source buffer holds {}",
                kernel.num_sources,
                sources.len()
            )));
        }
        if visibilities.len() != n || intensities.len() != n {
            return Err(DeviceCall::Launch.error(format!(
                "Kernel expects {n} visibilities, but the buffers hold {} inputs and {} outputs",
                visibilities.len(),
                intensities.len()
            )));
        }
        if geometry.num_workers() < n {
            return Err(DeviceCall::Launch.error(format!(
                "{} groups of {} workers cannot cover {n} visibilities",
                geometry.num_groups, geometry.group_size
            )));
        }
        if geometry.num_workers() == 0 {
            return Ok(LaunchReport::default());
        }

        let sources = sources.as_slice();
        let visibilities = visibilities.as_slice();
        let start = Instant::now();
        // Chunks of the output line up with groups; the last chunk may be
        // shorter than the group, and its trailing workers are inactive.
        let workers_active: usize = intensities
            .data
            .par_chunks_mut(geometry.group_size)
            .enumerate()
            .map(|(i_group, group_out)| {
                let mut active = 0;
                for (i_worker, global_index) in geometry.group_indices(i_group).enumerate() {
                    if let Some(intensity) =
                        dft_worker(global_index, n, sources, visibilities, kernel.correction)
                    {
                        group_out[i_worker] = intensity;
                        active += 1;
                    }
                }
                active
            })
            .sum();

        Ok(LaunchReport {
            elapsed: start.elapsed(),
            workers_launched: geometry.num_workers(),
            workers_active: Some(workers_active),
        })
    }
}
