// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use ndarray::Array1;
use serial_test::serial;

use super::*;
use crate::{extract_visibilities, CpuDevice, DftConfig};

#[test]
#[serial]
fn copy_to_and_from_device_succeeds() {
    const LEN: usize = 100;
    let heap = vec![0_u32; LEN];
    let d_ptr = DevicePointer::copy_to_device(&heap).unwrap();
    let mut heap2 = vec![1_u32; LEN];
    d_ptr.copy_from_device(&mut heap2).unwrap();
    assert_eq!(heap, heap2);
    assert_eq!(d_ptr.get_num_elements(), LEN);
}

#[test]
#[serial]
fn gpu_malloc_huge_fails() {
    let size = 1024_usize.pow(4); // 1 TB;
    let result: Result<DevicePointer<u8>, GpuError> = DevicePointer::malloc(size);
    let err = result.unwrap_err().to_string();
    #[cfg(feature = "cuda")]
    assert!(err.ends_with("cudaMalloc error: out of memory"), "{err}");
    #[cfg(feature = "hip")]
    assert!(err.contains("hipMalloc error"), "{err}");
}

#[test]
#[serial]
fn copy_from_non_existent_pointer_fails() {
    let d_ptr: DevicePointer<u8> = DevicePointer {
        ptr: std::ptr::null_mut::<u8>(),
        size: 1,
    };
    let mut dest = [0; 100];
    let err = d_ptr.copy_from_device(&mut dest).unwrap_err().to_string();
    #[cfg(feature = "cuda")]
    assert!(err.contains("cudaMemcpy from device failed"));
    #[cfg(feature = "hip")]
    assert!(err.contains("hipMemcpy from device failed"));
    assert!(err.contains("Attempted to copy data from a null device pointer"));
}

#[test]
#[serial]
fn clear_works() {
    let buffer = [1; 10];
    let mut d_ptr = DevicePointer::copy_to_device(&buffer).unwrap();
    let mut copy = [2; 10];
    d_ptr.copy_from_device(&mut copy).unwrap();
    assert_eq!(&buffer, &copy);

    d_ptr.clear().unwrap();
    d_ptr.copy_from_device(&mut copy).unwrap();
    assert_eq!(&[0; 10], &copy);
}

#[test]
#[serial]
fn accelerator_copy_checks_lengths() {
    let device = GpuDevice;
    let mut buffer = device.malloc::<u32>(4).unwrap();
    let result = device.copy_to_device(&mut buffer, &[1, 2, 3]);
    assert!(matches!(
        result,
        Err(AcceleratorError::Gpu(GpuError::CopyToDevice { .. }))
    ));
}

#[test]
fn counts_too_big_for_c_are_rejected() {
    assert_eq!(to_c::<u32>(1024, "threads per block").unwrap(), 1024);
    let err = to_c::<u32>(usize::MAX, "thread blocks").unwrap_err();
    assert!(err.to_string().contains("Too many thread blocks"), "{err}");
    assert!(to_c::<i32>(i32::MAX as usize + 1, "sources").is_err());
}

#[test]
#[serial]
fn failed_launches_leave_the_device_usable() {
    let device = GpuDevice;
    let n = 4096;
    let sources = [Source::new(0.0, 0.0, 1.0)];
    let visibilities = vec![Visibility::new(1.0, 2.0, 3.0); n];
    let kernel = DftKernel {
        num_sources: sources.len(),
        num_visibilities: n,
        correction: DirectionCorrection::SmallAngle,
    };
    let mut d_sources = device.malloc(sources.len()).unwrap();
    device.copy_to_device(&mut d_sources, &sources).unwrap();
    let mut d_visibilities = device.malloc(n).unwrap();
    device.copy_to_device(&mut d_visibilities, &visibilities).unwrap();
    let mut d_intensities = device.malloc::<Complex<GpuFloat>>(n).unwrap();

    // More threads per block than any device allows.
    let too_big = LaunchGeometry::new(n, n).unwrap();
    for _ in 0..3 {
        let result = device.launch(
            &too_big,
            &kernel,
            &d_sources,
            &d_visibilities,
            &mut d_intensities,
        );
        assert!(
            matches!(result, Err(AcceleratorError::Gpu(GpuError::Kernel { .. }))),
            "{result:?}"
        );
    }

    let geometry = LaunchGeometry::new(n, 256).unwrap();
    device
        .launch(
            &geometry,
            &kernel,
            &d_sources,
            &d_visibilities,
            &mut d_intensities,
        )
        .unwrap();
    let mut intensities = vec![Complex::default(); n];
    device
        .copy_from_device(&d_intensities, &mut intensities)
        .unwrap();
    for intensity in intensities {
        assert_abs_diff_eq!(intensity.re, 1.0);
        assert_abs_diff_eq!(intensity.im, 0.0);
    }
}

#[test]
#[serial]
fn gpu_device_info_is_available() {
    let info = GpuDevice.describe().unwrap();
    assert!(info.contains("capability"), "{info}");
}

#[test]
#[serial]
fn gpu_agrees_with_cpu() {
    let sources: Vec<Source<GpuFloat>> = (0..50)
        .map(|i| {
            let i = i as GpuFloat;
            Source::new(0.0004 * (i - 25.0), 0.0003 * (17.0 - i), 1.0 + 0.1 * i)
        })
        .collect();
    // Not a multiple of the group size.
    let visibilities: Vec<Visibility<GpuFloat>> = (0..1000)
        .map(|i| {
            let i = i as GpuFloat;
            Visibility::new(2.5 * i - 1000.0, 700.0 - 1.5 * i, 0.01 * i)
        })
        .collect();

    for correction in [DirectionCorrection::SmallAngle, DirectionCorrection::Exact] {
        let config = DftConfig {
            max_threads_per_block: 128,
            direction_correction: correction,
            enable_messages: false,
            ..DftConfig::default().with_counts(sources.len(), visibilities.len())
        };
        let n = visibilities.len();

        let mut cpu = vec![Complex::default(); n];
        extract_visibilities(
            &CpuDevice::new(),
            &config,
            &sources,
            &visibilities,
            &mut cpu,
            n,
        )
        .unwrap();

        let mut gpu = vec![Complex::default(); n];
        let report =
            extract_visibilities(&GpuDevice, &config, &sources, &visibilities, &mut gpu, n)
                .unwrap();
        assert_eq!(report.geometry.num_groups, 8);
        assert_eq!(report.launch.workers_launched, 1024);
        assert!(report.launch.workers_active.is_none());

        #[cfg(not(feature = "gpu-single"))]
        let epsilon = 1e-9;
        #[cfg(feature = "gpu-single")]
        let epsilon = 1e-2;
        let cpu = Array1::from(cpu);
        let gpu = Array1::from(gpu);
        assert_abs_diff_eq!(cpu.mapv(|c| c.re), gpu.mapv(|c| c.re), epsilon = epsilon);
        assert_abs_diff_eq!(cpu.mapv(|c| c.im), gpu.mapv(|c| c.im), epsilon = epsilon);
    }
}
