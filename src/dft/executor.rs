// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Run the DFT kernel over a batch of visibilities on an accelerator.

use std::borrow::Cow;

use log::{debug, log, trace};
use num_complex::Complex;

use super::{DftError, DftKernel, LaunchGeometry, Source, Visibility};
use crate::{
    device::{Accelerator, LaunchReport},
    DftConfig, DftFloat,
};

/// What happened during a call to [`extract_visibilities`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DftReport {
    pub geometry: LaunchGeometry,
    pub launch: LaunchReport,
}

/// Predict the visibility intensities of the first `n` `visibilities` from
/// all `sources`, writing them into the first `n` slots of `intensities`.
///
/// Device memory for the inputs and results is acquired, populated, computed
/// on, read back and released within this call. If anything fails, the
/// memory already acquired is released before the error is returned, and
/// `intensities` must be considered garbage.
pub fn extract_visibilities<F, A>(
    device: &A,
    config: &DftConfig,
    sources: &[Source<F>],
    visibilities: &[Visibility<F>],
    intensities: &mut [Complex<F>],
    n: usize,
) -> Result<DftReport, DftError>
where
    F: DftFloat,
    A: Accelerator<F>,
{
    check_length("sources", config.num_sources, sources.len(), false)?;
    check_length("configured visibilities", n, config.num_visibilities, false)?;
    check_length("visibilities", n, visibilities.len(), true)?;
    check_length("intensity slots", n, intensities.len(), true)?;

    let geometry = LaunchGeometry::new(n, config.max_threads_per_block)?;
    if n == 0 {
        debug!("No visibilities to predict; not launching anything");
        return Ok(DftReport {
            geometry,
            launch: LaunchReport::default(),
        });
    }

    let visibilities = &visibilities[..n];
    let visibilities: Cow<[Visibility<F>]> = if config.force_zero_w_term {
        Cow::Owned(
            visibilities
                .iter()
                .map(|vis| Visibility { w: F::zero(), ..*vis })
                .collect(),
        )
    } else {
        Cow::Borrowed(visibilities)
    };
    let intensities = &mut intensities[..n];
    let level = config.message_level();

    // If any of these fail, the buffers that were already made are dropped on
    // the way out, which releases them.
    let mut d_sources = device.malloc::<Source<F>>(sources.len())?;
    let mut d_visibilities = device.malloc::<Visibility<F>>(n)?;
    let mut d_intensities = device.malloc::<Complex<F>>(n)?;
    trace!("Allocated device buffers for {} sources and {n} visibilities", sources.len());

    device.copy_to_device(&mut d_sources, sources)?;
    device.copy_to_device(&mut d_visibilities, &visibilities)?;
    device.synchronise()?;

    let kernel = DftKernel {
        num_sources: sources.len(),
        num_visibilities: n,
        correction: config.direction_correction,
    };
    log!(
        level,
        "Launching {} group(s) of {} worker(s) over {n} visibilities and {} sources ({} precision)",
        geometry.num_groups,
        geometry.group_size,
        kernel.num_sources,
        F::PRECISION,
    );
    let launch = device.launch(
        &geometry,
        &kernel,
        &d_sources,
        &d_visibilities,
        &mut d_intensities,
    )?;
    device.synchronise()?;
    log!(level, "Kernel execution time: {:?}", launch.elapsed);
    if let Some(active) = launch.workers_active {
        debug!(
            "{active} of {} launched workers were active",
            launch.workers_launched
        );
    }

    device.copy_from_device(&d_intensities, intensities)?;

    drop(d_sources);
    drop(d_visibilities);
    drop(d_intensities);
    trace!("Released device buffers");

    Ok(DftReport { geometry, launch })
}

/// `at_least` allows `got` to exceed `expected`.
fn check_length(
    what: &'static str,
    expected: usize,
    got: usize,
    at_least: bool,
) -> Result<(), DftError> {
    let ok = if at_least {
        got >= expected
    } else {
        got == expected
    };
    if ok {
        Ok(())
    } else {
        Err(DftError::InputLength {
            what,
            expected,
            got,
        })
    }
}

/// Owns a device and borrows a configuration, so that batches can be run
/// without passing them around.
pub struct BatchExecutor<'a, A> {
    device: A,
    config: &'a DftConfig,
}

impl<'a, A> BatchExecutor<'a, A> {
    pub fn new(device: A, config: &'a DftConfig) -> BatchExecutor<'a, A> {
        BatchExecutor { device, config }
    }

    pub fn device(&self) -> &A {
        &self.device
    }

    pub fn config(&self) -> &DftConfig {
        self.config
    }

    /// Run [`extract_visibilities`] over the configured number of
    /// visibilities.
    pub fn run<F>(
        &self,
        sources: &[Source<F>],
        visibilities: &[Visibility<F>],
        intensities: &mut [Complex<F>],
    ) -> Result<DftReport, DftError>
    where
        F: DftFloat,
        A: Accelerator<F>,
    {
        extract_visibilities(
            &self.device,
            self.config,
            sources,
            visibilities,
            intensities,
            self.config.num_visibilities,
        )
    }

    /// As [`BatchExecutor::run`], but the intensities are returned in a new
    /// vector.
    pub fn run_new<F>(
        &self,
        sources: &[Source<F>],
        visibilities: &[Visibility<F>],
    ) -> Result<(Vec<Complex<F>>, DftReport), DftError>
    where
        F: DftFloat,
        A: Accelerator<F>,
    {
        let mut intensities = vec![Complex::default(); self.config.num_visibilities];
        let report = self.run(sources, visibilities, &mut intensities)?;
        Ok((intensities, report))
    }
}
