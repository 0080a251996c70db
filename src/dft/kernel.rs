// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-visibility DFT kernel.
//!
//! For a visibility `(u, v, w)`, every source contributes
//!
//! `exp(-2πi (u l + v m + w c_w)) * intensity / c_i`
//!
//! where `c_w` and `c_i` are the w- and image-corrections of the source (see
//! [`DirectionCorrection`]). The contributions are summed in source order.
//! Nothing here knows about launch geometry or device memory; the GPU code in
//! `src_gpu/dft.cu` must agree with these functions.

use num_complex::Complex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::{Source, Visibility};
use crate::DftFloat;

/// How the curved-sky terms of a source are calculated from its direction
/// cosines.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DirectionCorrection {
    /// With `t = (l² + m²) / 2`: `c_w = -t`, `c_i = 1 - t`. Less accurate
    /// away from the phase centre, but cheaper; this is what is used unless
    /// asked otherwise.
    #[default]
    #[strum(serialize = "small-angle")]
    SmallAngle,

    /// With `n = sqrt(1 - l² - m²)`: `c_w = n - 1`, `c_i = n`.
    #[strum(serialize = "exact")]
    Exact,
}

impl DirectionCorrection {
    /// Get the `(w_correction, image_correction)` pair for a source at
    /// `(l, m)`.
    #[inline]
    pub fn corrections<F: DftFloat>(self, l: F, m: F) -> (F, F) {
        let l_sq_m_sq = l * l + m * m;
        match self {
            DirectionCorrection::SmallAngle => {
                let term = F::demote(0.5) * l_sq_m_sq;
                (-term, F::one() - term)
            }
            DirectionCorrection::Exact => {
                let n = (F::one() - l_sq_m_sq).sqrt();
                (n - F::one(), n)
            }
        }
    }
}

/// The scalar arguments of a DFT launch. All of the array arguments live in
/// device buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DftKernel {
    pub num_sources: usize,
    pub num_visibilities: usize,
    pub correction: DirectionCorrection,
}

/// Sum the contributions of all `sources` to the visibility at `vis`.
pub fn visibility_intensity<F: DftFloat>(
    vis: &Visibility<F>,
    sources: &[Source<F>],
    correction: DirectionCorrection,
) -> Complex<F> {
    let two_pi = F::TAU();
    let mut re = F::zero();
    let mut im = F::zero();

    for source in sources {
        let (w_correction, image_correction) = correction.corrections(source.l, source.m);
        let theta = two_pi * (vis.u * source.l + vis.v * source.m + vis.w * w_correction);
        let (sin, cos) = theta.sin_cos();
        let amp = source.intensity / image_correction;
        re = re + cos * amp;
        im = im - sin * amp;
    }

    Complex::new(re, im)
}

/// The work done by a single worker of a launch. Workers with an index at or
/// beyond `num_visibilities` do nothing and return `None`; a launch geometry
/// is allowed to schedule more workers than there are visibilities.
#[inline]
pub fn dft_worker<F: DftFloat>(
    global_index: usize,
    num_visibilities: usize,
    sources: &[Source<F>],
    visibilities: &[Visibility<F>],
    correction: DirectionCorrection,
) -> Option<Complex<F>> {
    if global_index >= num_visibilities {
        return None;
    }

    let vis = visibilities.get(global_index)?;
    Some(visibility_intensity(vis, sources, correction))
}
