// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The floating-point types that the DFT can be run with.

use std::fmt::{Debug, Display, LowerExp};

use num_traits::{Float, FloatConst};

use crate::config::Precision;

/// A floating-point type used for all DFT arithmetic and all numeric file
/// formatting in a run. Implemented for `f32` ("single") and `f64`
/// ("double").
pub trait DftFloat:
    Float + FloatConst + Default + Debug + Display + LowerExp + Send + Sync + bytemuck::Pod + 'static
{
    /// The [`Precision`] that this type represents.
    const PRECISION: Precision;

    /// The number of decimal places to use when writing this type to a text
    /// file.
    const OUTPUT_DECIMALS: usize;

    /// Convert a double-precision value to this type. This may lose
    /// precision.
    fn demote(f: f64) -> Self;

    /// Convert this value to double precision.
    fn promote(self) -> f64;
}

impl DftFloat for f32 {
    const PRECISION: Precision = Precision::Single;
    const OUTPUT_DECIMALS: usize = 6;

    #[inline]
    fn demote(f: f64) -> Self {
        f as f32
    }

    #[inline]
    fn promote(self) -> f64 {
        self as f64
    }
}

impl DftFloat for f64 {
    const PRECISION: Precision = Precision::Double;
    const OUTPUT_DECIMALS: usize = 15;

    #[inline]
    fn demote(f: f64) -> Self {
        f
    }

    #[inline]
    fn promote(self) -> f64 {
        self
    }
}
