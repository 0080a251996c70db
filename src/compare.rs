// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Comparing predicted visibility intensities against expected ones.

use num_complex::Complex;

use crate::DftFloat;

/// How far a set of predictions is from what was expected. All differences
/// are magnitudes of complex differences, calculated in double precision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Comparison {
    pub max_abs_diff: f64,
    pub rms_diff: f64,

    /// The index of the visibility with the largest difference. `None` when
    /// there was nothing to compare.
    pub worst_index: Option<usize>,
}

impl Comparison {
    pub fn within(&self, tolerance: f64) -> bool {
        self.max_abs_diff <= tolerance
    }
}

/// Compare `predicted` intensities with `expected` ones. Only the common
/// length of the two slices is compared.
pub fn compare_visibilities<F: DftFloat>(
    expected: &[Complex<F>],
    predicted: &[Complex<F>],
) -> Comparison {
    let mut comparison = Comparison::default();
    let mut sum_sq = 0.0;
    let mut num = 0;
    for (i, (e, p)) in expected.iter().zip(predicted).enumerate() {
        let diff = Complex::new(e.re.promote() - p.re.promote(), e.im.promote() - p.im.promote());
        let abs = diff.norm();
        sum_sq += abs * abs;
        num += 1;
        // NaNs are always the worst.
        if comparison.worst_index.is_none() || abs > comparison.max_abs_diff || abs.is_nan() {
            comparison.max_abs_diff = abs;
            comparison.worst_index = Some(i);
        }
    }
    if num > 0 {
        comparison.rms_diff = (sum_sq / num as f64).sqrt();
    }
    comparison
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn identical_visibilities_have_no_difference() {
        let a = vec![Complex::new(1.0_f64, 2.0), Complex::new(-3.0, 0.5)];
        let c = compare_visibilities(&a, &a);
        assert_eq!(c.max_abs_diff, 0.0);
        assert_eq!(c.rms_diff, 0.0);
        assert!(c.within(0.0));
    }

    #[test]
    fn worst_visibility_is_found() {
        let expected = vec![
            Complex::new(1.0_f32, 0.0),
            Complex::new(0.0, 0.0),
            Complex::new(2.0, 2.0),
        ];
        let predicted = vec![
            Complex::new(1.0, 0.0),
            Complex::new(3.0, 4.0),
            Complex::new(2.0, 1.0),
        ];
        let c = compare_visibilities(&expected, &predicted);
        assert_eq!(c.worst_index, Some(1));
        assert_abs_diff_eq!(c.max_abs_diff, 5.0);
        assert_abs_diff_eq!(c.rms_diff, (26.0_f64 / 3.0).sqrt());
        assert!(!c.within(4.9));
        assert!(c.within(5.0));
    }

    #[test]
    fn nothing_to_compare() {
        let c = compare_visibilities::<f64>(&[], &[]);
        assert_eq!(c, Comparison::default());
        assert!(c.within(0.0));
    }

    #[test]
    fn nans_are_never_within_tolerance() {
        let expected = vec![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)];
        let predicted = vec![Complex::new(f64::NAN, 0.0), Complex::new(100.0, 0.0)];
        let c = compare_visibilities(&expected, &predicted);
        assert!(!c.within(1e6));
    }
}
