// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `hyperdft` should do as many
calculations as possible in double precision before converting to a lower
precision, if it is ever required.
 */

/// Speed of light \[metres/second\].
pub const VEL_C: f64 = 299_792_458.0;

/// The default maximum number of work-items in a single parallel group (i.e.
/// threads per block on a GPU).
pub const DEFAULT_MAX_THREADS_PER_BLOCK: usize = 1024;

/// The default sky cell size \[radians\] (one arcsecond). Source positions
/// in source-list files are multiplied by this to get direction cosines.
pub const DEFAULT_CELL_SIZE_RAD: f64 = 4.848136811095360e-6;

/// The default observing frequency \[Hz\]. Visibility coordinates in files
/// are multiplied by this over [`VEL_C`] to get wavelengths.
pub const DEFAULT_FREQUENCY_HZ: f64 = 100e6;

/// The default image size \[pixels\] used when synthesising source
/// positions.
pub const DEFAULT_GRID_SIZE: usize = 18000;

/// The default factor applied to synthesised visibility coordinates.
pub const DEFAULT_UV_SCALE: f64 = 1.0;

/// The default intensity of synthesised sources.
pub const SYNTHETIC_SOURCE_INTENSITY: f64 = 1.0;

/// The number of attempts allowed when drawing a single Gaussian variate
/// inside a range before giving up.
pub const MAX_GAUSSIAN_ATTEMPTS: usize = 1000;

/// The default range of synthesised u and v coordinates is
/// `[-DEFAULT_MAX_UV, DEFAULT_MAX_UV]` \[wavelengths\].
pub const DEFAULT_MAX_UV: f64 = 2000.0;

/// The default range of synthesised w coordinates is
/// `[-DEFAULT_MAX_W, DEFAULT_MAX_W]` \[wavelengths\].
pub const DEFAULT_MAX_W: f64 = 100.0;

/// The default seed of the random number generator used for synthetic data.
pub const DEFAULT_SEED: u64 = 42;
