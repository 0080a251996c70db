// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SyntheticError {
    #[error("The synthetic {name} range ({min} to {max}) is not valid")]
    BadRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Couldn't draw a Gaussian value between {min} and {max} after {attempts} attempts")]
    GaussianRetriesExhausted { attempts: usize, min: f64, max: f64 },
}
