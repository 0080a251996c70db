// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("The maximum number of threads per block cannot be 0")]
    ZeroThreadsPerBlock,

    #[error("The grid size cannot be 0")]
    ZeroGridSize,

    #[error("The {name} must be a positive, finite number; got {value}")]
    NotPositive { name: &'static str, value: f64 },
}
