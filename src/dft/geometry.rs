// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::ops::Range;

use crate::config::ConfigError;

/// How a launch is partitioned into groups of workers (blocks of threads on a
/// GPU). Worker `i` of group `g` handles the visibility at global index
/// `g * group_size + i`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchGeometry {
    pub num_groups: usize,
    pub group_size: usize,
}

impl LaunchGeometry {
    /// Use groups of `min(max_group_size, num_visibilities)` workers, and
    /// enough groups that every visibility gets a worker. Zero visibilities
    /// give an empty geometry.
    pub fn new(
        num_visibilities: usize,
        max_group_size: usize,
    ) -> Result<LaunchGeometry, ConfigError> {
        if max_group_size == 0 {
            return Err(ConfigError::ZeroThreadsPerBlock);
        }
        if num_visibilities == 0 {
            return Ok(LaunchGeometry::default());
        }

        let group_size = max_group_size.min(num_visibilities);
        Ok(LaunchGeometry {
            num_groups: num_visibilities.div_ceil(group_size),
            group_size,
        })
    }

    /// The total number of workers scheduled; this is at least the number of
    /// visibilities.
    pub fn num_workers(&self) -> usize {
        self.num_groups * self.group_size
    }

    /// The global indices handled by the workers of group `i_group`.
    pub fn group_indices(&self, i_group: usize) -> Range<usize> {
        let start = i_group * self.group_size;
        start..start + self.group_size
    }

    pub fn is_empty(&self) -> bool {
        self.num_groups == 0
    }
}
