// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading and writing of source and visibility text files.
//!
//! Both file types start with a line holding the number of records, followed
//! by one whitespace-separated record per line. Blank lines and lines starting
//! with `#` are ignored.
//!
//! Source records are `x y intensity`, where `x` and `y` are in sky cells
//! (see [`DftConfig::cell_size_rad`](crate::DftConfig)).
//!
//! Visibility records are `u v w re im weight`, where `u`, `v` and `w` are in
//! metres and `re im` is the brightness of the visibility.

mod error;
mod sources;
mod text;
mod visibilities;

pub use error::{ReadError, ReadSourcesError, ReadVisibilitiesError, WriteError};
pub use sources::{parse_sources, read_sources, write_sources, write_sources_to};
pub use visibilities::{
    parse_visibilities, read_visibilities, write_visibilities, write_visibilities_to,
    VisibilityFile,
};
