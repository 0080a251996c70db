// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Inputs to the DFT. Both types are `#[repr(C)]` so they can be copied to a
//! GPU verbatim.

use bytemuck::{Pod, Zeroable};

/// A sky-model point source.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Source<F> {
    /// Direction cosine \[radians\].
    pub l: F,
    /// Direction cosine \[radians\].
    pub m: F,
    /// Apparent brightness.
    pub intensity: F,
}

impl<F> Source<F> {
    pub fn new(l: F, m: F, intensity: F) -> Source<F> {
        Source { l, m, intensity }
    }
}

/// A spatial-frequency coordinate at which a visibility is predicted.
/// \[wavelengths\]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Visibility<F> {
    pub u: F,
    pub v: F,
    pub w: F,
}

impl<F> Visibility<F> {
    pub fn new(u: F, v: F, w: F) -> Visibility<F> {
        Visibility { u, v, w }
    }
}

// SAFETY: Both structs are `repr(C)` and made of three fields of the same
// type, so there is no padding.
unsafe impl<F: Zeroable> Zeroable for Source<F> {}
unsafe impl<F: Pod> Pod for Source<F> {}
unsafe impl<F: Zeroable> Zeroable for Visibility<F> {}
unsafe impl<F: Pod> Pod for Visibility<F> {}
