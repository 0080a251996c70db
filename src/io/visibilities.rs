// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use log::debug;
use num_complex::Complex;

use super::{
    text::{try_with_capacity, RecordReader},
    ReadError, ReadVisibilitiesError, WriteError,
};
use crate::{dft::Visibility, DftConfig, DftFloat};

/// The contents of a visibility file. All vectors have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityFile<F> {
    /// \[wavelengths\]
    pub visibilities: Vec<Visibility<F>>,

    /// The brightness columns (`re im`) of the file.
    pub brightness: Vec<Complex<F>>,

    pub weights: Vec<F>,
}

impl<F> VisibilityFile<F> {
    pub fn len(&self) -> usize {
        self.visibilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visibilities.is_empty()
    }
}

/// Read a visibility file. `u`, `v` and `w` are converted from metres to
/// wavelengths. With `right_ascension`, the signs of `u` and `w` are flipped,
/// and with `force_zero_w_term`, `w` is zeroed.
pub fn read_visibilities<F: DftFloat>(
    path: impl AsRef<Path>,
    config: &DftConfig,
) -> Result<VisibilityFile<F>, ReadVisibilitiesError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ReadVisibilitiesError::DoesNotExist(path.to_path_buf()));
    }
    let mut buf = BufReader::new(File::open(path)?);
    let file = parse_visibilities(&mut buf, config)?;
    debug!("Read {} visibilities from {}", file.len(), path.display());
    Ok(file)
}

/// Parse the contents of a visibility file.
pub fn parse_visibilities<F: DftFloat, R: BufRead>(
    buf: &mut R,
    config: &DftConfig,
) -> Result<VisibilityFile<F>, ReadVisibilitiesError> {
    let scale = config.metres_to_wavelengths();
    let ra_sign = if config.right_ascension { -1.0 } else { 1.0 };

    let mut reader = RecordReader::new(buf);
    let count = reader.read_count()?;
    let mut visibilities = try_with_capacity(count)?;
    let mut brightness = try_with_capacity(count)?;
    let mut weights = try_with_capacity(count)?;
    while visibilities.len() < count {
        let [u, v, w, re, im, weight]: [f64; 6] = match reader.next_record()? {
            Some(record) => record,
            None => {
                return Err(ReadError::TooFewRecords {
                    expected: count,
                    got: visibilities.len(),
                }
                .into())
            }
        };
        let w = if config.force_zero_w_term {
            0.0
        } else {
            ra_sign * w * scale
        };
        visibilities.push(Visibility::new(
            F::demote(ra_sign * u * scale),
            F::demote(v * scale),
            F::demote(w),
        ));
        brightness.push(Complex::new(F::demote(re), F::demote(im)));
        weights.push(F::demote(weight));
    }
    reader.finish(count)?;

    Ok(VisibilityFile {
        visibilities,
        brightness,
        weights,
    })
}

/// Write visibilities and their intensities to a file in the same format that
/// [`read_visibilities`] reads.
pub fn write_visibilities<F: DftFloat>(
    path: impl AsRef<Path>,
    visibilities: &[Visibility<F>],
    intensities: &[Complex<F>],
    weights: &[F],
    config: &DftConfig,
) -> Result<(), WriteError> {
    let mut buf = BufWriter::new(File::create(path)?);
    write_visibilities_to(&mut buf, visibilities, intensities, weights, config)?;
    buf.flush()?;
    Ok(())
}

/// Write visibilities and their intensities to a buffer. The conversions of
/// [`read_visibilities`] are undone.
pub fn write_visibilities_to<F: DftFloat, W: Write>(
    buf: &mut W,
    visibilities: &[Visibility<F>],
    intensities: &[Complex<F>],
    weights: &[F],
    config: &DftConfig,
) -> Result<(), WriteError> {
    let expected = visibilities.len();
    for (what, got) in [("intensities", intensities.len()), ("weights", weights.len())] {
        if got != expected {
            return Err(WriteError::LengthMismatch {
                what,
                expected,
                got,
            });
        }
    }

    let prec = F::OUTPUT_DECIMALS;
    let scale = config.metres_to_wavelengths();
    let ra_sign = if config.right_ascension { -1.0 } else { 1.0 };
    writeln!(buf, "{expected}")?;
    for ((vis, intensity), weight) in visibilities.iter().zip(intensities).zip(weights) {
        writeln!(
            buf,
            "{:.prec$} {:.prec$} {:.prec$} {:.prec$} {:.prec$} {:.prec$}",
            ra_sign * vis.u.promote() / scale,
            vis.v.promote() / scale,
            ra_sign * vis.w.promote() / scale,
            intensity.re.promote(),
            intensity.im.promote(),
            weight.promote(),
        )?;
    }
    Ok(())
}
