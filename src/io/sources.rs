// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use log::debug;

use super::{text::read_records, ReadSourcesError, WriteError};
use crate::{dft::Source, DftConfig, DftFloat};

/// Read a source file. Positions are scaled from sky cells to radians with the
/// configured cell size.
pub fn read_sources<F: DftFloat>(
    path: impl AsRef<Path>,
    config: &DftConfig,
) -> Result<Vec<Source<F>>, ReadSourcesError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ReadSourcesError::DoesNotExist(path.to_path_buf()));
    }
    let mut buf = BufReader::new(File::open(path)?);
    let sources = parse_sources(&mut buf, config)?;
    debug!("Read {} sources from {}", sources.len(), path.display());
    Ok(sources)
}

/// Parse the contents of a source file.
pub fn parse_sources<F: DftFloat, R: BufRead>(
    buf: &mut R,
    config: &DftConfig,
) -> Result<Vec<Source<F>>, ReadSourcesError> {
    let cell_size = config.cell_size_rad;
    let sources = read_records(buf, |[x, y, intensity]: [f64; 3]| {
        Source::new(
            F::demote(x * cell_size),
            F::demote(y * cell_size),
            F::demote(intensity),
        )
    })?;
    Ok(sources)
}

/// Write sources to a file in the same format that [`read_sources`] reads.
pub fn write_sources<F: DftFloat>(
    path: impl AsRef<Path>,
    sources: &[Source<F>],
    config: &DftConfig,
) -> Result<(), WriteError> {
    let mut buf = BufWriter::new(File::create(path)?);
    write_sources_to(&mut buf, sources, config)?;
    buf.flush()?;
    Ok(())
}

/// Write sources to a buffer. Positions are scaled from radians back to sky
/// cells.
pub fn write_sources_to<F: DftFloat, W: Write>(
    buf: &mut W,
    sources: &[Source<F>],
    config: &DftConfig,
) -> Result<(), WriteError> {
    let prec = F::OUTPUT_DECIMALS;
    let cell_size = config.cell_size_rad;
    writeln!(buf, "{}", sources.len())?;
    for source in sources {
        writeln!(
            buf,
            "{:.prec$} {:.prec$} {:.prec$}",
            source.l.promote() / cell_size,
            source.m.promote() / cell_size,
            source.intensity.promote(),
        )?;
    }
    Ok(())
}
