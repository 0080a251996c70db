// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Line-oriented parsing shared by the source and visibility readers.

use std::io::BufRead;

use log::{trace, warn};

use super::ReadError;

/// Reads a record count followed by records of whitespace-separated floats.
pub(super) struct RecordReader<'a, R> {
    buf: &'a mut R,
    line: String,
    line_num: u32,
}

impl<'a, R: BufRead> RecordReader<'a, R> {
    pub(super) fn new(buf: &'a mut R) -> RecordReader<'a, R> {
        RecordReader {
            buf,
            line: String::new(),
            line_num: 0,
        }
    }

    /// Get the next line with something in it (and its line number), or
    /// `None` at the end of the buffer.
    fn next_line(&mut self) -> Result<Option<(u32, &str)>, ReadError> {
        loop {
            self.line.clear();
            if self.buf.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_num += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some((self.line_num, self.line.trim())));
        }
    }

    /// Read the record count at the start of the file.
    pub(super) fn read_count(&mut self) -> Result<usize, ReadError> {
        let (line_num, line) = self.next_line()?.ok_or(ReadError::MissingCount)?;
        let count = line.parse().map_err(|_| ReadError::BadCount {
            line_num,
            string: line.to_string(),
        })?;
        trace!("Expecting {count} records");
        Ok(count)
    }

    /// Read the next record, which must have exactly `N` columns.
    pub(super) fn next_record<const N: usize>(&mut self) -> Result<Option<[f64; N]>, ReadError> {
        let (line_num, line) = match self.next_line()? {
            Some(l) => l,
            None => return Ok(None),
        };

        let mut record = [0.0; N];
        let mut num_columns = 0;
        for (i, item) in line.split_ascii_whitespace().enumerate() {
            num_columns += 1;
            if let Some(value) = record.get_mut(i) {
                *value = item.parse().map_err(|_| ReadError::ParseFloat {
                    line_num,
                    string: item.to_string(),
                })?;
            }
        }
        if num_columns != N {
            return Err(ReadError::WrongNumColumns {
                line_num,
                expected: N,
                got: num_columns,
            });
        }

        Ok(Some(record))
    }

    /// Count whatever is left after the expected records, warning about it if
    /// there's anything.
    pub(super) fn finish(mut self, count: usize) -> Result<usize, ReadError> {
        let mut num_extra = 0;
        while self.next_line()?.is_some() {
            num_extra += 1;
        }
        if num_extra > 0 {
            warn!("Expected {count} records, but found {num_extra} more; ignoring them");
        }
        Ok(num_extra)
    }
}

/// Make an empty vector with space for `count` elements, without aborting if
/// the memory isn't available.
pub(super) fn try_with_capacity<T>(count: usize) -> Result<Vec<T>, ReadError> {
    let mut v = Vec::new();
    v.try_reserve_exact(count)
        .map_err(|err| ReadError::Allocation { count, err })?;
    Ok(v)
}

/// Collect exactly `count` records of `N` columns, converting each with `f`.
pub(super) fn read_records<R: BufRead, T, const N: usize>(
    buf: &mut R,
    mut f: impl FnMut([f64; N]) -> T,
) -> Result<Vec<T>, ReadError> {
    let mut reader = RecordReader::new(buf);
    let count = reader.read_count()?;
    let mut records = try_with_capacity(count)?;
    while records.len() < count {
        match reader.next_record()? {
            Some(record) => records.push(f(record)),
            None => {
                return Err(ReadError::TooFewRecords {
                    expected: count,
                    got: records.len(),
                })
            }
        }
    }
    reader.finish(count)?;
    Ok(records)
}
