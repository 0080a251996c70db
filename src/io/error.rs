// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading and writing source and visibility files.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with the contents of a text file, common to both file types.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("No record count was found")]
    MissingCount,

    #[error("Line {line_num}: Couldn't interpret '{string}' as a record count")]
    BadCount { line_num: u32, string: String },

    #[error("Line {line_num}: Expected {expected} columns, but found {got}")]
    WrongNumColumns {
        line_num: u32,
        expected: usize,
        got: usize,
    },

    #[error("Line {line_num}: Error converting string {string} to a float")]
    ParseFloat { line_num: u32, string: String },

    #[error("Expected {expected} records, but only found {got}")]
    TooFewRecords { expected: usize, got: usize },

    #[error("Couldn't allocate space for {count} records: {err}")]
    Allocation {
        count: usize,
        err: std::collections::TryReserveError,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ReadSourcesError {
    #[error("Source file '{}' does not exist", .0.display())]
    DoesNotExist(PathBuf),

    #[error("Source file error: {0}")]
    Read(#[from] ReadError),
}

#[derive(Error, Debug)]
pub enum ReadVisibilitiesError {
    #[error("Visibility file '{}' does not exist", .0.display())]
    DoesNotExist(PathBuf),

    #[error("Visibility file error: {0}")]
    Read(#[from] ReadError),
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Cannot write {expected} records with {got} {what}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

impl From<std::io::Error> for ReadSourcesError {
    fn from(e: std::io::Error) -> Self {
        Self::Read(ReadError::IO(e))
    }
}

impl From<std::io::Error> for ReadVisibilitiesError {
    fn from(e: std::io::Error) -> Self {
        Self::Read(ReadError::IO(e))
    }
}
