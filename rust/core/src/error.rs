// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the table engine.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for table operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening or reading a table file
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure while opening or mapping a table
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The table header could not be parsed (bad length field, truncated
    /// file, malformed column definitions)
    #[error("unparsable table header in {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    /// A record's bytes do not decode according to its column types
    #[error("corrupt record in table '{table}' row {row}: {reason}")]
    CorruptRecord {
        table: String,
        row: usize,
        reason: String,
    },

    /// A row index beyond the table's bounds
    #[error("row index {index} out of range for table '{table}' ({count} rows)")]
    OutOfRange {
        table: String,
        index: usize,
        count: usize,
    },
}

impl Error {
    /// Create a header format error
    pub fn format(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Error::Format {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a corrupt record error attributed to a table and row index
    pub fn corrupt(table: impl Into<String>, row: usize, reason: impl Into<String>) -> Self {
        Error::CorruptRecord {
            table: table.into(),
            row,
            reason: reason.into(),
        }
    }
}
