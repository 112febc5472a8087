// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology resolution.

use thiserror::Error;

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving primitive references into geometry.
#[derive(Error, Debug)]
pub enum Error {
    /// A primitive id referenced by a feature does not exist in its table.
    /// This is a data-integrity failure, never a silent empty geometry.
    #[error("primitive id {id} does not exist in table '{table}'")]
    Reference { table: String, id: i32 },

    /// A primitive row exists but lacks the column or value its role requires.
    #[error("table '{table}' id {id} is not a usable primitive: {reason}")]
    Primitive {
        table: String,
        id: i32,
        reason: String,
    },

    /// Underlying table engine failure.
    #[error(transparent)]
    Table(#[from] vpf_lite_core::Error),
}

impl Error {
    /// Create a dangling-reference error.
    pub fn reference(table: impl Into<String>, id: i32) -> Self {
        Error::Reference {
            table: table.into(),
            id,
        }
    }

    /// Create a malformed-primitive error.
    pub fn primitive(table: impl Into<String>, id: i32, reason: impl Into<String>) -> Self {
        Error::Primitive {
            table: table.into(),
            id,
            reason: reason.into(),
        }
    }
}
