// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the store facade.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening a library or iterating its features
#[derive(Error, Debug)]
pub enum Error {
    /// The root directory does not hold a library header table
    #[error("no library header table at {0}")]
    NotFound(PathBuf),

    /// A table required by the directory layout is missing
    #[error("missing required table {0}")]
    MissingTable(PathBuf),

    /// The geometry kind or join column of a feature class cannot be
    /// determined
    #[error("cannot determine schema for feature class '{feature_class}': {reason}")]
    Schema {
        feature_class: String,
        reason: String,
    },

    /// A per-row failure during iteration, attributed to its feature class.
    /// The cursor that produced it continues with the following row.
    #[error("feature class '{feature_class}' row {row}: {source}")]
    Feature {
        feature_class: String,
        row: usize,
        #[source]
        source: Box<Error>,
    },

    /// Geometry assembly failure
    #[error(transparent)]
    Topology(#[from] vpf_lite_topology::Error),

    /// Table engine failure
    #[error(transparent)]
    Table(#[from] vpf_lite_core::Error),
}

impl Error {
    /// Create a schema error
    pub fn schema(feature_class: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Schema {
            feature_class: feature_class.into(),
            reason: reason.into(),
        }
    }

    /// Attribute an iteration failure to a feature class and row
    pub fn feature(feature_class: impl Into<String>, row: usize, source: Error) -> Self {
        Error::Feature {
            feature_class: feature_class.into(),
            row,
            source: Box::new(source),
        }
    }
}
