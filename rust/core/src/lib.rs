// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # VPF-Lite Core Table Engine
//!
//! Reader for the self-describing binary table format used by VPF-style
//! vector product libraries. Each table file carries an ASCII header (parsed
//! with [nom](https://docs.rs/nom)) describing byte order and an ordered
//! column list, followed by fixed- or variable-length binary records.
//!
//! ## Overview
//!
//! - **Header parsing**: byte order, column names, types, counts, key types
//! - **Typed decoding**: integers, floats, padded text, coordinate
//!   pairs/triples, id arrays — all in the table's native byte order
//! - **Random access**: fixed-length tables index directly by offset;
//!   variable-length tables build a one-shot offset index
//! - **Lazy scans**: forward-only, restartable cursors that surface corrupt
//!   records per row without poisoning the walk
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vpf_lite_core::TableFile;
//!
//! let table = TableFile::open("noamer/hydro/edg")?;
//! let mut cursor = table.scan();
//! while let Some(row) = cursor.next_row() {
//!     let row = row?;
//!     println!("edge {} has {:?}", row.id(), row.get("coordinates"));
//! }
//! ```
//!
//! Tables are memory-mapped read-only; every positional read is a stateless
//! slice of the shared map, so cursors from multiple threads never contend.
//!
//! ## Feature Flags
//!
//! - `serde`: enable serialization support for the descriptor types

pub mod error;
pub mod header;
pub mod record;
pub mod table;
pub mod value;

pub use error::{Error, Result};
pub use header::{ByteOrder, ColumnCount, ColumnDescriptor, ColumnType, KeyType, TableHeader};
pub use record::Row;
pub use table::{RowCursor, TableFile};
pub use value::Value;
