// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # VPF-Lite Store
//!
//! Opens a VPF-style library directory and exposes its feature classes:
//! name enumeration, derived attribute schemas, lazily-iterated features
//! with assembled geometry, and bounding extents.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vpf_lite_store::VpfStore;
//!
//! let store = VpfStore::open("/data/v0noa/vmaplv0/noamer")?;
//! for name in store.names() {
//!     println!("{name}: {:?}", store.schema(&name)?.geometry);
//! }
//!
//! let mut cursor = store.features("hydro:lakes", None)?;
//! while let Some(feature) = cursor.next() {
//!     let feature = feature?;
//!     println!("lake {} covers {:?}", feature.id, feature.extent());
//! }
//! cursor.close();
//! ```
//!
//! The store is the only surface a generic data-source integration needs:
//! `names`, `schema`, `features`, `bounds`.

pub mod catalog;
pub mod error;
pub mod feature;
pub mod schema;
pub mod store;

pub use catalog::{Catalog, Coverage, FeatureClassEntry};
pub use error::{Error, Result};
pub use feature::{Feature, FeatureCursor};
pub use schema::{
    infer_geometry_kind, AttributeDescriptor, AttributeType, FeatureClassDescriptor,
    GEOMETRY_RULES,
};
pub use store::VpfStore;

// Geometry types surface through the cursor API; re-export them for callers
pub use vpf_lite_topology::{Extent, Geometry, GeometryKind};
