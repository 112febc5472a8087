// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # VPF-Lite Topology
//!
//! Turns primitive node/edge/ring records into concrete point, line, and
//! polygon geometry. The primitive tables form a cross-referenced graph
//! (feature → edge/ring → node); resolution is an on-demand, ordered walk
//! over shared table handles rather than an in-memory object graph — no
//! topology is pre-materialized, which bounds memory on arbitrarily large
//! coverages.

pub mod assembler;
pub mod error;
pub mod extent;
pub mod geometry;
pub mod primitives;

// Re-export nalgebra types for convenience
pub use nalgebra::Point3;

pub use assembler::{PrimitiveReference, TopologyAssembler};
pub use error::{Error, Result};
pub use extent::Extent;
pub use geometry::{Coordinate, Geometry, GeometryKind, Ring};
pub use primitives::{
    EdgeRecord, PrimitiveTables, CONNECTED_NODE_TABLE, EDGE_TABLE, ENTITY_NODE_TABLE, RING_TABLE,
};
