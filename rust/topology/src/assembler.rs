// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology assembly: primitive references to concrete geometry.
//!
//! A feature row points into the primitive tables with a node id, an ordered
//! edge-id list, or a face id. The assembler performs the cross-table joins —
//! feature → edge/ring → node — preserving order throughout, since ring and
//! chain order determine the resulting shape. Nothing is pre-materialized:
//! every resolution is an on-demand walk over the shared table handles.

use std::sync::Arc;

use tracing::warn;

use crate::error::Result;
use crate::geometry::{Coordinate, Geometry, Ring};
use crate::primitives::PrimitiveTables;

/// A feature row's foreign key into the primitive tables. Transient,
/// computed per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveReference {
    /// Entity node id (isolated point)
    EntityNode(i32),
    /// Connected node id (point on the edge network)
    ConnectedNode(i32),
    /// Ordered edge ids forming an open chain
    EdgeChain(Vec<i32>),
    /// Face id whose ring table rows define the boundary
    Face(i32),
}

/// Resolves primitive references against one coverage's primitive tables.
#[derive(Debug, Clone)]
pub struct TopologyAssembler {
    primitives: Arc<PrimitiveTables>,
}

impl TopologyAssembler {
    pub fn new(primitives: Arc<PrimitiveTables>) -> Self {
        Self { primitives }
    }

    /// The primitive tables this assembler resolves against.
    pub fn primitives(&self) -> &Arc<PrimitiveTables> {
        &self.primitives
    }

    /// Resolve a reference into concrete geometry.
    ///
    /// Fails with a reference error when any primitive id along the join
    /// chain does not exist; an edge-order mismatch is tolerated and logged,
    /// not an error.
    pub fn resolve(&self, reference: &PrimitiveReference) -> Result<Geometry> {
        match reference {
            PrimitiveReference::EntityNode(id) => {
                Ok(Geometry::Point(self.primitives.entity_node(*id)?))
            }
            PrimitiveReference::ConnectedNode(id) => {
                Ok(Geometry::Point(self.primitives.connected_node(*id)?))
            }
            PrimitiveReference::EdgeChain(edge_ids) => {
                Ok(Geometry::Line(self.resolve_chain(edge_ids)?))
            }
            PrimitiveReference::Face(face_id) => self.resolve_area(*face_id),
        }
    }

    /// Concatenate edge coordinate chains in list order.
    ///
    /// When consecutive edges connect (the previous end node is the next
    /// start node) the shared join coordinate is emitted once. A mismatch is
    /// a known wart of older datasets: the chain is still emitted, as a raw
    /// concatenation, with a warning.
    fn resolve_chain(&self, edge_ids: &[i32]) -> Result<Vec<Coordinate>> {
        let mut coordinates: Vec<Coordinate> = Vec::new();
        let mut previous_end: Option<i32> = None;

        for &edge_id in edge_ids {
            let edge = self.primitives.edge(edge_id)?;

            if coordinates.is_empty() {
                coordinates.extend_from_slice(&edge.coordinates);
                previous_end = edge.end_node;
                continue;
            }

            // Topology when recorded, coordinate equality otherwise
            let joined = match (previous_end, edge.start_node) {
                (Some(prev), Some(start)) => prev == start,
                _ => coordinates.last() == edge.coordinates.first(),
            };
            if !joined {
                warn!(
                    edge = edge_id,
                    "edge chain discontinuity: previous end node does not match start node"
                );
            }

            if joined && coordinates.last() == edge.coordinates.first() {
                coordinates.extend_from_slice(&edge.coordinates[1..]);
            } else {
                coordinates.extend_from_slice(&edge.coordinates);
            }
            previous_end = edge.end_node;
        }

        Ok(coordinates)
    }

    /// Resolve a face into a polygon: each ring resolves like a line, then
    /// closure is forced when the walk does not return to its start.
    fn resolve_area(&self, face_id: i32) -> Result<Geometry> {
        let ring_definitions = self.primitives.face_rings(face_id)?;
        let mut rings = Vec::with_capacity(ring_definitions.len());

        for edge_ids in &ring_definitions {
            let mut ring = Ring::new(self.resolve_chain(edge_ids)?);
            if ring.close() {
                warn!(face = face_id, "ring walk did not return to start; closure forced");
            }
            rings.push(ring);
        }

        Ok(Geometry::Polygon(rings))
    }
}
