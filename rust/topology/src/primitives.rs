// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access to a coverage's primitive tables.
//!
//! Primitive tables live beside the feature tables in each coverage
//! directory, under fixed names: entity nodes (`end`), connected nodes
//! (`cnd`), edges (`edg`), and rings (`rng`). [`PrimitiveTables`] opens them
//! lazily and shares each mapping read-only across every cursor that resolves
//! geometry from the coverage.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use vpf_lite_core::{Row, TableFile};

use crate::error::{Error, Result};
use crate::geometry::Coordinate;

/// Entity node primitive table (isolated point features)
pub const ENTITY_NODE_TABLE: &str = "end";
/// Connected node primitive table (edge endpoints)
pub const CONNECTED_NODE_TABLE: &str = "cnd";
/// Edge primitive table
pub const EDGE_TABLE: &str = "edg";
/// Ring table relating faces to their ordered edge lists
pub const RING_TABLE: &str = "rng";

/// One decoded edge primitive: endpoints plus its coordinate chain.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub id: i32,
    /// Node id the chain starts at, when the table records topology
    pub start_node: Option<i32>,
    /// Node id the chain ends at, when the table records topology
    pub end_node: Option<i32>,
    pub coordinates: Vec<Coordinate>,
}

/// Lazily-opened, shared handles to one coverage's primitive tables.
pub struct PrimitiveTables {
    dir: PathBuf,
    tables: Mutex<FxHashMap<&'static str, Arc<TableFile>>>,
}

impl PrimitiveTables {
    /// Point at a coverage directory. No table is touched until a primitive
    /// is first resolved.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            tables: Mutex::new(FxHashMap::default()),
        }
    }

    /// Coverage directory these primitives come from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Shared handle to a primitive table, opening and caching it on first
    /// use. The lock guards only the cache map; reads through the returned
    /// handle are lock-free positioned reads.
    fn table(&self, name: &'static str) -> Result<Arc<TableFile>> {
        let mut tables = self
            .tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(table) = tables.get(name) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(TableFile::open(self.dir.join(name))?);
        tables.insert(name, Arc::clone(&table));
        Ok(table)
    }

    /// Coordinate of an entity node.
    pub fn entity_node(&self, id: i32) -> Result<Coordinate> {
        self.node(ENTITY_NODE_TABLE, id)
    }

    /// Coordinate of a connected node.
    pub fn connected_node(&self, id: i32) -> Result<Coordinate> {
        self.node(CONNECTED_NODE_TABLE, id)
    }

    fn node(&self, name: &'static str, id: i32) -> Result<Coordinate> {
        let table = self.table(name)?;
        let row = fetch(&table, id)?;
        coordinates_of(&row)
            .and_then(|coords| coords.into_iter().next())
            .ok_or_else(|| Error::primitive(name, id, "node row has no coordinate"))
    }

    /// Decode one edge primitive.
    pub fn edge(&self, id: i32) -> Result<EdgeRecord> {
        let table = self.table(EDGE_TABLE)?;
        let row = fetch(&table, id)?;
        let coordinates = coordinates_of(&row)
            .filter(|coords| !coords.is_empty())
            .ok_or_else(|| Error::primitive(EDGE_TABLE, id, "edge row has no coordinates"))?;
        Ok(EdgeRecord {
            id,
            start_node: row.get("start_node").and_then(|v| v.as_int()),
            end_node: row.get("end_node").and_then(|v| v.as_int()),
            coordinates,
        })
    }

    /// Ordered ring definitions of a face: one edge-id list per ring, outer
    /// boundary first (ring table row order).
    ///
    /// A face with no rings is a dangling reference.
    pub fn face_rings(&self, face_id: i32) -> Result<Vec<Vec<i32>>> {
        let table = self.table(RING_TABLE)?;
        let mut rings = Vec::new();
        let mut cursor = table.scan();
        while let Some(row) = cursor.next_row() {
            let row = row?;
            let ring_face = row
                .get("face_id")
                .and_then(|v| v.as_int())
                .ok_or_else(|| {
                    Error::primitive(RING_TABLE, row.id(), "ring row has no face_id column")
                })?;
            if ring_face != face_id {
                continue;
            }
            let edges = row
                .get("edge_ids")
                .and_then(|v| v.as_key_list())
                .filter(|edges| !edges.is_empty())
                .ok_or_else(|| {
                    Error::primitive(RING_TABLE, row.id(), "ring row has no edge id list")
                })?;
            rings.push(edges);
        }
        if rings.is_empty() {
            return Err(Error::reference(RING_TABLE, face_id));
        }
        Ok(rings)
    }
}

impl std::fmt::Debug for PrimitiveTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveTables")
            .field("dir", &self.dir)
            .finish()
    }
}

/// Read the row holding a one-based primitive id, turning an out-of-range
/// index into the dangling-reference error the id represents.
fn fetch(table: &TableFile, id: i32) -> Result<Row> {
    table.read_row_by_id(id).map_err(|err| match err {
        vpf_lite_core::Error::OutOfRange { .. } => Error::reference(table.name(), id),
        other => Error::Table(other),
    })
}

/// Extract the first coordinate-typed column of a row as a coordinate
/// sequence.
fn coordinates_of(row: &Row) -> Option<Vec<Coordinate>> {
    let position = row
        .header()
        .columns()
        .iter()
        .position(|col| col.column_type.is_coordinate())?;
    let coords = row.value(position)?.as_coordinates()?;
    Some(
        coords
            .into_iter()
            .map(|(x, y, z)| Coordinate::new(x, y, z))
            .collect(),
    )
}
