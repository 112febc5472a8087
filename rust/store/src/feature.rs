// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lazy feature iteration
//!
//! A [`FeatureCursor`] pulls one feature per `next` call: one table step plus
//! one topology resolution, nothing ahead of the caller. Cursors are
//! forward-only; restarting means opening a new cursor, which yields an
//! identical sequence (the library is read-only). Per-row failures are
//! yielded as errors attributed to the feature class and row without
//! poisoning the cursor.

use std::sync::Arc;

use vpf_lite_core::{Row, TableFile, Value};
use vpf_lite_topology::{Extent, Geometry, TopologyAssembler};

use crate::error::{Error, Result};
use crate::schema::FeatureClassDescriptor;

/// One materialized feature: attribute row plus optional geometry, keyed by
/// its row id. Handed to the caller and forgotten — the engine holds no
/// feature cache.
#[derive(Debug, Clone)]
pub struct Feature {
    pub id: i32,
    pub row: Row,
    pub geometry: Option<Geometry>,
}

impl Feature {
    /// Value of a named attribute column
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.row.get(name)
    }

    /// Bounding extent of the feature's geometry, when it has one
    pub fn extent(&self) -> Option<Extent> {
        self.geometry.as_ref().map(Geometry::extent)
    }
}

/// Forward-only cursor over one feature class.
pub struct FeatureCursor {
    descriptor: Arc<FeatureClassDescriptor>,
    table: Arc<TableFile>,
    assembler: TopologyAssembler,
    filter: Option<Extent>,
    next_index: usize,
}

impl FeatureCursor {
    pub(crate) fn new(
        descriptor: Arc<FeatureClassDescriptor>,
        table: Arc<TableFile>,
        assembler: TopologyAssembler,
        filter: Option<Extent>,
    ) -> Self {
        Self {
            descriptor,
            table,
            assembler,
            filter,
            next_index: 0,
        }
    }

    /// The schema this cursor iterates under
    pub fn descriptor(&self) -> &Arc<FeatureClassDescriptor> {
        &self.descriptor
    }

    /// Produce the next feature, or `None` at the end of the class.
    ///
    /// An `Err` is one row's failure; the cursor continues with the
    /// following row. When an extent filter is set, candidates whose
    /// geometry does not intersect it are resolved, discarded, and never
    /// surfaced — filtering cost follows candidates examined, not results.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Result<Feature>> {
        loop {
            if self.next_index >= self.table.row_count() {
                return None;
            }
            let index = self.next_index;
            self.next_index += 1;

            let row = match self.table.read_row(index) {
                Ok(row) => row,
                Err(err) => return Some(Err(self.row_error(index, err.into()))),
            };

            let geometry = match self.resolve_geometry(&row) {
                Ok(geometry) => geometry,
                Err(err) => return Some(Err(self.row_error(index, err))),
            };

            if let Some(filter) = &self.filter {
                let intersects = geometry
                    .as_ref()
                    .is_some_and(|g| g.extent().intersects(filter));
                if !intersects {
                    continue;
                }
            }

            return Some(Ok(Feature {
                id: row.id(),
                row,
                geometry,
            }));
        }
    }

    /// Release the cursor's shared table handles eagerly. Dropping without
    /// closing releases them just the same; close merely makes the point
    /// explicit at call sites.
    pub fn close(self) {}

    fn resolve_geometry(&self, row: &Row) -> Result<Option<Geometry>> {
        match self.descriptor.primitive_reference(row)? {
            Some(reference) => Ok(Some(self.assembler.resolve(&reference)?)),
            None => Ok(None),
        }
    }

    fn row_error(&self, row: usize, source: Error) -> Error {
        Error::feature(self.descriptor.qualified_name(), row, source)
    }
}

impl std::fmt::Debug for FeatureCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureCursor")
            .field("feature_class", &self.descriptor.qualified_name())
            .field("next_index", &self.next_index)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}
