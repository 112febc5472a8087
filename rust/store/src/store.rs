// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Store facade
//!
//! The outward surface of an opened library: feature-class names, schema
//! lookup, feature cursors, and extents. Descriptors and primitive table
//! handles are built once and shared; everything else stays lazy.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tracing::debug;
use vpf_lite_topology::{Extent, PrimitiveTables, TopologyAssembler};

use crate::catalog::{Catalog, Coverage, FeatureClassEntry};
use crate::error::{Error, Result};
use crate::feature::FeatureCursor;
use crate::schema::FeatureClassDescriptor;

/// An opened library and the entry point for feature access.
///
/// Cursors opened from one store share its read-only headers, descriptors,
/// and table mappings; any number may iterate concurrently.
pub struct VpfStore {
    catalog: Catalog,
    descriptors: Mutex<FxHashMap<String, Arc<FeatureClassDescriptor>>>,
    primitives: Mutex<FxHashMap<String, Arc<PrimitiveTables>>>,
}

impl VpfStore {
    /// Open the library rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let catalog = Catalog::open(root)?;
        debug!(
            library = catalog.library_name(),
            coverages = catalog.coverages().len(),
            "library opened"
        );
        Ok(Self {
            catalog,
            descriptors: Mutex::new(FxHashMap::default()),
            primitives: Mutex::new(FxHashMap::default()),
        })
    }

    /// The underlying catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Ordered, coverage-qualified feature class names
    pub fn names(&self) -> Vec<String> {
        self.catalog
            .coverages()
            .iter()
            .flat_map(|coverage| {
                coverage
                    .feature_classes
                    .iter()
                    .map(|fc| format!("{}:{}", coverage.name, fc.name))
            })
            .collect()
    }

    /// Schema of a feature class.
    ///
    /// Accepts a `<coverage>:<class>` qualified name or a bare class name
    /// (first match across coverages). Descriptors are derived once and
    /// shared.
    pub fn schema(&self, name: &str) -> Result<Arc<FeatureClassDescriptor>> {
        let (coverage, entry) = self.resolve_name(name)?;
        let qualified = format!("{}:{}", coverage.name, entry.name);

        let mut descriptors = self
            .descriptors
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(descriptor) = descriptors.get(&qualified) {
            return Ok(Arc::clone(descriptor));
        }

        let table = self.catalog.table(coverage.path.join(&entry.table))?;
        let descriptor = Arc::new(FeatureClassDescriptor::derive(
            &coverage.name,
            &entry.name,
            &entry.table,
            table.header().columns(),
        )?);
        descriptors.insert(qualified, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Open a feature cursor over a class, optionally filtered by extent.
    pub fn features(&self, name: &str, filter: Option<Extent>) -> Result<FeatureCursor> {
        let descriptor = self.schema(name)?;
        let (coverage, entry) = self.resolve_name(name)?;
        let table = self.catalog.table(coverage.path.join(&entry.table))?;
        let assembler = TopologyAssembler::new(self.coverage_primitives(coverage));
        Ok(FeatureCursor::new(descriptor, table, assembler, filter))
    }

    /// Bounding extent of a feature class.
    ///
    /// Prefers the library header's stored extent when present and trusted.
    /// Otherwise falls back to folding over a full feature scan — O(dataset
    /// size), documented as such.
    pub fn bounds(&self, name: &str) -> Result<Extent> {
        if let Some(extent) = self.catalog.stored_extent() {
            return Ok(*extent);
        }

        debug!(feature_class = name, "no stored extent, folding over a full scan");
        let mut total = Extent::new();
        let mut cursor = self.features(name, None)?;
        while let Some(feature) = cursor.next() {
            if let Some(extent) = feature?.extent() {
                total.union(&extent);
            }
        }
        Ok(total)
    }

    /// Shared primitive table handles for a coverage
    fn coverage_primitives(&self, coverage: &Coverage) -> Arc<PrimitiveTables> {
        let mut primitives = self
            .primitives
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match primitives.get(&coverage.name) {
            Some(tables) => Arc::clone(tables),
            None => {
                let tables = Arc::new(PrimitiveTables::open(&coverage.path));
                primitives.insert(coverage.name.clone(), Arc::clone(&tables));
                tables
            }
        }
    }

    /// Resolve a qualified or bare feature class name
    fn resolve_name(&self, name: &str) -> Result<(&Coverage, &FeatureClassEntry)> {
        if let Some((coverage_name, class_name)) = name.split_once(':') {
            let coverage = self
                .catalog
                .coverage(coverage_name)
                .ok_or_else(|| Error::schema(name, "unknown coverage"))?;
            let entry = coverage
                .feature_class(class_name)
                .ok_or_else(|| Error::schema(name, "unknown feature class"))?;
            return Ok((coverage, entry));
        }

        self.catalog
            .coverages()
            .iter()
            .find_map(|coverage| coverage.feature_class(name).map(|entry| (coverage, entry)))
            .ok_or_else(|| Error::schema(name, "unknown feature class"))
    }
}

impl std::fmt::Debug for VpfStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VpfStore").field("catalog", &self.catalog).finish()
    }
}
