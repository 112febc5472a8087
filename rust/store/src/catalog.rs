// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directory catalog
//!
//! Walks the library directory tree once at open: the library header table
//! (`lht`) at the root, the coverage attribute table (`cat`) listing coverage
//! subdirectories, and each coverage's feature class schema table (`fcs`).
//! The resulting catalog is immutable — the library is read-only and not
//! watched for external mutation — and the feature-class name set is stable
//! for its lifetime.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tracing::debug;
use vpf_lite_core::TableFile;
use vpf_lite_topology::Extent;

use crate::error::{Error, Result};

/// Library header table at the library root
pub const LIBRARY_HEADER_TABLE: &str = "lht";
/// Coverage attribute table at the library root
pub const COVERAGE_TABLE: &str = "cat";
/// Feature class schema table inside each coverage directory
pub const FEATURE_CLASS_TABLE: &str = "fcs";

/// One feature class listed by a coverage's `fcs` table, with the feature
/// table file backing it (verified to exist at catalog open).
#[derive(Debug, Clone)]
pub struct FeatureClassEntry {
    pub name: String,
    /// Feature table file name inside the coverage directory
    pub table: String,
}

/// One coverage subdirectory and its feature classes.
#[derive(Debug, Clone)]
pub struct Coverage {
    pub name: String,
    pub description: String,
    pub path: PathBuf,
    pub feature_classes: Vec<FeatureClassEntry>,
}

impl Coverage {
    /// Find a feature class by (unqualified) name
    pub fn feature_class(&self, name: &str) -> Option<&FeatureClassEntry> {
        self.feature_classes.iter().find(|fc| fc.name == name)
    }
}

/// An opened library: root metadata plus the coverage/feature-class listing,
/// and a shared cache of open table handles.
pub struct Catalog {
    root: PathBuf,
    library_name: String,
    description: String,
    stored_extent: Option<Extent>,
    coverages: Vec<Coverage>,
    /// Open-table cache so concurrent cursors share one mapping per file.
    /// The lock guards only the map; reads through the handles are lock-free.
    tables: Mutex<FxHashMap<PathBuf, Arc<TableFile>>>,
}

impl Catalog {
    /// Open a library rooted at `root`.
    ///
    /// Fails fast with [`Error::NotFound`] when no library header table is
    /// present. Stale `fcs` rows naming feature tables that do not exist on
    /// disk are tolerated and skipped, not fatal.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let header_path = root.join(LIBRARY_HEADER_TABLE);
        if !header_path.is_file() {
            return Err(Error::NotFound(root));
        }

        let mut catalog = Self {
            root: root.clone(),
            library_name: String::new(),
            description: String::new(),
            stored_extent: None,
            coverages: Vec::new(),
            tables: Mutex::new(FxHashMap::default()),
        };

        catalog.read_library_header(&header_path)?;
        catalog.read_coverages()?;
        Ok(catalog)
    }

    fn read_library_header(&mut self, path: &Path) -> Result<()> {
        let table = self.table(path)?;
        if table.row_count() == 0 {
            return Err(Error::NotFound(self.root.clone()));
        }
        let row = table.read_row(0)?;

        self.library_name = row
            .get("library_name")
            .and_then(|v| v.as_text())
            .unwrap_or_default()
            .to_string();
        self.description = row
            .get("description")
            .and_then(|v| v.as_text())
            .unwrap_or_default()
            .to_string();

        // The stored extent is optional and untrusted until it proves finite
        // and properly ordered.
        let corner = |name: &str| row.get(name).and_then(|v| v.as_double());
        self.stored_extent = match (corner("xmin"), corner("ymin"), corner("xmax"), corner("ymax"))
        {
            (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => {
                let extent = Extent::from_corners(min_x, min_y, max_x, max_y);
                if extent.is_none() {
                    debug!(library = %self.library_name, "stored extent is untrusted, ignoring");
                }
                extent
            }
            _ => None,
        };
        Ok(())
    }

    fn read_coverages(&mut self) -> Result<()> {
        let coverage_path = self.root.join(COVERAGE_TABLE);
        if !coverage_path.is_file() {
            return Err(Error::MissingTable(coverage_path));
        }

        let table = self.table(&coverage_path)?;
        let mut cursor = table.scan();
        while let Some(row) = cursor.next_row() {
            let row = row?;
            let name = match row.get("coverage_name").and_then(|v| v.as_text()) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => {
                    debug!(row = row.id(), "coverage row without a name, skipping");
                    continue;
                }
            };
            let path = self.root.join(&name);
            if !path.is_dir() {
                debug!(coverage = %name, "listed coverage directory does not exist, skipping");
                continue;
            }
            let description = row
                .get("description")
                .and_then(|v| v.as_text())
                .unwrap_or_default()
                .to_string();

            let feature_classes = self.read_feature_classes(&path)?;
            self.coverages.push(Coverage {
                name,
                description,
                path,
                feature_classes,
            });
        }
        Ok(())
    }

    /// A feature class is listed only when its backing table file actually
    /// exists; the `fcs` table is allowed to be stale.
    fn read_feature_classes(&self, coverage_path: &Path) -> Result<Vec<FeatureClassEntry>> {
        let schema_path = coverage_path.join(FEATURE_CLASS_TABLE);
        if !schema_path.is_file() {
            debug!(path = %coverage_path.display(), "coverage has no feature class table");
            return Ok(Vec::new());
        }

        let table = self.table(&schema_path)?;
        let mut entries = Vec::new();
        let mut cursor = table.scan();
        while let Some(row) = cursor.next_row() {
            let row = row?;
            let name = row.get("feature_class").and_then(|v| v.as_text());
            let file = row.get("table").and_then(|v| v.as_text());
            let (Some(name), Some(file)) = (name, file) else {
                debug!(row = row.id(), "feature class row is incomplete, skipping");
                continue;
            };
            if !coverage_path.join(file).is_file() {
                debug!(feature_class = name, table = file, "stale feature class entry, skipping");
                continue;
            }
            entries.push(FeatureClassEntry {
                name: name.to_string(),
                table: file.to_string(),
            });
        }
        Ok(entries)
    }

    /// Library root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Library name from the header table
    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    /// Library description from the header table
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The header's stored extent, when present and trusted
    pub fn stored_extent(&self) -> Option<&Extent> {
        self.stored_extent.as_ref()
    }

    /// Coverages in coverage-table order
    pub fn coverages(&self) -> &[Coverage] {
        &self.coverages
    }

    /// Find a coverage by name
    pub fn coverage(&self, name: &str) -> Option<&Coverage> {
        self.coverages.iter().find(|c| c.name == name)
    }

    /// Shared handle to a table file, opened once and cached. Every cursor
    /// over the same file shares one read-only mapping.
    pub fn table(&self, path: impl AsRef<Path>) -> Result<Arc<TableFile>> {
        let path = path.as_ref().to_path_buf();
        let mut tables = self
            .tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(table) = tables.get(&path) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(TableFile::open(&path)?);
        tables.insert(path, Arc::clone(&table));
        Ok(table)
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("root", &self.root)
            .field("library_name", &self.library_name)
            .field("coverages", &self.coverages.len())
            .finish()
    }
}
