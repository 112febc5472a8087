// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema derivation
//!
//! A feature class's schema comes from its feature table header: the
//! attribute columns (reserved id/join columns excluded) plus a geometry
//! kind inferred from which join column the table carries. Inference is a
//! pure function over the described column list, driven by an explicit rule
//! table in priority order — area over line over point — so the policy is
//! testable rather than buried in conditionals.

use vpf_lite_core::{ColumnDescriptor, ColumnType, Row, Value};
use vpf_lite_topology::{GeometryKind, PrimitiveReference};

use crate::error::{Error, Result};

/// Join-column conventions in priority order. The first rule whose column
/// exists in a feature table decides the geometry kind and join column.
pub const GEOMETRY_RULES: &[(&str, GeometryKind)] = &[
    ("fac_id", GeometryKind::Area),
    ("edg_id", GeometryKind::Line),
    ("end_id", GeometryKind::Point),
    ("cnd_id", GeometryKind::Point),
];

/// Reserved column names that never appear in an attribute schema: the row
/// id, every join convention above, and the text-primitive join of older
/// libraries (whose geometry is out of scope).
const RESERVED_COLUMNS: &[&str] = &["id", "fac_id", "edg_id", "end_id", "cnd_id", "txt_id"];

/// Semantic type of an attribute column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeType {
    Integer,
    Double,
    Text,
    Coordinate,
}

impl AttributeType {
    /// Semantic type of a column, `None` for null placeholders
    fn of(column: &ColumnDescriptor) -> Option<Self> {
        match column.column_type {
            ColumnType::ShortInt | ColumnType::LongInt | ColumnType::Key => {
                Some(AttributeType::Integer)
            }
            ColumnType::Float | ColumnType::Double => Some(AttributeType::Double),
            ColumnType::Text | ColumnType::Date => Some(AttributeType::Text),
            ColumnType::Coord2Float
            | ColumnType::Coord2Double
            | ColumnType::Coord3Float
            | ColumnType::Coord3Double => Some(AttributeType::Coordinate),
            ColumnType::Null => None,
        }
    }
}

/// One attribute column of a feature class
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeDescriptor {
    pub name: String,
    pub attribute_type: AttributeType,
    /// Narrative metadata from the column definition, informational only
    pub description: String,
}

/// Derived schema of one feature class. Built once, immutable, shared
/// read-only by every cursor over the class.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureClassDescriptor {
    pub feature_class: String,
    pub coverage: String,
    /// Feature table file name inside the coverage directory
    pub table: String,
    pub attributes: Vec<AttributeDescriptor>,
    pub geometry: GeometryKind,
    /// The join column reaching the primitive tables, when geometry exists
    pub join_column: Option<String>,
}

impl FeatureClassDescriptor {
    /// Derive a descriptor from a feature table's columns.
    pub fn derive(
        coverage: &str,
        feature_class: &str,
        table: &str,
        columns: &[ColumnDescriptor],
    ) -> Result<Self> {
        let (geometry, join_column) = infer_geometry_kind(columns);
        if geometry.has_geometry() && join_column.is_none() {
            // Unreachable by construction of the rule table; kept as a
            // schema-level guard
            return Err(Error::schema(feature_class, "join column not located"));
        }

        let attributes = columns
            .iter()
            .filter(|col| !RESERVED_COLUMNS.contains(&col.name.as_str()))
            .filter_map(|col| {
                AttributeType::of(col).map(|attribute_type| AttributeDescriptor {
                    name: col.name.clone(),
                    attribute_type,
                    description: col.description.clone(),
                })
            })
            .collect();

        Ok(Self {
            feature_class: feature_class.to_string(),
            coverage: coverage.to_string(),
            table: table.to_string(),
            attributes,
            geometry,
            join_column: join_column.map(str::to_string),
        })
    }

    /// Coverage-qualified name, `<coverage>:<class>`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.coverage, self.feature_class)
    }

    /// Find an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Extract a row's primitive reference through the join column.
    ///
    /// Returns `Ok(None)` for attribute-only classes and for rows whose join
    /// value is null (a feature legitimately carrying no geometry); a join
    /// value of the wrong shape is a schema error.
    pub fn primitive_reference(&self, row: &Row) -> Result<Option<PrimitiveReference>> {
        let Some(join_column) = self.join_column.as_deref() else {
            return Ok(None);
        };
        let value = match row.get(join_column) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };

        let reference = match join_column {
            "fac_id" => value.as_key().map(PrimitiveReference::Face),
            "edg_id" => value.as_key_list().map(PrimitiveReference::EdgeChain),
            "end_id" => value.as_key().map(PrimitiveReference::EntityNode),
            "cnd_id" => value.as_key().map(PrimitiveReference::ConnectedNode),
            _ => None,
        };
        reference.map(Some).ok_or_else(|| {
            Error::schema(
                &self.feature_class,
                format!("join column '{join_column}' does not hold primitive ids"),
            )
        })
    }
}

/// Decide a feature table's geometry kind from its columns.
///
/// Pure function over the described column list: the first entry of
/// [`GEOMETRY_RULES`] whose column is present wins; no match means
/// attribute-only features.
pub fn infer_geometry_kind(columns: &[ColumnDescriptor]) -> (GeometryKind, Option<&'static str>) {
    for &(name, kind) in GEOMETRY_RULES {
        if columns.iter().any(|col| col.name == name) {
            return (kind, Some(name));
        }
    }
    (GeometryKind::None, None)
}
