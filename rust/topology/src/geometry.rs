// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry values assembled from primitive records.
//!
//! Geometry is planar vector data in library coordinate space: a point, an
//! open line, or a polygon of closed rings. Coordinates are
//! [`nalgebra::Point3`] with z carried through from 3D tables and zero for 2D
//! tables.

use nalgebra::Point3;

use crate::extent::Extent;

/// A single position in library coordinate space.
pub type Coordinate = Point3<f64>;

/// Geometry kind of a feature class, decided by schema inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeometryKind {
    /// Single node position
    Point,
    /// Open edge chain
    Line,
    /// Face with one or more closed rings
    Area,
    /// Attribute-only features, no geometry
    None,
}

impl GeometryKind {
    /// True when features of this kind carry geometry.
    #[inline]
    pub fn has_geometry(&self) -> bool {
        !matches!(self, GeometryKind::None)
    }
}

/// One closed boundary of a polygon.
///
/// Rings hold their closing duplicate explicitly: the first and last
/// coordinates are equal once [`Ring::close`] has run.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub coordinates: Vec<Coordinate>,
}

impl Ring {
    /// Wrap an ordered coordinate walk as a ring (not yet closed).
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        Self { coordinates }
    }

    /// Check the closure invariant: first coordinate equals last.
    pub fn is_closed(&self) -> bool {
        match (self.coordinates.first(), self.coordinates.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Force closure by appending the first coordinate when the walk does
    /// not already return to it. Returns `true` when a coordinate was added.
    pub fn close(&mut self) -> bool {
        if self.coordinates.len() >= 2 && !self.is_closed() {
            let first = self.coordinates[0];
            self.coordinates.push(first);
            return true;
        }
        false
    }

    /// Planar area enclosed by the ring (shoelace formula, absolute value).
    pub fn area(&self) -> f64 {
        if self.coordinates.len() < 4 {
            return 0.0;
        }
        let mut twice_area = 0.0;
        for pair in self.coordinates.windows(2) {
            twice_area += pair[0].x * pair[1].y - pair[1].x * pair[0].y;
        }
        (twice_area / 2.0).abs()
    }
}

/// A materialized geometry value, owned by the caller once returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Single coordinate
    Point(Coordinate),
    /// Ordered open coordinate sequence
    Line(Vec<Coordinate>),
    /// Closed rings: the first is the outer boundary, the rest are holes
    Polygon(Vec<Ring>),
}

impl Geometry {
    /// Bounding extent of the geometry.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::new();
        match self {
            Geometry::Point(c) => extent.include(c),
            Geometry::Line(coords) => {
                for c in coords {
                    extent.include(c);
                }
            }
            Geometry::Polygon(rings) => {
                for ring in rings {
                    for c in &ring.coordinates {
                        extent.include(c);
                    }
                }
            }
        }
        extent
    }

    /// Total coordinate count across all parts.
    pub fn coordinate_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::Line(coords) => coords.len(),
            Geometry::Polygon(rings) => rings.iter().map(|r| r.coordinates.len()).sum(),
        }
    }

    /// Enclosed planar area: outer ring minus holes for polygons, zero for
    /// points and lines.
    pub fn area(&self) -> f64 {
        match self {
            Geometry::Polygon(rings) => {
                let mut rings_iter = rings.iter();
                let outer = rings_iter.next().map(Ring::area).unwrap_or(0.0);
                let holes: f64 = rings_iter.map(Ring::area).sum();
                (outer - holes).max(0.0)
            }
            _ => 0.0,
        }
    }
}
