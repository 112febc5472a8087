// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry assembly over synthetic primitive tables.
//!
//! Builds small literal topologies on disk (a unit-scale square, short edge
//! chains) and checks the join, dedup, closure, and failure behavior of the
//! assembler against them.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use approx::assert_relative_eq;
use vpf_lite_topology::{
    Error, Geometry, PrimitiveReference, PrimitiveTables, TopologyAssembler,
};

const NODE_HEADER: &str =
    "L;Entity Node Primitive;-;id=I,1,P,-,-,-,-:coordinate=B,1,N,-,-,-,-:;";
const EDGE_HEADER: &str = "L;Edge Primitive;-;id=I,1,P,-,-,-,-:start_node=I,1,N,-,-,-,-:\
                           end_node=I,1,N,-,-,-,-:coordinates=B,*,N,-,-,-,-:;";
const RING_HEADER: &str =
    "L;Ring Table;-;id=I,1,P,-,-,-,-:face_id=I,1,N,-,-,-,-:edge_ids=K,*,N,-,-,-,-:;";

fn encode_table(header_text: &str, records: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(header_text.len() as u32).to_le_bytes());
    out.extend_from_slice(header_text.as_bytes());
    for record in records {
        out.extend_from_slice(record);
    }
    out
}

fn node_record(id: i32, x: f64, y: f64) -> Vec<u8> {
    let mut r = Vec::new();
    r.extend_from_slice(&id.to_le_bytes());
    r.extend_from_slice(&x.to_le_bytes());
    r.extend_from_slice(&y.to_le_bytes());
    r
}

fn edge_record(id: i32, start: i32, end: i32, coords: &[(f64, f64)]) -> Vec<u8> {
    let mut r = Vec::new();
    r.extend_from_slice(&id.to_le_bytes());
    r.extend_from_slice(&start.to_le_bytes());
    r.extend_from_slice(&end.to_le_bytes());
    r.extend_from_slice(&(coords.len() as u32).to_le_bytes());
    for &(x, y) in coords {
        r.extend_from_slice(&x.to_le_bytes());
        r.extend_from_slice(&y.to_le_bytes());
    }
    r
}

fn ring_record(id: i32, face: i32, edges: &[i32]) -> Vec<u8> {
    let mut r = Vec::new();
    r.extend_from_slice(&id.to_le_bytes());
    r.extend_from_slice(&face.to_le_bytes());
    r.extend_from_slice(&(edges.len() as u32).to_le_bytes());
    for e in edges {
        r.extend_from_slice(&e.to_le_bytes());
    }
    r
}

/// Runs a test against a coverage directory written under a unique temp
/// path, removing it afterwards.
fn with_coverage<F: FnOnce(&Path)>(tag: &str, tables: &[(&str, Vec<u8>)], f: F) {
    let mut dir = std::env::temp_dir();
    dir.push(format!("vpf-lite-topology-{}-{tag}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    for (name, bytes) in tables {
        fs::write(dir.join(name), bytes).unwrap();
    }
    f(&dir);
    let _ = fs::remove_dir_all(&dir);
}

fn assembler(dir: &Path) -> TopologyAssembler {
    TopologyAssembler::new(Arc::new(PrimitiveTables::open(dir)))
}

/// Square coverage: four nodes at the corners of a 10x10 square, four edges
/// walking them counterclockwise, and a single face whose ring references the
/// edges in order.
fn square_tables() -> Vec<(&'static str, Vec<u8>)> {
    let nodes = encode_table(
        NODE_HEADER,
        &[
            node_record(1, 0.0, 0.0),
            node_record(2, 10.0, 0.0),
            node_record(3, 10.0, 10.0),
            node_record(4, 0.0, 10.0),
        ],
    );
    let edges = encode_table(
        EDGE_HEADER,
        &[
            edge_record(1, 1, 2, &[(0.0, 0.0), (10.0, 0.0)]),
            edge_record(2, 2, 3, &[(10.0, 0.0), (10.0, 10.0)]),
            edge_record(3, 3, 4, &[(10.0, 10.0), (0.0, 10.0)]),
            edge_record(4, 4, 1, &[(0.0, 10.0), (0.0, 0.0)]),
        ],
    );
    let rings = encode_table(RING_HEADER, &[ring_record(1, 1, &[1, 2, 3, 4])]);
    vec![("end", nodes.clone()), ("cnd", nodes), ("edg", edges), ("rng", rings)]
}

#[test]
fn square_face_resolves_to_closed_polygon() {
    with_coverage("square", &square_tables(), |dir| {
        let geometry = assembler(dir)
            .resolve(&PrimitiveReference::Face(1))
            .unwrap();

        let Geometry::Polygon(rings) = &geometry else {
            panic!("expected polygon, got {geometry:?}");
        };
        assert_eq!(rings.len(), 1);

        // Four corners plus the closing duplicate of the start
        let coords = &rings[0].coordinates;
        assert_eq!(coords.len(), 5);
        assert_eq!(coords[0], coords[4]);
        assert_eq!((coords[1].x, coords[1].y), (10.0, 0.0));
        assert_eq!((coords[3].x, coords[3].y), (0.0, 10.0));
        assert!(rings[0].is_closed());
        assert_relative_eq!(geometry.area(), 100.0);
    });
}

#[test]
fn open_ring_walk_is_force_closed() {
    // Same square, but the ring omits the last edge, so the walk stops at
    // (0, 10) and closure must be forced.
    let mut tables = square_tables();
    tables[3].1 = encode_table(RING_HEADER, &[ring_record(1, 1, &[1, 2, 3])]);

    with_coverage("open-ring", &tables, |dir| {
        let geometry = assembler(dir)
            .resolve(&PrimitiveReference::Face(1))
            .unwrap();
        let Geometry::Polygon(rings) = &geometry else {
            panic!("expected polygon");
        };
        let coords = &rings[0].coordinates;
        assert_eq!(coords.len(), 5);
        assert!(rings[0].is_closed());
        assert_eq!(coords[0], coords[4]);
    });
}

#[test]
fn entity_and_connected_nodes_resolve_to_points() {
    with_coverage("nodes", &square_tables(), |dir| {
        let asm = assembler(dir);

        let point = asm.resolve(&PrimitiveReference::EntityNode(3)).unwrap();
        let Geometry::Point(c) = point else {
            panic!("expected point");
        };
        assert_eq!((c.x, c.y), (10.0, 10.0));

        let point = asm.resolve(&PrimitiveReference::ConnectedNode(1)).unwrap();
        assert_eq!(point, Geometry::Point(vpf_lite_topology::Coordinate::new(0.0, 0.0, 0.0)));
    });
}

#[test]
fn connected_chain_dedupes_join_coordinates() {
    // Three edges of three coordinates each, sharing endpoints: the chain
    // has 3 * 3 - 2 = 7 coordinates.
    let nodes = encode_table(
        NODE_HEADER,
        &[
            node_record(1, 0.0, 0.0),
            node_record(2, 2.0, 0.0),
            node_record(3, 4.0, 0.0),
            node_record(4, 6.0, 0.0),
        ],
    );
    let edges = encode_table(
        EDGE_HEADER,
        &[
            edge_record(1, 1, 2, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            edge_record(2, 2, 3, &[(2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]),
            edge_record(3, 3, 4, &[(4.0, 0.0), (5.0, 0.0), (6.0, 0.0)]),
        ],
    );
    let tables = vec![("end", nodes.clone()), ("cnd", nodes), ("edg", edges)];

    with_coverage("chain", &tables, |dir| {
        let geometry = assembler(dir)
            .resolve(&PrimitiveReference::EdgeChain(vec![1, 2, 3]))
            .unwrap();
        let Geometry::Line(coords) = &geometry else {
            panic!("expected line");
        };
        assert_eq!(coords.len(), 7);
        assert_eq!((coords[0].x, coords[6].x), (0.0, 6.0));
        // Strictly increasing x: no duplicated join points
        for pair in coords.windows(2) {
            assert!(pair[0].x < pair[1].x);
        }
    });
}

#[test]
fn discontinuous_chain_is_emitted_raw() {
    // The second edge starts at an unrelated node: the tolerant path keeps
    // every coordinate, 3 + 2 = 5.
    let nodes = encode_table(
        NODE_HEADER,
        &[
            node_record(1, 0.0, 0.0),
            node_record(2, 2.0, 0.0),
            node_record(3, 50.0, 0.0),
            node_record(4, 60.0, 0.0),
        ],
    );
    let edges = encode_table(
        EDGE_HEADER,
        &[
            edge_record(1, 1, 2, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            edge_record(2, 3, 4, &[(50.0, 0.0), (60.0, 0.0)]),
        ],
    );
    let tables = vec![("end", nodes.clone()), ("cnd", nodes), ("edg", edges)];

    with_coverage("broken-chain", &tables, |dir| {
        let geometry = assembler(dir)
            .resolve(&PrimitiveReference::EdgeChain(vec![1, 2]))
            .unwrap();
        let Geometry::Line(coords) = &geometry else {
            panic!("expected line");
        };
        assert_eq!(coords.len(), 5);
        assert_eq!((coords[2].x, coords[3].x), (2.0, 50.0));
    });
}

#[test]
fn missing_edge_id_is_a_reference_error() {
    with_coverage("missing-edge", &square_tables(), |dir| {
        let err = assembler(dir)
            .resolve(&PrimitiveReference::EdgeChain(vec![1, 999]))
            .unwrap_err();
        match err {
            Error::Reference { table, id } => {
                assert_eq!(table, "edg");
                assert_eq!(id, 999);
            }
            other => panic!("expected Reference, got {other:?}"),
        }
    });
}

#[test]
fn missing_face_is_a_reference_error() {
    with_coverage("missing-face", &square_tables(), |dir| {
        let err = assembler(dir)
            .resolve(&PrimitiveReference::Face(42))
            .unwrap_err();
        assert!(matches!(err, Error::Reference { id: 42, .. }));
    });
}

#[test]
fn polygon_with_hole() {
    // Outer 10x10 square plus an inner 2x2 hole at (2, 2)..(4, 4), each ring
    // a single closed-loop edge.
    let nodes = encode_table(
        NODE_HEADER,
        &[node_record(1, 0.0, 0.0), node_record(2, 2.0, 2.0)],
    );
    let edges = encode_table(
        EDGE_HEADER,
        &[
            edge_record(
                1,
                1,
                1,
                &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
            ),
            edge_record(
                2,
                2,
                2,
                &[(2.0, 2.0), (2.0, 4.0), (4.0, 4.0), (4.0, 2.0), (2.0, 2.0)],
            ),
        ],
    );
    let rings = encode_table(
        RING_HEADER,
        &[ring_record(1, 1, &[1]), ring_record(2, 1, &[2])],
    );
    let tables = vec![("end", nodes.clone()), ("cnd", nodes), ("edg", edges), ("rng", rings)];

    with_coverage("hole", &tables, |dir| {
        let geometry = assembler(dir)
            .resolve(&PrimitiveReference::Face(1))
            .unwrap();
        let Geometry::Polygon(rings) = &geometry else {
            panic!("expected polygon");
        };
        assert_eq!(rings.len(), 2);
        assert!(rings.iter().all(|r| r.is_closed()));
        assert_relative_eq!(geometry.area(), 96.0);
    });
}
