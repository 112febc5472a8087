// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synthetic library fixtures.
//!
//! Writes a small but complete library under a unique temp directory: one
//! `hydro` coverage with an area class (a 10x10 square lake), a point class
//! (wells), a line class (rivers, one of which dangles on purpose), an
//! attribute-only class, and a stale `fcs` entry naming a table that does
//! not exist.

use std::fs;
use std::path::{Path, PathBuf};

/// Little-endian record encoder mirroring the table format's field layout.
pub struct RecordBuf {
    buf: Vec<u8>,
}

impl RecordBuf {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn int(mut self, v: i32) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn double(mut self, v: f64) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Fixed-width text, space-padded
    pub fn text_fixed(mut self, v: &str, width: usize) -> Self {
        let mut bytes = v.as_bytes().to_vec();
        assert!(bytes.len() <= width, "fixture text wider than its column");
        bytes.resize(width, b' ');
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Variable text: element count prefix plus the bytes
    pub fn text_var(mut self, v: &str) -> Self {
        self.buf.extend_from_slice(&(v.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(v.as_bytes());
        self
    }

    /// Variable id array: element count prefix plus the ids
    pub fn keys(mut self, ids: &[i32]) -> Self {
        self.buf.extend_from_slice(&(ids.len() as u32).to_le_bytes());
        for id in ids {
            self.buf.extend_from_slice(&id.to_le_bytes());
        }
        self
    }

    /// Variable 2D double coordinate array
    pub fn coords(mut self, coords: &[(f64, f64)]) -> Self {
        self.buf
            .extend_from_slice(&(coords.len() as u32).to_le_bytes());
        for &(x, y) in coords {
            self.buf.extend_from_slice(&x.to_le_bytes());
            self.buf.extend_from_slice(&y.to_le_bytes());
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

pub fn write_table(dir: &Path, name: &str, header_text: &str, records: &[Vec<u8>]) {
    let mut out = Vec::new();
    out.extend_from_slice(&(header_text.len() as u32).to_le_bytes());
    out.extend_from_slice(header_text.as_bytes());
    for record in records {
        out.extend_from_slice(record);
    }
    fs::write(dir.join(name), out).unwrap();
}

/// Build the standard fixture library. With `stored_extent`, the library
/// header carries corner columns matching the lake class's true bounds.
pub fn build_library(root: &Path, stored_extent: bool) {
    fs::create_dir_all(root).unwrap();

    if stored_extent {
        write_table(
            root,
            "lht",
            "L;Library Header;-;id=I,1,P,-,-,-,-:library_name=T,*,N,-,-,-,-:\
             description=T,*,N,-,-,-,-:xmin=R,1,N,-,-,-,-:ymin=R,1,N,-,-,-,-:\
             xmax=R,1,N,-,-,-,-:ymax=R,1,N,-,-,-,-:;",
            &[RecordBuf::new()
                .int(1)
                .text_var("testlib")
                .text_var("Fixture library")
                .double(0.0)
                .double(0.0)
                .double(10.0)
                .double(10.0)
                .build()],
        );
    } else {
        write_table(
            root,
            "lht",
            "L;Library Header;-;id=I,1,P,-,-,-,-:library_name=T,*,N,-,-,-,-:\
             description=T,*,N,-,-,-,-:;",
            &[RecordBuf::new()
                .int(1)
                .text_var("testlib")
                .text_var("Fixture library")
                .build()],
        );
    }

    write_table(
        root,
        "cat",
        "L;Coverage Attributes;-;id=I,1,P,-,-,-,-:coverage_name=T,*,N,-,-,-,-:\
         description=T,*,N,-,-,-,-:;",
        &[RecordBuf::new()
            .int(1)
            .text_var("hydro")
            .text_var("Hydrography")
            .build()],
    );

    let coverage = root.join("hydro");
    fs::create_dir_all(&coverage).unwrap();

    write_table(
        &coverage,
        "fcs",
        "L;Feature Class Schema;-;id=I,1,P,-,-,-,-:feature_class=T,*,N,-,-,-,-:\
         table=T,*,N,-,-,-,-:;",
        &[
            RecordBuf::new().int(1).text_var("lakes").text_var("lakes.aft").build(),
            RecordBuf::new().int(2).text_var("wells").text_var("wells.pft").build(),
            RecordBuf::new().int(3).text_var("rivers").text_var("rivers.lft").build(),
            RecordBuf::new().int(4).text_var("notes").text_var("notes.rat").build(),
            // Stale: no such table file on disk
            RecordBuf::new().int(5).text_var("ghost").text_var("ghost.aft").build(),
        ],
    );

    // Area class: one lake over face 1
    write_table(
        &coverage,
        "lakes.aft",
        "L;Lake Features;-;id=I,1,P,-,-,-,-:f_code=T,5,N,Feature code,-,-,-:\
         name=T,*,N,-,-,-,-:fac_id=I,1,N,-,-,-,-:;",
        &[RecordBuf::new()
            .int(1)
            .text_fixed("BH000", 5)
            .text_var("mirror lake")
            .int(1)
            .build()],
    );

    // Point class: two wells on entity nodes
    write_table(
        &coverage,
        "wells.pft",
        "L;Well Features;-;id=I,1,P,-,-,-,-:depth=R,1,N,-,-,-,-:end_id=I,1,N,-,-,-,-:;",
        &[
            RecordBuf::new().int(1).double(12.5).int(5).build(),
            RecordBuf::new().int(2).double(3.25).int(1).build(),
        ],
    );

    // Line class: a two-edge river and one row dangling on edge 999
    write_table(
        &coverage,
        "rivers.lft",
        "L;River Features;-;id=I,1,P,-,-,-,-:f_code=T,3,N,-,-,-,-:edg_id=K,*,N,-,-,-,-:;",
        &[
            RecordBuf::new().int(1).text_fixed("BH1", 3).keys(&[5, 6]).build(),
            RecordBuf::new().int(2).text_fixed("BH2", 3).keys(&[999]).build(),
        ],
    );

    // Attribute-only class
    write_table(
        &coverage,
        "notes.rat",
        "L;Survey Notes;-;id=I,1,P,-,-,-,-:note=T,*,N,-,-,-,-:;",
        &[
            RecordBuf::new().int(1).text_var("resurvey the north shore").build(),
            RecordBuf::new().int(2).text_var("benchmark reset 1997").build(),
        ],
    );

    // Primitive tables. Nodes 1-4 are the square's corners; node 5 is the
    // first well.
    let node_header =
        "L;Entity Node Primitive;-;id=I,1,P,-,-,-,-:coordinate=B,1,N,-,-,-,-:;";
    let nodes = [
        RecordBuf::new().int(1).double(0.0).double(0.0).build(),
        RecordBuf::new().int(2).double(10.0).double(0.0).build(),
        RecordBuf::new().int(3).double(10.0).double(10.0).build(),
        RecordBuf::new().int(4).double(0.0).double(10.0).build(),
        RecordBuf::new().int(5).double(2.0).double(3.0).build(),
    ];
    write_table(&coverage, "end", node_header, &nodes);
    write_table(&coverage, "cnd", node_header, &nodes);

    // Edges 1-4 walk the square; 5-6 form the river chain
    write_table(
        &coverage,
        "edg",
        "L;Edge Primitive;-;id=I,1,P,-,-,-,-:start_node=I,1,N,-,-,-,-:\
         end_node=I,1,N,-,-,-,-:coordinates=B,*,N,-,-,-,-:;",
        &[
            RecordBuf::new().int(1).int(1).int(2).coords(&[(0.0, 0.0), (10.0, 0.0)]).build(),
            RecordBuf::new().int(2).int(2).int(3).coords(&[(10.0, 0.0), (10.0, 10.0)]).build(),
            RecordBuf::new().int(3).int(3).int(4).coords(&[(10.0, 10.0), (0.0, 10.0)]).build(),
            RecordBuf::new().int(4).int(4).int(1).coords(&[(0.0, 10.0), (0.0, 0.0)]).build(),
            RecordBuf::new()
                .int(5)
                .int(2)
                .int(3)
                .coords(&[(3.0, 1.0), (4.0, 2.0), (5.0, 4.0)])
                .build(),
            RecordBuf::new().int(6).int(3).int(4).coords(&[(5.0, 4.0), (6.0, 7.0)]).build(),
        ],
    );

    write_table(
        &coverage,
        "rng",
        "L;Ring Table;-;id=I,1,P,-,-,-,-:face_id=I,1,N,-,-,-,-:edge_ids=K,*,N,-,-,-,-:;",
        &[RecordBuf::new().int(1).int(1).keys(&[1, 2, 3, 4]).build()],
    );
}

/// Runs a test against a fixture library written under a unique temp
/// directory, removing it afterwards.
pub fn with_library<F: FnOnce(&Path)>(tag: &str, stored_extent: bool, f: F) {
    let mut root = std::env::temp_dir();
    root.push(format!("vpf-lite-store-{}-{tag}", std::process::id()));
    let _ = fs::remove_dir_all(&root);
    build_library(&root, stored_extent);
    f(&root);
    let _ = fs::remove_dir_all(&root);
}

/// A temp path that is guaranteed not to exist.
pub fn missing_root(tag: &str) -> PathBuf {
    let mut root = std::env::temp_dir();
    root.push(format!("vpf-lite-store-missing-{}-{tag}", std::process::id()));
    let _ = fs::remove_dir_all(&root);
    root
}
