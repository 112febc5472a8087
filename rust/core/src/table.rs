// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Table file access
//!
//! A [`TableFile`] memory-maps one binary table read-only and serves decoded
//! rows. Fixed-length tables support true random access at
//! `4 + header_len + index * record_len`; variable-length tables are walked
//! sequentially, with a lazily-built offset index making positional reads
//! possible afterwards. All reads are stateless slices of the shared map, so
//! concurrent cursors never contend on a seek position.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use memmap2::Mmap;

use crate::error::{Error, Result};
use crate::header::TableHeader;
use crate::record::{decode_record, Row};

/// One open table file
pub struct TableFile {
    name: String,
    path: PathBuf,
    map: Mmap,
    header: Arc<TableHeader>,
    data_start: usize,
    /// Row count, known up front for fixed-length tables only
    fixed_rows: Option<usize>,
    /// Variable-length tables: record (offset, length) index, built on first
    /// positional access and shared read-only afterwards
    offsets: OnceLock<Vec<(usize, usize)>>,
}

impl TableFile {
    /// Open and map a table file, parsing its header.
    ///
    /// Fails with [`Error::Format`] when the length field or header string is
    /// unparsable, or when a fixed-length table's file size is inconsistent
    /// with its record length.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        // Safety: library files are read-only for the lifetime of the catalog
        // and are not watched for external mutation.
        let map = unsafe { Mmap::map(&file)? };

        if map.len() < 4 {
            return Err(Error::format(&path, "file shorter than its length field"));
        }

        // The length field is written in the table's native byte order, which
        // is only declared inside the header it precedes. Read little-endian
        // first and fall back to big-endian when the result is implausible.
        let le = u32::from_le_bytes([map[0], map[1], map[2], map[3]]) as usize;
        let be = u32::from_be_bytes([map[0], map[1], map[2], map[3]]) as usize;
        let plausible = |n: usize| n > 0 && n <= map.len() - 4;
        let header_len = if plausible(le) {
            le
        } else if plausible(be) {
            be
        } else {
            return Err(Error::format(&path, format!("implausible header length {le}")));
        };

        let text = std::str::from_utf8(&map[4..4 + header_len])
            .map_err(|_| Error::format(&path, "header is not ASCII"))?;
        let header =
            TableHeader::parse(text).map_err(|reason| Error::format(&path, reason))?;

        let data_start = 4 + header_len;
        let fixed_rows = match header.record_length() {
            Some(0) => {
                return Err(Error::format(&path, "record length is zero"));
            }
            Some(record_len) => {
                let body = map.len() - data_start;
                if body % record_len != 0 {
                    return Err(Error::format(
                        &path,
                        format!(
                            "{body} record bytes are not a multiple of the {record_len}-byte record length"
                        ),
                    ));
                }
                Some(body / record_len)
            }
            None => None,
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(Self {
            name,
            path,
            map,
            header: Arc::new(header),
            data_start,
            fixed_rows,
            offsets: OnceLock::new(),
        })
    }

    /// Table name (the file name, lowercased), used in diagnostics
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the table was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed header
    #[inline]
    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    /// Number of rows in the table.
    ///
    /// Derived from the file size for fixed-length tables; for
    /// variable-length tables this builds the offset index on first call.
    pub fn row_count(&self) -> usize {
        match self.fixed_rows {
            Some(n) => n,
            None => self.offsets().len(),
        }
    }

    /// Record (offset, length) index for variable-length tables.
    ///
    /// The walk stops at the first structurally undecodable record; a scan
    /// cursor surfaces that record's error to the caller.
    fn offsets(&self) -> &[(usize, usize)] {
        self.offsets.get_or_init(|| {
            let mut offsets = Vec::new();
            let mut pos = self.data_start;
            let mut row = 0usize;
            while pos < self.map.len() {
                match decode_record(&self.header, &self.name, row, &self.map[pos..]) {
                    Ok((_, consumed)) if consumed > 0 => {
                        offsets.push((pos, consumed));
                        pos += consumed;
                        row += 1;
                    }
                    _ => break,
                }
            }
            offsets
        })
    }

    /// Read one row by zero-based index.
    ///
    /// Fails with [`Error::OutOfRange`] beyond the table's bounds and
    /// [`Error::CorruptRecord`] when the record's bytes do not decode.
    pub fn read_row(&self, index: usize) -> Result<Row> {
        let (start, len) = match self.fixed_rows {
            Some(count) => {
                if index >= count {
                    return Err(Error::OutOfRange {
                        table: self.name.clone(),
                        index,
                        count,
                    });
                }
                // Unwrap-free: fixed_rows implies a fixed record length
                let record_len = self.header.record_length().unwrap_or(0);
                (self.data_start + index * record_len, record_len)
            }
            None => {
                let offsets = self.offsets();
                match offsets.get(index) {
                    Some(&entry) => entry,
                    None => {
                        return Err(Error::OutOfRange {
                            table: self.name.clone(),
                            index,
                            count: offsets.len(),
                        })
                    }
                }
            }
        };

        let (values, _) =
            decode_record(&self.header, &self.name, index, &self.map[start..start + len])?;
        self.verify_row_id(index, &values)?;
        Ok(Row::new(Arc::clone(&self.header), values, index))
    }

    /// Read the row holding a one-based id.
    pub fn read_row_by_id(&self, id: i32) -> Result<Row> {
        if id < 1 {
            return Err(Error::OutOfRange {
                table: self.name.clone(),
                index: 0,
                count: self.row_count(),
            });
        }
        self.read_row(id as usize - 1)
    }

    /// Start a sequential scan from the first row. Cursors are independent;
    /// opening a second scan restarts from the top.
    pub fn scan(&self) -> RowCursor<'_> {
        RowCursor {
            table: self,
            pos: self.data_start,
            row: 0,
            done: false,
        }
    }

    /// Row ids and row order coincide; when an integer `id` column is
    /// present, a value disagreeing with the row's position is corrupt.
    fn verify_row_id(&self, index: usize, values: &[crate::value::Value]) -> Result<()> {
        if let Some(pos) = self.header.column_position("id") {
            if let Some(got) = values.get(pos).and_then(|v| v.as_int()) {
                let expected = index as i32 + 1;
                if got != expected {
                    return Err(Error::corrupt(
                        &self.name,
                        index,
                        format!("id column holds {got}, expected {expected}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TableFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableFile")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("columns", &self.header.columns().len())
            .field("fixed_rows", &self.fixed_rows)
            .finish()
    }
}

/// Forward-only row cursor over one table.
///
/// Yields `Result` per row: a corrupt record surfaces as an error without
/// poisoning the cursor when the following record's position is still known
/// (always true for fixed-length tables). The cursor holds no file state of
/// its own beyond its position, so any number may be open concurrently.
pub struct RowCursor<'a> {
    table: &'a TableFile,
    pos: usize,
    row: usize,
    done: bool,
}

impl RowCursor<'_> {
    /// Decode and return the next row, or `None` at the end of the table.
    pub fn next_row(&mut self) -> Option<Result<Row>> {
        if self.done {
            return None;
        }

        let table = self.table;
        if let Some(count) = table.fixed_rows {
            if self.row >= count {
                return None;
            }
            let record_len = table.header.record_length().unwrap_or(0);
            let start = self.pos;
            let index = self.row;
            self.pos += record_len;
            self.row += 1;

            let result = decode_record(
                &table.header,
                &table.name,
                index,
                &table.map[start..start + record_len],
            )
            .and_then(|(values, _)| {
                table.verify_row_id(index, &values)?;
                Ok(Row::new(Arc::clone(&table.header), values, index))
            });
            return Some(result);
        }

        // Variable-length: records self-describe their length, so a
        // structurally undecodable record ends the walk (the next offset is
        // unknowable), while a semantic failure after a clean length read
        // lets the cursor continue.
        if self.pos >= table.map.len() {
            return None;
        }
        let index = self.row;
        match decode_record(&table.header, &table.name, index, &table.map[self.pos..]) {
            Ok((values, consumed)) => {
                self.pos += consumed;
                self.row += 1;
                let result = table
                    .verify_row_id(index, &values)
                    .map(|()| Row::new(Arc::clone(&table.header), values, index));
                Some(result)
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    /// Restart the cursor at the first row
    pub fn reset(&mut self) {
        self.pos = self.table.data_start;
        self.row = 0;
        self.done = false;
    }

    /// Zero-based index of the next row to be returned
    #[inline]
    pub fn position(&self) -> usize {
        self.row
    }
}
