// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record decoding
//!
//! Walks a record's bytes against the table's column descriptors and produces
//! a [`Row`] of decoded [`Value`]s. Variable-length columns self-describe via
//! an unsigned 32-bit element count prefix, so decoding also reports the
//! record's total byte length for sequential walks.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::header::{ByteOrder, ColumnCount, ColumnType, TableHeader};
use crate::value::Value;

/// One decoded record: ordered values plus the shared header for by-name
/// access. Produced on demand and not retained by the engine.
#[derive(Debug, Clone)]
pub struct Row {
    header: Arc<TableHeader>,
    values: Vec<Value>,
    index: usize,
}

impl Row {
    pub(crate) fn new(header: Arc<TableHeader>, values: Vec<Value>, index: usize) -> Self {
        Self {
            header,
            values,
            index,
        }
    }

    /// Zero-based row index within the table
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// One-based row id. Row ids and row order coincide in this format.
    #[inline]
    pub fn id(&self) -> i32 {
        self.index as i32 + 1
    }

    /// Ordered decoded values
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at a column position
    pub fn value(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    /// Value of a named column
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.header
            .column_position(name)
            .and_then(|i| self.values.get(i))
    }

    /// The header this row was decoded against
    #[inline]
    pub fn header(&self) -> &TableHeader {
        &self.header
    }
}

/// Byte walker over one record, attributing failures to table and row
struct FieldCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    table: &'a str,
    row: usize,
}

impl<'a> FieldCursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).filter(|&e| e <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.offset..end];
                self.offset = end;
                Ok(slice)
            }
            None => Err(Error::corrupt(
                self.table,
                self.row,
                format!("record truncated at byte {} (field needs {len} bytes)", self.offset),
            )),
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

#[inline]
fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

#[inline]
fn read_u32(bytes: &[u8], order: ByteOrder) -> u32 {
    match order {
        ByteOrder::LittleEndian => u32::from_le_bytes(array(bytes)),
        ByteOrder::BigEndian => u32::from_be_bytes(array(bytes)),
    }
}

#[inline]
fn read_i32(bytes: &[u8], order: ByteOrder) -> i32 {
    match order {
        ByteOrder::LittleEndian => i32::from_le_bytes(array(bytes)),
        ByteOrder::BigEndian => i32::from_be_bytes(array(bytes)),
    }
}

#[inline]
fn read_i16(bytes: &[u8], order: ByteOrder) -> i16 {
    match order {
        ByteOrder::LittleEndian => i16::from_le_bytes(array(bytes)),
        ByteOrder::BigEndian => i16::from_be_bytes(array(bytes)),
    }
}

#[inline]
fn read_f32(bytes: &[u8], order: ByteOrder) -> f32 {
    match order {
        ByteOrder::LittleEndian => f32::from_le_bytes(array(bytes)),
        ByteOrder::BigEndian => f32::from_be_bytes(array(bytes)),
    }
}

#[inline]
fn read_f64(bytes: &[u8], order: ByteOrder) -> f64 {
    match order {
        ByteOrder::LittleEndian => f64::from_le_bytes(array(bytes)),
        ByteOrder::BigEndian => f64::from_be_bytes(array(bytes)),
    }
}

/// Decode one record starting at `bytes[0]`.
///
/// Returns the decoded values and the number of bytes the record occupies
/// (needed to locate the next record in variable-length tables). `bytes` may
/// extend past the record's end; only truncation within the record is an
/// error.
pub(crate) fn decode_record(
    header: &TableHeader,
    table: &str,
    row: usize,
    bytes: &[u8],
) -> Result<(Vec<Value>, usize)> {
    let order = header.byte_order();
    let mut cursor = FieldCursor {
        bytes,
        offset: 0,
        table,
        row,
    };

    let mut values = Vec::with_capacity(header.columns().len());
    for col in header.columns() {
        let count = match col.count {
            ColumnCount::Fixed(n) => n as usize,
            ColumnCount::Variable => {
                let n = read_u32(cursor.take(4)?, order) as usize;
                let width = col.column_type.element_width();
                if width > 0 && n > cursor.remaining() / width {
                    return Err(Error::corrupt(
                        table,
                        row,
                        format!(
                            "column '{}' declares {n} elements but only {} bytes remain",
                            col.name,
                            cursor.remaining()
                        ),
                    ));
                }
                n
            }
        };

        values.push(decode_field(&mut cursor, col.column_type, count, order, &col.name)?);
    }

    Ok((values, cursor.offset))
}

fn decode_field(
    cursor: &mut FieldCursor<'_>,
    column_type: ColumnType,
    count: usize,
    order: ByteOrder,
    name: &str,
) -> Result<Value> {
    match column_type {
        ColumnType::Null => Ok(Value::Null),
        // Text decodes as one string regardless of count; the count is the
        // character width
        ColumnType::Text => decode_text(cursor, count, name),
        ColumnType::Date => {
            if count <= 1 {
                decode_text(cursor, 20, name)
            } else {
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(decode_text(cursor, 20, name)?);
                }
                Ok(Value::List(items))
            }
        }
        _ => {
            if count == 1 {
                decode_element(cursor, column_type, order)
            } else {
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(decode_element(cursor, column_type, order)?);
                }
                Ok(Value::List(items))
            }
        }
    }
}

fn decode_text(cursor: &mut FieldCursor<'_>, len: usize, name: &str) -> Result<Value> {
    let table = cursor.table;
    let row = cursor.row;
    let raw = cursor.take(len)?;
    if !raw.is_ascii() || raw.contains(&0) {
        return Err(Error::corrupt(
            table,
            row,
            format!("column '{name}' holds non-text bytes"),
        ));
    }
    // Safe: just verified ASCII
    let text = std::str::from_utf8(raw)
        .map_err(|_| Error::corrupt(table, row, format!("column '{name}' holds non-text bytes")))?;
    Ok(Value::Text(text.trim_end_matches(' ').to_string()))
}

fn decode_element(
    cursor: &mut FieldCursor<'_>,
    column_type: ColumnType,
    order: ByteOrder,
) -> Result<Value> {
    let value = match column_type {
        ColumnType::ShortInt => Value::Integer(read_i16(cursor.take(2)?, order) as i32),
        ColumnType::LongInt => Value::Integer(read_i32(cursor.take(4)?, order)),
        ColumnType::Key => Value::Key(read_i32(cursor.take(4)?, order)),
        ColumnType::Float => Value::Double(read_f32(cursor.take(4)?, order) as f64),
        ColumnType::Double => Value::Double(read_f64(cursor.take(8)?, order)),
        ColumnType::Coord2Float => {
            let b = cursor.take(8)?;
            Value::Coordinate(
                read_f32(&b[0..4], order) as f64,
                read_f32(&b[4..8], order) as f64,
                0.0,
            )
        }
        ColumnType::Coord2Double => {
            let b = cursor.take(16)?;
            Value::Coordinate(read_f64(&b[0..8], order), read_f64(&b[8..16], order), 0.0)
        }
        ColumnType::Coord3Float => {
            let b = cursor.take(12)?;
            Value::Coordinate(
                read_f32(&b[0..4], order) as f64,
                read_f32(&b[4..8], order) as f64,
                read_f32(&b[8..12], order) as f64,
            )
        }
        ColumnType::Coord3Double => {
            let b = cursor.take(24)?;
            Value::Coordinate(
                read_f64(&b[0..8], order),
                read_f64(&b[8..16], order),
                read_f64(&b[16..24], order),
            )
        }
        // Text, Date, and Null never reach here
        ColumnType::Text | ColumnType::Date | ColumnType::Null => Value::Null,
    };
    Ok(value)
}
