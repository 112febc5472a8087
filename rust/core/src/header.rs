// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Table header grammar
//!
//! Every table file opens with a 4-byte length field followed by an ASCII
//! header string describing byte order, table narrative, and the ordered
//! column definitions:
//!
//! ```text
//! <byte-order>;<description>;<narrative>;<col>:<col>:...:;
//! ```
//!
//! Top-level fields are located with [memchr](https://docs.rs/memchr); the
//! column definition section is parsed with [nom](https://docs.rs/nom).

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, one_of},
    multi::many0,
    sequence::preceded,
    IResult,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Byte order of the binary fields in a table's record section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    /// Least-significant byte first (`L`, the default)
    #[default]
    LittleEndian,
    /// Most-significant byte first (`M`)
    BigEndian,
}

impl ByteOrder {
    /// Resolve the header's byte-order field. Empty means little-endian.
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "" | "L" => Some(ByteOrder::LittleEndian),
            "M" => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }
}

/// Key type of a column (`P` primary, `U` unique, `N` non-unique)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyType {
    Primary,
    Unique,
    #[default]
    NonUnique,
}

impl KeyType {
    fn from_field(field: &str) -> Option<Self> {
        match field {
            "P" => Some(KeyType::Primary),
            "U" => Some(KeyType::Unique),
            "" | "-" | "N" => Some(KeyType::NonUnique),
            _ => None,
        }
    }
}

/// Value kind of a column, from its one-character type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnType {
    /// `T` — padded text
    Text,
    /// `D` — date/time text, 20 characters
    Date,
    /// `S` — signed 16-bit integer
    ShortInt,
    /// `I` — signed 32-bit integer
    LongInt,
    /// `K` — id/key reference into another table
    Key,
    /// `F` — 32-bit float
    Float,
    /// `R` — 64-bit float
    Double,
    /// `C` — 2D coordinate, f32 pair
    Coord2Float,
    /// `B` — 2D coordinate, f64 pair
    Coord2Double,
    /// `Z` — 3D coordinate, f32 triple
    Coord3Float,
    /// `Y` — 3D coordinate, f64 triple
    Coord3Double,
    /// `X` — null placeholder, occupies no bytes
    Null,
}

impl ColumnType {
    /// Look up a type from its header code character
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'T' => Some(ColumnType::Text),
            'D' => Some(ColumnType::Date),
            'S' => Some(ColumnType::ShortInt),
            'I' => Some(ColumnType::LongInt),
            'K' => Some(ColumnType::Key),
            'F' => Some(ColumnType::Float),
            'R' => Some(ColumnType::Double),
            'C' => Some(ColumnType::Coord2Float),
            'B' => Some(ColumnType::Coord2Double),
            'Z' => Some(ColumnType::Coord3Float),
            'Y' => Some(ColumnType::Coord3Double),
            'X' => Some(ColumnType::Null),
            _ => None,
        }
    }

    /// Width in bytes of a single element of this type
    #[inline]
    pub fn element_width(&self) -> usize {
        match self {
            ColumnType::Text => 1,
            ColumnType::Date => 20,
            ColumnType::ShortInt => 2,
            ColumnType::LongInt | ColumnType::Key | ColumnType::Float => 4,
            ColumnType::Double | ColumnType::Coord2Float => 8,
            ColumnType::Coord3Float => 12,
            ColumnType::Coord2Double => 16,
            ColumnType::Coord3Double => 24,
            ColumnType::Null => 0,
        }
    }

    /// True for the coordinate pair/triple types
    #[inline]
    pub fn is_coordinate(&self) -> bool {
        matches!(
            self,
            ColumnType::Coord2Float
                | ColumnType::Coord2Double
                | ColumnType::Coord3Float
                | ColumnType::Coord3Double
        )
    }

    /// True for the id/key reference types
    #[inline]
    pub fn is_key(&self) -> bool {
        matches!(self, ColumnType::Key)
    }
}

/// Element count of a column: a fixed count or `*` (variable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnCount {
    Fixed(u32),
    Variable,
}

impl ColumnCount {
    #[inline]
    pub fn is_variable(&self) -> bool {
        matches!(self, ColumnCount::Variable)
    }
}

/// One column of a table, as declared in the header string.
///
/// Immutable once the table is open. The trailing metadata fields
/// (description, value table, thematic index, narrative) are informational
/// only and never affect decoding.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    pub count: ColumnCount,
    pub key: KeyType,
    pub description: String,
    pub value_table: Option<String>,
    pub thematic_index: Option<String>,
    pub narrative: Option<String>,
}

impl ColumnDescriptor {
    /// Fixed byte width of this column, or `None` when variable-length
    #[inline]
    pub fn width(&self) -> Option<usize> {
        match self.count {
            ColumnCount::Fixed(n) => Some(n as usize * self.column_type.element_width()),
            ColumnCount::Variable => None,
        }
    }
}

/// Parsed table header: byte order, narrative metadata, and ordered columns.
///
/// Built once at table open and shared read-only by every cursor over the
/// table; nothing here is mutated afterwards.
#[derive(Debug, Clone)]
pub struct TableHeader {
    byte_order: ByteOrder,
    description: String,
    narrative: Option<String>,
    columns: Vec<ColumnDescriptor>,
    column_index: FxHashMap<String, usize>,
    record_length: Option<usize>,
}

impl TableHeader {
    /// Assemble a header from parsed parts, computing the by-name index and
    /// the fixed record length (when no column is variable).
    pub fn new(
        byte_order: ByteOrder,
        description: String,
        narrative: Option<String>,
        columns: Vec<ColumnDescriptor>,
    ) -> std::result::Result<Self, String> {
        let mut column_index = FxHashMap::default();
        for (i, col) in columns.iter().enumerate() {
            if column_index.insert(col.name.clone(), i).is_some() {
                return Err(format!("duplicate column '{}'", col.name));
            }
        }

        let record_length = columns
            .iter()
            .map(ColumnDescriptor::width)
            .try_fold(0usize, |acc, w| w.map(|w| acc + w));

        Ok(Self {
            byte_order,
            description,
            narrative,
            columns,
            column_index,
            record_length,
        })
    }

    /// Parse the ASCII header string of a table file.
    ///
    /// On failure, returns the reason; the caller attributes the file path.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let bytes = text.as_bytes();
        if !text.is_ascii() {
            return Err("header is not ASCII".to_string());
        }

        // The three top-level fields are ';'-delimited; everything after the
        // third separator is the column definition section.
        let mut separators = SmallVec::<[usize; 3]>::new();
        for pos in memchr::memchr_iter(b';', bytes) {
            separators.push(pos);
            if separators.len() == 3 {
                break;
            }
        }
        if separators.len() < 3 {
            return Err("header has fewer than three ';'-delimited fields".to_string());
        }

        let order_field = &text[..separators[0]];
        let description = &text[separators[0] + 1..separators[1]];
        let narrative_field = &text[separators[1] + 1..separators[2]];
        let column_section = &text[separators[2] + 1..];

        let byte_order = ByteOrder::from_field(order_field)
            .ok_or_else(|| format!("unknown byte order '{order_field}'"))?;
        let narrative = match narrative_field {
            "" | "-" => None,
            n => Some(n.to_string()),
        };

        let columns = parse_column_section(column_section)?;
        if columns.is_empty() {
            return Err("header declares no columns".to_string());
        }

        TableHeader::new(byte_order, description.to_string(), narrative, columns)
    }

    /// Byte order governing every binary field in the record section
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Table description from the header string
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Companion narrative table name, when one is declared
    pub fn narrative(&self) -> Option<&str> {
        self.narrative.as_deref()
    }

    /// Ordered column descriptors
    #[inline]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.column_position(name).map(|i| &self.columns[i])
    }

    /// Ordinal position of a named column
    #[inline]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Fixed record length in bytes; `None` when any column is variable
    #[inline]
    pub fn record_length(&self) -> Option<usize> {
        self.record_length
    }

    /// True when every column has a fixed width (random access by offset)
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.record_length.is_some()
    }
}

/// One raw column definition: `name=T,count,key,desc,vdt,index,narrative`
fn column_def(input: &str) -> IResult<&str, (&str, char, SmallVec<[&str; 6]>)> {
    let (input, name) = take_while1(|c: char| c != '=' && c != ':' && c != ';')(input)?;
    let (input, _) = char('=')(input)?;
    let (input, code) = one_of("TDSIKFRCBZYX")(input)?;
    let (input, fields) = many0(preceded(
        char(','),
        take_while(|c: char| c != ',' && c != ':' && c != ';'),
    ))(input)?;
    Ok((input, (name, code, fields.into_iter().collect())))
}

/// Parse the `:`-separated column definitions, terminated by the closing `;`
fn parse_column_section(section: &str) -> std::result::Result<Vec<ColumnDescriptor>, String> {
    let mut rest = section;
    let mut columns = Vec::new();

    while !rest.starts_with(';') {
        let (after, (name, code, fields)) =
            column_def(rest).map_err(|_| format!("malformed column definition near '{rest}'"))?;
        let (after, _) = char::<_, nom::error::Error<&str>>(':')(after)
            .map_err(|_| format!("column '{name}' is not ':'-terminated"))?;
        rest = after;

        let column_type = ColumnType::from_code(code)
            .ok_or_else(|| format!("column '{name}' has unknown type '{code}'"))?;

        let count = match fields.first().copied().unwrap_or("1") {
            "*" => ColumnCount::Variable,
            "" | "-" => ColumnCount::Fixed(1),
            n => ColumnCount::Fixed(
                n.parse::<u32>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| format!("column '{name}' has bad count '{n}'"))?,
            ),
        };

        let key = KeyType::from_field(fields.get(1).copied().unwrap_or(""))
            .ok_or_else(|| format!("column '{name}' has unknown key type"))?;

        let optional = |i: usize| -> Option<String> {
            match fields.get(i).copied() {
                None | Some("") | Some("-") => None,
                Some(v) => Some(v.to_string()),
            }
        };

        columns.push(ColumnDescriptor {
            name: name.to_string(),
            column_type,
            count,
            key,
            description: optional(2).unwrap_or_default(),
            value_table: optional(3),
            thematic_index: optional(4),
            narrative: optional(5),
        });
    }

    if rest != ";" {
        return Err("column section has trailing bytes after ';'".to_string());
    }

    Ok(columns)
}
