// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded field values
//!
//! A [`Value`] is the decoded form of one column of one record. Multi-element
//! columns (fixed counts above one, or variable `*` counts) decode to
//! [`Value::List`].

/// One decoded field of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null placeholder (`X` columns)
    Null,
    /// Signed integer (`S` and `I` columns)
    Integer(i32),
    /// Floating-point number (`F` and `R` columns)
    Double(f64),
    /// Text (`T` and `D` columns), trailing padding stripped
    Text(String),
    /// Id/key reference into another table (`K` columns)
    Key(i32),
    /// Coordinate as (x, y, z); 2D coordinates carry z = 0
    Coordinate(f64, f64, f64),
    /// Multi-element column
    List(Vec<Value>),
}

impl Value {
    /// Get as a signed integer (integers and keys)
    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Integer(i) | Value::Key(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as a float (floats widen from integers)
    #[inline]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as text
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a single key reference (a one-element key list also qualifies)
    pub fn as_key(&self) -> Option<i32> {
        match self {
            Value::Key(k) | Value::Integer(k) => Some(*k),
            Value::List(items) if items.len() == 1 => items[0].as_key(),
            _ => None,
        }
    }

    /// Get as an ordered key list. A scalar key yields a one-element list, so
    /// join columns written as single references and as arrays read the same.
    pub fn as_key_list(&self) -> Option<Vec<i32>> {
        match self {
            Value::Key(k) | Value::Integer(k) => Some(vec![*k]),
            Value::List(items) => items.iter().map(Value::as_key).collect(),
            _ => None,
        }
    }

    /// Get as an ordered coordinate sequence. A scalar coordinate yields a
    /// one-element sequence.
    pub fn as_coordinates(&self) -> Option<Vec<(f64, f64, f64)>> {
        match self {
            Value::Coordinate(x, y, z) => Some(vec![(*x, *y, *z)]),
            Value::List(items) => items
                .iter()
                .map(|v| match v {
                    Value::Coordinate(x, y, z) => Some((*x, *y, *z)),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Get as a list of values
    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check if null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}
