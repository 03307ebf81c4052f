/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Native attribute values.

use crate::blob::Blob;
use crate::date_time::DateTime;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A record as seen by callers: attribute name to native value.
pub type Record = HashMap<String, Value>;

/// A native attribute value.
///
/// `Null` and `Undefined` are distinct: `Null` is an explicitly stored null,
/// while `Undefined` marks an attribute the caller never set. Both survive a
/// round trip through the wire format.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Attribute was never assigned.
    Undefined,
    /// UTF-8 string.
    S(String),
    /// Double-precision number.
    N(f64),
    /// Boolean.
    Bool(bool),
    /// Point in time, millisecond precision.
    Date(DateTime),
    /// Binary payload.
    B(Blob),
    /// List of values. Only valid as a condition operand, never as a stored
    /// attribute.
    List(Vec<Value>),
}

impl Value {
    /// Short name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::S(_) => "string",
            Value::N(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Date(_) => "date",
            Value::B(_) => "binary",
            Value::List(_) => "list",
        }
    }

    /// True for `Null` and `Undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// Returns the string payload if this is a string value.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Value::S(s) => Some(s),
            _ => None,
        }
    }

    /// Total ordering used for client-side result sorting.
    ///
    /// Values of the same type compare naturally (numbers via IEEE total
    /// order); values of different types compare by type rank so the sort
    /// stays stable and total even over heterogeneous columns.
    pub fn cmp_for_sort(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::S(a), Value::S(b)) => a.cmp(b),
            (Value::N(a), Value::N(b)) => a.total_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::B(a), Value::B(b)) => a.as_ref().cmp(b.as_ref()),
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Undefined => 0,
            Value::Null => 1,
            Value::Bool(_) => 2,
            Value::N(_) => 3,
            Value::Date(_) => 4,
            Value::S(_) => 5,
            Value::B(_) => 6,
            Value::List(_) => 7,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::S(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::S(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::N(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::N(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::N(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime> for Value {
    fn from(dt: DateTime) -> Self {
        Value::Date(dt)
    }
}

impl From<Blob> for Value {
    fn from(b: Blob) -> Self {
        Value::B(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(list: Vec<T>) -> Self {
        Value::List(list.into_iter().map(Into::into).collect())
    }
}
