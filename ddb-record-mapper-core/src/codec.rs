/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Bidirectional codec between native values and type-tagged wire values.
//!
//! The wire format has no native null, no way to mark an attribute as never
//! set, and rejects empty string payloads outright. All three cases are
//! carried as sentinel strings under the `S` tag and restored on decode.
//! The sentinels are private to this module: alternate stores with native
//! null support can swap the scheme out without touching anything else.
//!
//! Encoding rules, in priority order:
//!
//! | native                  | wire                      |
//! |-------------------------|---------------------------|
//! | `Undefined`             | `S("undefined")`          |
//! | `Null`                  | `S("null")`               |
//! | `S("")`                 | `S("empty")`              |
//! | `S(s)`                  | `S(s)`                    |
//! | `N(n)`                  | `N(n.to_string())`        |
//! | `Bool(b)`               | `S("true" / "false")`     |
//! | `Date(d)`               | `N(millisecond epoch)`    |
//! | `B(blob)`               | `B(blob)`                 |
//!
//! Lists encode element-wise through [`encode_list`]; they exist only as
//! condition operands.
//!
//! Decoding is driven by the attribute's declared type, with the sentinel
//! check applied first so that a date or boolean attribute holding a stored
//! null is restored as `Null` rather than parsed.

use crate::error::ConversionError;
use crate::model::NativeType;
use crate::value::Value;
use crate::wire::WireValue;
use crate::DateTime;

const SENTINEL_NULL: &str = "null";
const SENTINEL_UNDEFINED: &str = "undefined";
const SENTINEL_EMPTY: &str = "empty";

/// Encodes a single native value into its wire representation.
///
/// Guaranteed never to produce an empty payload.
pub fn encode(value: &Value) -> Result<WireValue, ConversionError> {
    match value {
        Value::Undefined => Ok(WireValue::S(SENTINEL_UNDEFINED.to_string())),
        Value::Null => Ok(WireValue::S(SENTINEL_NULL.to_string())),
        Value::S(s) if s.is_empty() => Ok(WireValue::S(SENTINEL_EMPTY.to_string())),
        Value::S(s) => Ok(WireValue::S(s.clone())),
        Value::N(n) => Ok(WireValue::N(n.to_string())),
        Value::Bool(b) => Ok(WireValue::S(b.to_string())),
        Value::Date(dt) => Ok(WireValue::N(dt.as_millis().to_string())),
        Value::B(blob) => Ok(WireValue::B(blob.clone())),
        Value::List(_) => Err(ConversionError::invalid_value(
            "lists encode element-wise as condition operands, not as scalars",
        )),
    }
}

/// Encodes a list of values element-wise, one wire value per element.
pub fn encode_list(values: &[Value]) -> Result<Vec<WireValue>, ConversionError> {
    values.iter().map(encode).collect()
}

/// Decodes a wire value back into a native value, guided by the attribute's
/// declared type.
pub fn decode(value: WireValue, declared: NativeType) -> Result<Value, ConversionError> {
    // Stored null/undefined win over the declared type.
    if let WireValue::S(s) = &value {
        if s == SENTINEL_UNDEFINED {
            return Ok(Value::Undefined);
        }
        if s == SENTINEL_NULL {
            return Ok(Value::Null);
        }
    }
    match declared {
        NativeType::String => match value {
            WireValue::S(s) if s == SENTINEL_EMPTY => Ok(Value::S(String::new())),
            WireValue::S(s) | WireValue::N(s) => Ok(Value::S(s)),
            WireValue::B(_) => Err(ConversionError::type_mismatch("S", "B")),
        },
        NativeType::Number => {
            let payload = expect_scalar_payload(&value, "N")?;
            payload
                .parse::<f64>()
                .map(Value::N)
                .map_err(|_| {
                    ConversionError::invalid_value(format!(
                        "cannot parse '{}' as a number",
                        payload
                    ))
                })
        }
        NativeType::Boolean => {
            let payload = expect_scalar_payload(&value, "S")?;
            Ok(Value::Bool(payload == "true"))
        }
        NativeType::Date => {
            let payload = expect_scalar_payload(&value, "N")?;
            let millis = payload
                .parse::<i64>()
                .or_else(|_| payload.parse::<f64>().map(|f| f as i64))
                .map_err(|_| {
                    ConversionError::invalid_value(format!(
                        "cannot parse '{}' as a millisecond epoch",
                        payload
                    ))
                })?;
            Ok(Value::Date(DateTime::from_millis(millis)))
        }
        NativeType::Binary => match value {
            WireValue::B(blob) => Ok(Value::B(blob)),
            other => Err(ConversionError::type_mismatch(
                "B",
                other.type_tag().as_str(),
            )),
        },
    }
}

fn expect_scalar_payload<'a>(
    value: &'a WireValue,
    expected: &'static str,
) -> Result<&'a str, ConversionError> {
    value
        .payload_str()
        .ok_or_else(|| ConversionError::type_mismatch(expected, "B"))
}
