/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Record identity: key validation, external-id synthesis, and splitting.
//!
//! The external id of a hash-only record is the hash value itself. When a
//! model declares both a hash and a range key, the external id is
//! `hash + separator + range`, carried by the composite primary attribute.
//! The composite value is computed on every write and never persisted.

use crate::error::Error;
use ddb_record_mapper_core::codec;
use ddb_record_mapper_core::{
    ConversionError, DateTime, ModelDefinition, NativeType, Record, Value, WireValue,
};
use uuid::Uuid;

/// Hash and range values resolved from a record or an external id.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedKey {
    pub(crate) hash: Value,
    pub(crate) range: Option<Value>,
}

/// Fills in the hash key with a fresh v4 UUID when the model asks for
/// generation and the record carries no usable value. Never overwrites a
/// caller-provided value.
pub(crate) fn ensure_generated_keys(model: &ModelDefinition, record: &mut Record) {
    let hash = model.hash_key();
    if !hash.is_auto_generated() {
        return;
    }
    let missing = record.get(hash.name()).map(Value::is_nullish).unwrap_or(true);
    if missing {
        record.insert(
            hash.name().to_string(),
            Value::S(Uuid::new_v4().to_string()),
        );
    }
}

/// Validates key presence before any wire I/O.
pub(crate) fn validate_keys(model: &ModelDefinition, record: &Record) -> Result<ResolvedKey, Error> {
    let hash_attr = model.hash_key().name();
    let hash = record.get(hash_attr).cloned().unwrap_or(Value::Undefined);
    if hash.is_nullish() {
        return Err(Error::MissingHashKey {
            attribute: hash_attr.to_string(),
        });
    }
    let range = match model.range_key() {
        Some(range_attr) => {
            let value = record
                .get(range_attr.name())
                .cloned()
                .unwrap_or(Value::Undefined);
            if value.is_nullish() {
                return Err(Error::MissingRangeKey {
                    attribute: range_attr.name().to_string(),
                });
            }
            Some(value)
        }
        None => None,
    };
    Ok(ResolvedKey { hash, range })
}

/// Renders a key value as the string form used in composite ids and
/// fragment owner references.
pub(crate) fn key_string(value: &Value) -> Result<String, Error> {
    let wire = codec::encode(value)?;
    wire.payload_str()
        .map(str::to_string)
        .ok_or_else(|| {
            Error::Conversion(ConversionError::invalid_value(
                "binary values cannot form an external id",
            ))
        })
}

/// Computes the record's external identifier from its resolved keys.
pub(crate) fn synthesize_id(model: &ModelDefinition, keys: &ResolvedKey) -> Result<Value, Error> {
    match (model.composite_key(), &keys.range) {
        (Some(_), Some(range)) => {
            let hash = key_string(&keys.hash)?;
            let range = key_string(range)?;
            Ok(Value::S(format!("{}{}{}", hash, model.separator(), range)))
        }
        _ => Ok(keys.hash.clone()),
    }
}

/// Splits an external id back into hash and range values, coercing each
/// part to the attribute's declared type.
pub(crate) fn split_id(model: &ModelDefinition, id: &Value) -> Result<ResolvedKey, Error> {
    if model.composite_key().is_some() {
        let raw = id.as_s().ok_or_else(|| {
            Error::Conversion(ConversionError::invalid_value(
                "a composite external id must be a string",
            ))
        })?;
        let (hash_part, range_part) =
            raw.split_once(model.separator()).ok_or_else(|| {
                Error::Conversion(ConversionError::invalid_value(format!(
                    "external id '{}' does not contain the separator '{}'",
                    raw,
                    model.separator()
                )))
            })?;
        let range_attr = model.range_key().expect("validated at build time");
        Ok(ResolvedKey {
            hash: coerce_str(hash_part, model.hash_key().native_type())?,
            range: Some(coerce_str(range_part, range_attr.native_type())?),
        })
    } else {
        Ok(ResolvedKey {
            hash: coerce_value(id, model.hash_key().native_type())?,
            range: None,
        })
    }
}

fn coerce_str(part: &str, declared: NativeType) -> Result<Value, Error> {
    Ok(codec::decode(WireValue::S(part.to_string()), declared)?)
}

fn coerce_value(value: &Value, declared: NativeType) -> Result<Value, Error> {
    match (value, declared) {
        (Value::S(s), NativeType::Number | NativeType::Date) => coerce_str(s, declared),
        (Value::N(n), NativeType::Date) => Ok(Value::Date(DateTime::from_millis(*n as i64))),
        _ => Ok(value.clone()),
    }
}
