/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Type-tagged wire values.

use crate::blob::Blob;
use std::collections::HashMap;

/// An item as the store sees it: attribute name to wire value.
pub type Item = HashMap<String, WireValue>;

/// A key as the store sees it. Same shape as an item, but holding only key
/// attributes.
pub type Key = HashMap<String, WireValue>;

/// The scalar representation accepted and returned by the store: a single
/// type tag plus a string (or byte) payload.
///
/// The store rejects empty payloads; [`crate::codec::encode`] guarantees it
/// never produces one.
#[derive(Debug, PartialEq, Clone)]
pub enum WireValue {
    /// String payload.
    S(String),
    /// Numeric payload, transported as a string.
    N(String),
    /// Binary payload.
    B(Blob),
}

impl WireValue {
    /// The wire type tag, for error messages and key schemas.
    pub fn type_tag(&self) -> WireTag {
        match self {
            WireValue::S(_) => WireTag::S,
            WireValue::N(_) => WireTag::N,
            WireValue::B(_) => WireTag::B,
        }
    }

    /// Returns the string payload of an `S` or `N` value.
    pub fn payload_str(&self) -> Option<&str> {
        match self {
            WireValue::S(s) | WireValue::N(s) => Some(s),
            WireValue::B(_) => None,
        }
    }
}

/// Wire type tags.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum WireTag {
    /// String.
    S,
    /// Number.
    N,
    /// Binary.
    B,
}

impl WireTag {
    /// The tag as it appears in key schemas.
    pub fn as_str(&self) -> &'static str {
        match self {
            WireTag::S => "S",
            WireTag::N => "N",
            WireTag::B => "B",
        }
    }
}
