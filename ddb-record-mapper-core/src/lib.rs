/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Value model, wire codec, and model definitions for the DDB record mapper.
//!
//! This crate holds the leaf pieces the mapper is built on:
//!
//! - [`Value`] / [`WireValue`] - native values and their type-tagged wire
//!   representation
//! - [`codec`] - the bidirectional conversion between the two, including the
//!   sentinel scheme for values the wire format cannot express
//! - [`ModelDefinition`] - declared attributes, key roles, and sharding rules,
//!   validated once at build time

#![warn(missing_docs)]

mod blob;
pub mod codec;
mod date_time;
pub mod error;
pub mod model;
mod value;
pub mod wire;

pub use blob::Blob;
pub use date_time::DateTime;
pub use error::{ConfigurationError, ConversionError};
pub use model::{
    AttributeDefinition, KeyRole, ModelDefinition, NativeType, ShardingRule,
};
pub use value::{Record, Value};
pub use wire::{Item, Key, WireValue};
