/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Record mapper over a schemaless, type-tagged key-value store.
//!
//! Maps an object-model description (attributes, key roles, size limits)
//! onto a store whose items are encoded as type-tagged scalars, and provides
//! query, pagination, and large-value sharding on top:
//!
//! - [`RecordMapper`] - the façade: `create`, `find`, `all`, `save`,
//!   `update_attributes`, `destroy`
//! - [`store::StoreClient`] - the ten operations required from the backend
//! - [`Filter`] / [`Condition`] - filter expressions, classified into key
//!   conditions and generic filter conditions at translation time
//! - [`test_util::InMemoryStore`] - an in-process backend for tests
//!
//! # Example
//!
//! ```ignore
//! use ddb_record_mapper::{
//!     AttributeDefinition, Filter, KeyRole, ModelDefinition, NativeType, RecordMapper, Record,
//! };
//!
//! let mut mapper = RecordMapper::new(store);
//! mapper
//!     .register(
//!         ModelDefinition::builder("User")
//!             .attribute(AttributeDefinition::new("id", NativeType::String).key_role(KeyRole::Hash))
//!             .attribute(AttributeDefinition::new("name", NativeType::String))
//!             .build()?,
//!     )
//!     .await?;
//!
//! let mut user = Record::new();
//! user.insert("id".into(), "u-1".into());
//! user.insert("name".into(), "Ann".into());
//! let id = mapper.create("User", user).await?;
//! let found = mapper.find("User", &id).await?;
//! ```

#![warn(missing_docs)]

pub mod condition;
pub mod config;
pub mod error;
mod key;
mod mapper;
mod page;
mod provision;
mod shard;
pub mod store;
pub mod test_util;

pub use condition::{ComparisonOperator, Condition, Filter, SortOrder};
pub use config::MapperConfig;
pub use error::Error;
pub use mapper::RecordMapper;

pub use ddb_record_mapper_core::{
    AttributeDefinition, Blob, ConfigurationError, ConversionError, DateTime, KeyRole,
    ModelDefinition, NativeType, Record, ShardingRule, Value,
};
