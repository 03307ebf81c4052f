/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Storage collaborator interface.
//!
//! The mapper drives any backend that can answer these ten operations with
//! fully-formed request objects. Transport, authentication, and retry policy
//! all live behind the implementation; the mapper performs no retries of its
//! own. A missing-item read is `GetItemOutput { item: None }`, distinct from
//! an `Err(StoreError)`.

use crate::condition::WireCondition;
use async_trait::async_trait;
use ddb_record_mapper_core::wire::WireTag;
use ddb_record_mapper_core::{Item, Key, WireValue};
use std::collections::HashMap;
use std::fmt;

/// Any failure returned by a collaborator call. Carries the backend's error
/// code and message and nothing else; the mapper surfaces it verbatim.
#[derive(Debug)]
pub struct StoreError {
    code: Option<String>,
    message: String,
}

impl StoreError {
    /// Creates an error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Attaches the backend's error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The backend's error code, if any.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "store error ({}): {}", code, self.message),
            None => write!(f, "store error: {}", self.message),
        }
    }
}

impl std::error::Error for StoreError {}

/// Input for `put_item`.
#[derive(Debug, Clone)]
pub struct PutItemInput {
    /// Target table.
    pub table_name: String,
    /// The full item to write.
    pub item: Item,
}

/// Output of `put_item`.
#[derive(Debug, Default)]
pub struct PutItemOutput {}

/// Input for `get_item`.
#[derive(Debug, Clone)]
pub struct GetItemInput {
    /// Target table.
    pub table_name: String,
    /// Full primary key of the item.
    pub key: Key,
}

/// Output of `get_item`. `item` is `None` when the key does not exist.
#[derive(Debug, Default)]
pub struct GetItemOutput {
    /// The item, if present.
    pub item: Option<Item>,
}

/// Which attribute snapshot a mutating call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnValues {
    /// No snapshot.
    #[default]
    None,
    /// The attributes as they were before the call.
    AllOld,
    /// The attributes as they are after the call.
    AllNew,
}

/// Action applied to one attribute by `update_item`.
#[derive(Debug, Clone)]
pub enum AttributeUpdate {
    /// Set the attribute to the given value.
    Put(WireValue),
    /// Remove the attribute.
    Delete,
}

/// Input for `update_item`.
#[derive(Debug, Clone)]
pub struct UpdateItemInput {
    /// Target table.
    pub table_name: String,
    /// Full primary key of the item.
    pub key: Key,
    /// Per-attribute actions, applied in order.
    pub updates: Vec<(String, AttributeUpdate)>,
    /// Snapshot to return.
    pub return_values: ReturnValues,
}

/// Output of `update_item`.
#[derive(Debug, Default)]
pub struct UpdateItemOutput {
    /// The requested attribute snapshot, if any.
    pub attributes: Option<Item>,
}

/// Input for `delete_item`.
#[derive(Debug, Clone)]
pub struct DeleteItemInput {
    /// Target table.
    pub table_name: String,
    /// Full primary key of the item.
    pub key: Key,
    /// Snapshot to return.
    pub return_values: ReturnValues,
}

/// Output of `delete_item`.
#[derive(Debug, Default)]
pub struct DeleteItemOutput {
    /// The requested attribute snapshot, if any.
    pub attributes: Option<Item>,
}

/// Input for `query`.
#[derive(Debug, Clone)]
pub struct QueryInput {
    /// Target table.
    pub table_name: String,
    /// Conditions on key attributes; these narrow the candidate set.
    pub key_conditions: Vec<(String, WireCondition)>,
    /// Conditions evaluated by the store after the key conditions.
    pub filter_conditions: Vec<(String, WireCondition)>,
    /// Continuation token from the previous page, if resuming.
    pub exclusive_start_key: Option<Key>,
}

/// Output of `query`.
#[derive(Debug, Default)]
pub struct QueryOutput {
    /// Matching items, in store order.
    pub items: Vec<Item>,
    /// Continuation token; present when more data remains.
    pub last_evaluated_key: Option<Key>,
}

/// Input for `scan`.
#[derive(Debug, Clone)]
pub struct ScanInput {
    /// Target table.
    pub table_name: String,
    /// Conditions evaluated against every item in the table.
    pub filter_conditions: Vec<(String, WireCondition)>,
    /// Continuation token from the previous page, if resuming.
    pub exclusive_start_key: Option<Key>,
}

/// Output of `scan`.
#[derive(Debug, Default)]
pub struct ScanOutput {
    /// Matching items, in store order.
    pub items: Vec<Item>,
    /// Continuation token; present when more data remains.
    pub last_evaluated_key: Option<Key>,
}

/// One write in a `batch_write_item` request.
#[derive(Debug, Clone)]
pub enum WriteRequest {
    /// Write the item.
    Put(Item),
    /// Delete the item with the given key.
    Delete(Key),
}

/// Input for `batch_write_item`: writes grouped by table.
#[derive(Debug, Clone, Default)]
pub struct BatchWriteItemInput {
    /// Write requests keyed by table name.
    pub requests: HashMap<String, Vec<WriteRequest>>,
}

/// Output of `batch_write_item`.
#[derive(Debug, Default)]
pub struct BatchWriteItemOutput {}

/// Output of `list_tables`.
#[derive(Debug, Default)]
pub struct ListTablesOutput {
    /// Names of all tables.
    pub table_names: Vec<String>,
}

/// Role of an attribute in a table's key schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Partition key.
    Hash,
    /// Sort key.
    Range,
}

/// One entry in a table's key schema.
#[derive(Debug, Clone)]
pub struct KeySchemaElement {
    /// The key attribute's name.
    pub attribute_name: String,
    /// The key attribute's role.
    pub key_type: KeyType,
}

/// Wire type declaration for a key attribute.
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    /// The attribute's name.
    pub attribute_name: String,
    /// The attribute's wire type tag.
    pub attribute_type: WireTag,
}

/// Provisioned capacity for a new table.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionedThroughput {
    /// Read capacity units.
    pub read_capacity_units: u64,
    /// Write capacity units.
    pub write_capacity_units: u64,
}

/// Input for `create_table`.
#[derive(Debug, Clone)]
pub struct CreateTableInput {
    /// Name of the table to create.
    pub table_name: String,
    /// Key schema (hash, optionally range).
    pub key_schema: Vec<KeySchemaElement>,
    /// Wire types of the key attributes.
    pub attribute_definitions: Vec<AttributeSpec>,
    /// Provisioned capacity.
    pub provisioned_throughput: ProvisionedThroughput,
}

/// Output of `create_table`.
#[derive(Debug, Default)]
pub struct CreateTableOutput {}

/// Input for `describe_table`.
#[derive(Debug, Clone)]
pub struct DescribeTableInput {
    /// The table to describe.
    pub table_name: String,
}

/// Lifecycle status of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    /// The table is being created and cannot serve requests yet.
    Creating,
    /// The table is ready.
    Active,
}

/// Output of `describe_table`. `status` is `None` when the table does not
/// exist.
#[derive(Debug, Default)]
pub struct DescribeTableOutput {
    /// The table's status, if it exists.
    pub status: Option<TableStatus>,
}

/// The ten operations the mapper needs from the underlying store.
///
/// Implementations must be safe for concurrent use; the mapper shares one
/// client across all in-flight operations.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Writes a full item, replacing any existing item with the same key.
    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, StoreError>;

    /// Point-reads an item by its full key.
    async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, StoreError>;

    /// Applies per-attribute updates to an item, creating it if absent.
    async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, StoreError>;

    /// Deletes an item by its full key.
    async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, StoreError>;

    /// Returns items matching the key conditions, one page at a time.
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, StoreError>;

    /// Returns items matching the filter conditions across the whole table,
    /// one page at a time.
    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, StoreError>;

    /// Applies a batch of puts and deletes across tables.
    async fn batch_write_item(
        &self,
        input: BatchWriteItemInput,
    ) -> Result<BatchWriteItemOutput, StoreError>;

    /// Lists all table names.
    async fn list_tables(&self) -> Result<ListTablesOutput, StoreError>;

    /// Creates a table.
    async fn create_table(&self, input: CreateTableInput) -> Result<CreateTableOutput, StoreError>;

    /// Describes a table's status.
    async fn describe_table(
        &self,
        input: DescribeTableInput,
    ) -> Result<DescribeTableOutput, StoreError>;
}
