/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! In-process store implementation for tests.
//!
//! [`InMemoryStore`] answers the full [`StoreClient`] interface over plain
//! vectors, including continuation-token pagination with a configurable page
//! size so the pagination driver can be exercised without a backend.

use crate::condition::{ComparisonOperator, WireCondition};
use crate::store::*;
use async_trait::async_trait;
use ddb_record_mapper_core::{Item, Key, WireValue};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const RESUME_ATTR: &str = "__resume";

#[derive(Debug, Default)]
struct Table {
    key_schema: Vec<KeySchemaElement>,
    items: Vec<Item>,
}

impl Table {
    fn key_of(&self, item: &Item) -> Key {
        let mut key = Key::new();
        for element in &self.key_schema {
            if let Some(value) = item.get(&element.attribute_name) {
                key.insert(element.attribute_name.clone(), value.clone());
            }
        }
        key
    }

    fn position_of(&self, key: &Key) -> Option<usize> {
        self.items.iter().position(|item| &self.key_of(item) == key)
    }

    fn upsert(&mut self, item: Item) {
        let key = self.key_of(&item);
        match self.position_of(&key) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Table>,
}

/// A stateful, thread-safe fake store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
    page_size: Option<usize>,
}

impl InMemoryStore {
    /// A store that returns every result in a single page.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that returns at most `page_size` items per query/scan page,
    /// forcing callers through the continuation-token loop.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            inner: Arc::default(),
            page_size: Some(page_size),
        }
    }

    /// Number of items currently in a table. Zero for unknown tables.
    pub fn item_count(&self, table_name: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .tables
            .get(table_name)
            .map(|t| t.items.len())
            .unwrap_or(0)
    }

    /// Snapshot of a table's items.
    pub fn items(&self, table_name: &str) -> Vec<Item> {
        self.inner
            .lock()
            .unwrap()
            .tables
            .get(table_name)
            .map(|t| t.items.clone())
            .unwrap_or_default()
    }

    /// Names of all tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .tables
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn paginate(&self, matching: Vec<Item>, start: usize) -> (Vec<Item>, Option<Key>) {
        match self.page_size {
            Some(size) if start + size < matching.len() => {
                let page = matching[start..start + size].to_vec();
                let mut token = Key::new();
                token.insert(
                    RESUME_ATTR.to_string(),
                    WireValue::N((start + size).to_string()),
                );
                (page, Some(token))
            }
            _ => (matching.into_iter().skip(start).collect(), None),
        }
    }
}

fn resume_index(token: &Option<Key>) -> usize {
    token
        .as_ref()
        .and_then(|key| key.get(RESUME_ATTR))
        .and_then(|value| value.payload_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn missing_table(table_name: &str) -> StoreError {
    StoreError::new(format!("table '{}' not found", table_name))
        .with_code("ResourceNotFoundException")
}

fn wire_eq(left: &WireValue, right: &WireValue) -> bool {
    match (left, right) {
        (WireValue::N(a), WireValue::N(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        },
        (left, right) => left == right,
    }
}

fn wire_cmp(left: &WireValue, right: &WireValue) -> Option<Ordering> {
    match (left, right) {
        (WireValue::S(a), WireValue::S(b)) => Some(a.cmp(b)),
        (WireValue::N(a), WireValue::N(b)) => {
            a.parse::<f64>().ok()?.partial_cmp(&b.parse::<f64>().ok()?)
        }
        (WireValue::B(a), WireValue::B(b)) => Some(a.as_ref().cmp(b.as_ref())),
        _ => None,
    }
}

fn matches_condition(item: &Item, attribute: &str, condition: &WireCondition) -> bool {
    let Some(actual) = item.get(attribute) else {
        return false;
    };
    let operands = &condition.operands;
    match condition.operator {
        // A multi-element operand list means "any of these".
        ComparisonOperator::Eq | ComparisonOperator::In => {
            operands.iter().any(|op| wire_eq(actual, op))
        }
        ComparisonOperator::Ne => operands
            .first()
            .map(|op| !wire_eq(actual, op))
            .unwrap_or(false),
        ComparisonOperator::Gt
        | ComparisonOperator::Ge
        | ComparisonOperator::Lt
        | ComparisonOperator::Le => {
            let Some(op) = operands.first() else {
                return false;
            };
            let Some(ordering) = wire_cmp(actual, op) else {
                return false;
            };
            match condition.operator {
                ComparisonOperator::Gt => ordering == Ordering::Greater,
                ComparisonOperator::Ge => ordering != Ordering::Less,
                ComparisonOperator::Lt => ordering == Ordering::Less,
                _ => ordering != Ordering::Greater,
            }
        }
        ComparisonOperator::Contains
        | ComparisonOperator::NotContains
        | ComparisonOperator::BeginsWith => {
            let (WireValue::S(haystack), Some(WireValue::S(needle))) = (actual, operands.first())
            else {
                return false;
            };
            match condition.operator {
                ComparisonOperator::Contains => haystack.contains(needle.as_str()),
                ComparisonOperator::NotContains => !haystack.contains(needle.as_str()),
                _ => haystack.starts_with(needle.as_str()),
            }
        }
    }
}

fn matches_all(item: &Item, conditions: &[(String, WireCondition)]) -> bool {
    conditions
        .iter()
        .all(|(attribute, condition)| matches_condition(item, attribute, condition))
}

#[async_trait]
impl StoreClient for InMemoryStore {
    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let table = inner
            .tables
            .get_mut(&input.table_name)
            .ok_or_else(|| missing_table(&input.table_name))?;
        table.upsert(input.item);
        Ok(PutItemOutput::default())
    }

    async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, StoreError> {
        let inner = self.inner.lock().unwrap();
        let table = inner
            .tables
            .get(&input.table_name)
            .ok_or_else(|| missing_table(&input.table_name))?;
        let item = table
            .position_of(&input.key)
            .map(|index| table.items[index].clone());
        Ok(GetItemOutput { item })
    }

    async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let table = inner
            .tables
            .get_mut(&input.table_name)
            .ok_or_else(|| missing_table(&input.table_name))?;
        let (old, index) = match table.position_of(&input.key) {
            Some(index) => (Some(table.items[index].clone()), index),
            None => {
                // Upsert semantics: start from the key attributes alone.
                table.items.push(input.key.clone());
                (None, table.items.len() - 1)
            }
        };
        for (attribute, update) in input.updates {
            match update {
                AttributeUpdate::Put(value) => {
                    table.items[index].insert(attribute, value);
                }
                AttributeUpdate::Delete => {
                    table.items[index].remove(&attribute);
                }
            }
        }
        let attributes = match input.return_values {
            ReturnValues::AllNew => Some(table.items[index].clone()),
            ReturnValues::AllOld => old,
            ReturnValues::None => None,
        };
        Ok(UpdateItemOutput { attributes })
    }

    async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let table = inner
            .tables
            .get_mut(&input.table_name)
            .ok_or_else(|| missing_table(&input.table_name))?;
        let attributes = match table.position_of(&input.key) {
            Some(index) => {
                let removed = table.items.remove(index);
                match input.return_values {
                    ReturnValues::AllOld => Some(removed),
                    _ => None,
                }
            }
            None => None,
        };
        Ok(DeleteItemOutput { attributes })
    }

    async fn query(&self, input: QueryInput) -> Result<QueryOutput, StoreError> {
        let inner = self.inner.lock().unwrap();
        let table = inner
            .tables
            .get(&input.table_name)
            .ok_or_else(|| missing_table(&input.table_name))?;
        let matching: Vec<Item> = table
            .items
            .iter()
            .filter(|item| {
                matches_all(item, &input.key_conditions)
                    && matches_all(item, &input.filter_conditions)
            })
            .cloned()
            .collect();
        let start = resume_index(&input.exclusive_start_key);
        let (items, last_evaluated_key) = self.paginate(matching, start);
        Ok(QueryOutput {
            items,
            last_evaluated_key,
        })
    }

    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, StoreError> {
        let inner = self.inner.lock().unwrap();
        let table = inner
            .tables
            .get(&input.table_name)
            .ok_or_else(|| missing_table(&input.table_name))?;
        let matching: Vec<Item> = table
            .items
            .iter()
            .filter(|item| matches_all(item, &input.filter_conditions))
            .cloned()
            .collect();
        let start = resume_index(&input.exclusive_start_key);
        let (items, last_evaluated_key) = self.paginate(matching, start);
        Ok(ScanOutput {
            items,
            last_evaluated_key,
        })
    }

    async fn batch_write_item(
        &self,
        input: BatchWriteItemInput,
    ) -> Result<BatchWriteItemOutput, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        for (table_name, requests) in input.requests {
            let table = inner
                .tables
                .get_mut(&table_name)
                .ok_or_else(|| missing_table(&table_name))?;
            for request in requests {
                match request {
                    WriteRequest::Put(item) => table.upsert(item),
                    WriteRequest::Delete(key) => {
                        if let Some(index) = table.position_of(&key) {
                            table.items.remove(index);
                        }
                    }
                }
            }
        }
        Ok(BatchWriteItemOutput::default())
    }

    async fn list_tables(&self) -> Result<ListTablesOutput, StoreError> {
        Ok(ListTablesOutput {
            table_names: self.table_names(),
        })
    }

    async fn create_table(&self, input: CreateTableInput) -> Result<CreateTableOutput, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .tables
            .entry(input.table_name)
            .or_insert_with(|| Table {
                key_schema: input.key_schema,
                items: Vec::new(),
            });
        Ok(CreateTableOutput::default())
    }

    async fn describe_table(
        &self,
        input: DescribeTableInput,
    ) -> Result<DescribeTableOutput, StoreError> {
        let inner = self.inner.lock().unwrap();
        let status = inner
            .tables
            .contains_key(&input.table_name)
            .then_some(TableStatus::Active);
        Ok(DescribeTableOutput { status })
    }
}
