/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The record mapper façade.
//!
//! Orchestrates the codec, key resolver, condition translator, sharding
//! engine, and pagination driver against the storage collaborator. The
//! mapper owns its model registry; there is no process-wide state.
//!
//! Multi-step operations are not transactional. A sharded overwrite deletes
//! fragments before writing replacements, and a destroy deletes fragments
//! before the primary item; a failure in between leaves a window that needs
//! external cleanup.

use crate::condition::{AccessPlan, Filter, SortOrder};
use crate::config::MapperConfig;
use crate::error::Error;
use crate::key::{self, ResolvedKey};
use crate::page::{self, PageRequest};
use crate::provision;
use crate::shard::{self, FragmentLayout};
use crate::store::{
    AttributeUpdate, DeleteItemInput, GetItemInput, PutItemInput, QueryInput, ReturnValues,
    ScanInput, StoreClient, UpdateItemInput,
};
use crate::condition;
use ddb_record_mapper_core::codec;
use ddb_record_mapper_core::wire::WireTag;
use ddb_record_mapper_core::{
    Item, Key, KeyRole, ModelDefinition, NativeType, Record, Value,
};
use std::collections::HashMap;

/// Maps records onto the underlying store, one registered model at a time.
pub struct RecordMapper<S: StoreClient> {
    store: S,
    config: MapperConfig,
    models: HashMap<String, ModelDefinition>,
}

impl<S: StoreClient> RecordMapper<S> {
    /// Creates a mapper with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, MapperConfig::default())
    }

    /// Creates a mapper with the given configuration.
    pub fn with_config(store: S, config: MapperConfig) -> Self {
        Self {
            store,
            config,
            models: HashMap::new(),
        }
    }

    /// The underlying store client.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a model: provisions its main table and one companion table
    /// per sharded attribute, then adds it to this mapper's registry.
    pub async fn register(&mut self, model: ModelDefinition) -> Result<(), Error> {
        provision::ensure_table(
            &self.store,
            &self.config,
            provision::model_table_plan(&model, &self.config),
        )
        .await?;
        for attribute in model.sharded_attributes() {
            provision::ensure_table(
                &self.store,
                &self.config,
                provision::fragment_table_plan(&model, attribute.name(), &self.config),
            )
            .await?;
        }
        self.models.insert(model.name().to_string(), model);
        Ok(())
    }

    /// Writes a new record and returns its external id.
    pub async fn create(&self, model_name: &str, mut record: Record) -> Result<Value, Error> {
        let model = self.model(model_name)?;
        tracing::debug!(
            model = model_name,
            table = model.table_name(),
            "create item"
        );
        key::ensure_generated_keys(model, &mut record);
        let keys = key::validate_keys(model, &record)?;
        let external_id = key::synthesize_id(model, &keys)?;
        let owner = owner_string(model, &keys)?;

        for attribute in model.sharded_attributes() {
            let value = record
                .get(attribute.name())
                .cloned()
                .unwrap_or(Value::Undefined);
            let rule = attribute.sharding_rule().expect("sharded attribute");
            let fragments = shard::plan_fragments(&value, rule)?;
            let layout = FragmentLayout::for_attribute(model, attribute.name());
            shard::write_fragments(&self.store, &layout, &owner, &fragments).await?;
        }

        let item = encode_item(model, &record)?;
        self.store
            .put_item(PutItemInput {
                table_name: model.table_name().to_string(),
                item,
            })
            .await
            .map_err(|err| {
                tracing::warn!(model = model_name, error = %err, "put_item failed");
                err
            })?;
        Ok(external_id)
    }

    /// Point-reads a record by its external id. Returns `Ok(None)` when the
    /// record does not exist.
    pub async fn find(&self, model_name: &str, id: &Value) -> Result<Option<Record>, Error> {
        let model = self.model(model_name)?;
        tracing::debug!(model = model_name, table = model.table_name(), "find item");
        let keys = key::split_id(model, id)?;
        let output = self
            .store
            .get_item(GetItemInput {
                table_name: model.table_name().to_string(),
                key: key_map(model, &keys)?,
            })
            .await?;
        let Some(item) = output.item else {
            return Ok(None);
        };
        let mut record = decode_item(model, item)?;
        let owner = owner_string(model, &keys)?;
        self.splice_fragments(model, &mut record, &owner).await?;
        attach_external_id(model, &mut record, &keys)?;
        Ok(Some(record))
    }

    /// Fetches every record matching the filter, then applies ordering,
    /// offset, and limit client-side.
    pub async fn all(&self, model_name: &str, filter: Filter) -> Result<Vec<Record>, Error> {
        let model = self.model(model_name)?;
        let request = match condition::translate(model, &filter.conditions)? {
            AccessPlan::Query {
                key_conditions,
                filter_conditions,
            } => {
                tracing::debug!(
                    model = model_name,
                    table = model.table_name(),
                    "get all items via query"
                );
                PageRequest::Query(QueryInput {
                    table_name: model.table_name().to_string(),
                    key_conditions,
                    filter_conditions,
                    exclusive_start_key: None,
                })
            }
            AccessPlan::Scan { filter_conditions } => {
                tracing::debug!(
                    model = model_name,
                    table = model.table_name(),
                    "get all items via scan"
                );
                PageRequest::Scan(ScanInput {
                    table_name: model.table_name().to_string(),
                    filter_conditions,
                    exclusive_start_key: None,
                })
            }
        };
        let items = page::fetch_all(&self.store, request, self.config.page_bound()).await?;

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            let mut record = decode_item(model, item)?;
            let keys = key::validate_keys(model, &record)?;
            let owner = owner_string(model, &keys)?;
            self.splice_fragments(model, &mut record, &owner).await?;
            attach_external_id(model, &mut record, &keys)?;
            records.push(record);
        }

        let (sort_attr, order) = filter
            .order
            .clone()
            .unwrap_or_else(|| (default_sort_attribute(model), SortOrder::Asc));
        Ok(page::shape_results(
            records,
            &sort_attr,
            order,
            filter.offset,
            filter.limit,
        ))
    }

    /// Updates an existing record in place from its own key attributes,
    /// returning the merged post-update record.
    pub async fn save(&self, model_name: &str, mut record: Record) -> Result<Record, Error> {
        let model = self.model(model_name)?;
        tracing::debug!(model = model_name, table = model.table_name(), "save item");
        key::ensure_generated_keys(model, &mut record);
        let keys = key::validate_keys(model, &record)?;
        self.apply_update(model, &keys, record).await
    }

    /// Applies partial changes to the record with the given external id,
    /// returning the merged post-update record.
    pub async fn update_attributes(
        &self,
        model_name: &str,
        id: &Value,
        changes: Record,
    ) -> Result<Record, Error> {
        let model = self.model(model_name)?;
        tracing::debug!(
            model = model_name,
            table = model.table_name(),
            "update item"
        );
        let keys = key::split_id(model, id)?;
        self.apply_update(model, &keys, changes).await
    }

    /// Deletes a record and all its fragments, returning the pre-deletion
    /// attribute snapshot. Returns `Ok(None)` when the record did not exist.
    pub async fn destroy(&self, model_name: &str, id: &Value) -> Result<Option<Record>, Error> {
        let model = self.model(model_name)?;
        tracing::debug!(
            model = model_name,
            table = model.table_name(),
            "delete item"
        );
        let keys = key::split_id(model, id)?;
        let owner = owner_string(model, &keys)?;

        // Fragment cleanup runs first; the primary delete must not happen
        // if it fails.
        let mut sharded_snapshot: Vec<(String, Value)> = Vec::new();
        for attribute in model.sharded_attributes() {
            let layout = FragmentLayout::for_attribute(model, attribute.name());
            let items =
                shard::fetch_fragment_items(&self.store, &layout, &owner, self.config.page_bound())
                    .await?;
            let value = shard::decode_reassembled(shard::reassemble(&layout, &items))?;
            shard::delete_fragment_items(&self.store, &layout, &items).await?;
            if !matches!(value, Value::Undefined) {
                sharded_snapshot.push((attribute.name().to_string(), value));
            }
        }

        let output = self
            .store
            .delete_item(DeleteItemInput {
                table_name: model.table_name().to_string(),
                key: key_map(model, &keys)?,
                return_values: ReturnValues::AllOld,
            })
            .await
            .map_err(|err| {
                tracing::warn!(model = model_name, error = %err, "delete_item failed");
                err
            })?;
        let Some(attributes) = output.attributes else {
            return Ok(None);
        };
        let mut record = decode_item(model, attributes)?;
        for (name, value) in sharded_snapshot {
            record.insert(name, value);
        }
        attach_external_id(model, &mut record, &keys)?;
        Ok(Some(record))
    }

    fn model(&self, name: &str) -> Result<&ModelDefinition, Error> {
        self.models.get(name).ok_or_else(|| Error::UnknownModel {
            name: name.to_string(),
        })
    }

    /// Overwrites fragments for sharded attributes present in `changes`,
    /// issues the per-attribute updates, and returns the merged record.
    async fn apply_update(
        &self,
        model: &ModelDefinition,
        keys: &ResolvedKey,
        changes: Record,
    ) -> Result<Record, Error> {
        let owner = owner_string(model, keys)?;

        for attribute in model.sharded_attributes() {
            let Some(value) = changes.get(attribute.name()) else {
                continue;
            };
            let layout = FragmentLayout::for_attribute(model, attribute.name());
            // Delete-then-write; no incremental diff.
            let existing =
                shard::fetch_fragment_items(&self.store, &layout, &owner, self.config.page_bound())
                    .await?;
            shard::delete_fragment_items(&self.store, &layout, &existing).await?;
            let rule = attribute.sharding_rule().expect("sharded attribute");
            let fragments = shard::plan_fragments(value, rule)?;
            shard::write_fragments(&self.store, &layout, &owner, &fragments).await?;
        }

        let mut updates = Vec::new();
        for (name, value) in &changes {
            let skip = model
                .attribute(name)
                .map(|attr| attr.role() != KeyRole::None || attr.sharding_rule().is_some())
                .unwrap_or(false);
            if skip {
                continue;
            }
            let wire = codec::encode(value).map_err(|err| err.for_attribute(name.clone()))?;
            updates.push((name.clone(), AttributeUpdate::Put(wire)));
        }

        let output = self
            .store
            .update_item(UpdateItemInput {
                table_name: model.table_name().to_string(),
                key: key_map(model, keys)?,
                updates,
                return_values: ReturnValues::AllNew,
            })
            .await
            .map_err(|err| {
                tracing::warn!(model = model.name(), error = %err, "update_item failed");
                err
            })?;

        let mut record = match output.attributes {
            Some(attributes) => decode_item(model, attributes)?,
            None => Record::new(),
        };
        self.splice_fragments(model, &mut record, &owner).await?;
        attach_external_id(model, &mut record, keys)?;
        Ok(record)
    }

    /// Reads and reassembles every sharded attribute onto the record.
    async fn splice_fragments(
        &self,
        model: &ModelDefinition,
        record: &mut Record,
        owner: &str,
    ) -> Result<(), Error> {
        for attribute in model.sharded_attributes() {
            let layout = FragmentLayout::for_attribute(model, attribute.name());
            let items =
                shard::fetch_fragment_items(&self.store, &layout, &owner, self.config.page_bound())
                    .await?;
            let value = shard::decode_reassembled(shard::reassemble(&layout, &items))?;
            match value {
                Value::Undefined => {
                    record.remove(attribute.name());
                }
                value => {
                    record.insert(attribute.name().to_string(), value);
                }
            }
        }
        Ok(())
    }
}

/// Encodes a record into a wire item, leaving out sharded attributes (they
/// live in companion tables) and the virtual composite attribute.
fn encode_item(model: &ModelDefinition, record: &Record) -> Result<Item, Error> {
    let mut item = Item::new();
    for (name, value) in record {
        let skip = model
            .attribute(name)
            .map(|attr| {
                attr.role() == KeyRole::CompositePrimary || attr.sharding_rule().is_some()
            })
            .unwrap_or(false);
        if skip {
            continue;
        }
        let wire = codec::encode(value).map_err(|err| err.for_attribute(name.clone()))?;
        item.insert(name.clone(), wire);
    }
    Ok(item)
}

/// Decodes a wire item into a record. Attributes the model does not declare
/// fall back to the type their wire tag implies. Stored undefineds stay
/// absent.
fn decode_item(model: &ModelDefinition, item: Item) -> Result<Record, Error> {
    let mut record = Record::new();
    for (name, wire) in item {
        let declared = model.declared_type(&name).unwrap_or(match wire.type_tag() {
            WireTag::S => NativeType::String,
            WireTag::N => NativeType::Number,
            WireTag::B => NativeType::Binary,
        });
        let value =
            codec::decode(wire, declared).map_err(|err| err.for_attribute(name.clone()))?;
        if !matches!(value, Value::Undefined) {
            record.insert(name, value);
        }
    }
    Ok(record)
}

/// The wire key of a record, from its resolved key values.
fn key_map(model: &ModelDefinition, keys: &ResolvedKey) -> Result<Key, Error> {
    let mut key = Key::new();
    key.insert(
        model.hash_key().name().to_string(),
        codec::encode(&keys.hash)?,
    );
    if let (Some(range_attr), Some(range)) = (model.range_key(), &keys.range) {
        key.insert(range_attr.name().to_string(), codec::encode(range)?);
    }
    Ok(key)
}

/// The owner reference stored on fragment rows: the composite id when the
/// model has one, otherwise the hash value's string form.
fn owner_string(model: &ModelDefinition, keys: &ResolvedKey) -> Result<String, Error> {
    match key::synthesize_id(model, keys)? {
        Value::S(s) => Ok(s),
        other => key::key_string(&other),
    }
}

/// Re-attaches the virtual composite id to an outgoing record.
fn attach_external_id(
    model: &ModelDefinition,
    record: &mut Record,
    keys: &ResolvedKey,
) -> Result<(), Error> {
    if let Some(composite) = model.composite_key() {
        let id = key::synthesize_id(model, keys)?;
        record.insert(composite.name().to_string(), id);
    }
    Ok(())
}

/// Default sort field: the composite key when present, else the hash key.
fn default_sort_attribute(model: &ModelDefinition) -> String {
    model
        .composite_key()
        .unwrap_or_else(|| model.hash_key())
        .name()
        .to_string()
}
