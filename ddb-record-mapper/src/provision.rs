/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Table lifecycle orchestration: create-if-missing and wait-for-active.
//!
//! Simple plumbing over the store's table RPCs. Each registered model gets
//! its main table plus one companion table per sharded attribute.

use crate::config::MapperConfig;
use crate::error::Error;
use crate::shard::FragmentLayout;
use crate::store::{
    AttributeSpec, CreateTableInput, DescribeTableInput, KeySchemaElement, KeyType,
    ProvisionedThroughput, StoreClient, StoreError, TableStatus,
};
use ddb_record_mapper_core::wire::WireTag;
use ddb_record_mapper_core::ModelDefinition;

/// Key schema and capacity for a model's main table. The composite primary
/// attribute is virtual and never part of the table key.
pub(crate) fn model_table_plan(model: &ModelDefinition, config: &MapperConfig) -> CreateTableInput {
    let mut key_schema = vec![KeySchemaElement {
        attribute_name: model.hash_key().name().to_string(),
        key_type: KeyType::Hash,
    }];
    let mut attribute_definitions = vec![AttributeSpec {
        attribute_name: model.hash_key().name().to_string(),
        attribute_type: model.hash_key().native_type().wire_tag(),
    }];
    if let Some(range) = model.range_key() {
        key_schema.push(KeySchemaElement {
            attribute_name: range.name().to_string(),
            key_type: KeyType::Range,
        });
        attribute_definitions.push(AttributeSpec {
            attribute_name: range.name().to_string(),
            attribute_type: range.native_type().wire_tag(),
        });
    }
    CreateTableInput {
        table_name: model.table_name().to_string(),
        key_schema,
        attribute_definitions,
        provisioned_throughput: ProvisionedThroughput {
            read_capacity_units: config.read_capacity(),
            write_capacity_units: config.write_capacity(),
        },
    }
}

/// Key schema and capacity for one sharded attribute's companion table:
/// owner reference as hash key, sequence number as range key.
pub(crate) fn fragment_table_plan(
    model: &ModelDefinition,
    attribute: &str,
    config: &MapperConfig,
) -> CreateTableInput {
    let layout = FragmentLayout::for_attribute(model, attribute);
    CreateTableInput {
        table_name: layout.table_name.clone(),
        key_schema: vec![
            KeySchemaElement {
                attribute_name: layout.owner_attr.clone(),
                key_type: KeyType::Hash,
            },
            KeySchemaElement {
                attribute_name: layout.seq_attr.clone(),
                key_type: KeyType::Range,
            },
        ],
        attribute_definitions: vec![
            AttributeSpec {
                attribute_name: layout.owner_attr,
                attribute_type: WireTag::S,
            },
            AttributeSpec {
                attribute_name: layout.seq_attr,
                attribute_type: WireTag::N,
            },
        ],
        provisioned_throughput: ProvisionedThroughput {
            read_capacity_units: config.read_capacity(),
            write_capacity_units: config.write_capacity(),
        },
    }
}

/// Creates the table if it does not exist, then polls until it is active.
pub(crate) async fn ensure_table<S>(
    store: &S,
    config: &MapperConfig,
    plan: CreateTableInput,
) -> Result<(), Error>
where
    S: StoreClient + ?Sized,
{
    let table_name = plan.table_name.clone();
    let existing = store.list_tables().await?;
    if !existing.table_names.iter().any(|name| name == &table_name) {
        tracing::debug!(table = table_name.as_str(), "creating table");
        match store.create_table(plan).await {
            Ok(_) => {}
            // Someone else created it between the list and the create.
            Err(err) if err.code() == Some("ResourceInUseException") => {}
            Err(err) => return Err(err.into()),
        }
    }
    for _ in 0..config.poll_attempts() {
        let described = store
            .describe_table(DescribeTableInput {
                table_name: table_name.clone(),
            })
            .await?;
        if described.status == Some(TableStatus::Active) {
            return Ok(());
        }
        tokio::time::sleep(config.poll_interval()).await;
    }
    Err(Error::Store(StoreError::new(format!(
        "table '{}' did not become active",
        table_name
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddb_record_mapper_core::{AttributeDefinition, KeyRole, NativeType, ShardingRule};

    #[test]
    fn composite_attribute_stays_out_of_the_key_schema() {
        let model = ModelDefinition::builder("Message")
            .attribute(
                AttributeDefinition::new("ida", NativeType::String).key_role(KeyRole::Hash),
            )
            .attribute(
                AttributeDefinition::new("subject", NativeType::String).key_role(KeyRole::Range),
            )
            .attribute(
                AttributeDefinition::new("id", NativeType::String)
                    .key_role(KeyRole::CompositePrimary),
            )
            .build()
            .unwrap();
        let plan = model_table_plan(&model, &MapperConfig::default());
        let names: Vec<_> = plan
            .key_schema
            .iter()
            .map(|k| k.attribute_name.as_str())
            .collect();
        assert_eq!(names, vec!["ida", "subject"]);
    }

    #[test]
    fn fragment_tables_key_on_owner_and_sequence() {
        let model = ModelDefinition::builder("Report")
            .attribute(AttributeDefinition::new("id", NativeType::String).key_role(KeyRole::Hash))
            .attribute(
                AttributeDefinition::new("body", NativeType::String)
                    .sharded(ShardingRule::ChunkCount(2)),
            )
            .build()
            .unwrap();
        let plan = fragment_table_plan(&model, "body", &MapperConfig::default());
        assert_eq!(plan.table_name, "Report_body");
        assert_eq!(plan.key_schema.len(), 2);
        assert_eq!(plan.key_schema[0].attribute_name, "report#id");
        assert_eq!(plan.key_schema[1].attribute_name, "body#ID");
    }
}
