/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! End-to-end mapper tests against the in-memory store.

use ddb_record_mapper::test_util::InMemoryStore;
use ddb_record_mapper::{
    AttributeDefinition, Condition, Error, Filter, KeyRole, MapperConfig, ModelDefinition,
    NativeType, Record, RecordMapper, ShardingRule, SortOrder, Value,
};

fn record(pairs: Vec<(&str, Value)>) -> Record {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn user_model() -> ModelDefinition {
    ModelDefinition::builder("User")
        .attribute(AttributeDefinition::new("id", NativeType::String).key_role(KeyRole::Hash))
        .attribute(AttributeDefinition::new("name", NativeType::String))
        .attribute(AttributeDefinition::new("role", NativeType::String))
        .attribute(AttributeDefinition::new("order", NativeType::Number))
        .build()
        .unwrap()
}

fn message_model() -> ModelDefinition {
    ModelDefinition::builder("Message")
        .attribute(AttributeDefinition::new("ida", NativeType::String).key_role(KeyRole::Hash))
        .attribute(
            AttributeDefinition::new("subject", NativeType::String).key_role(KeyRole::Range),
        )
        .attribute(
            AttributeDefinition::new("id", NativeType::String).key_role(KeyRole::CompositePrimary),
        )
        .attribute(AttributeDefinition::new("content", NativeType::String))
        .build()
        .unwrap()
}

fn todo_model() -> ModelDefinition {
    ModelDefinition::builder("Todo")
        .attribute(
            AttributeDefinition::new("tasks", NativeType::String)
                .sharded(ShardingRule::ChunkCount(2)),
        )
        .build()
        .unwrap()
}

async fn mapper_for(
    store: InMemoryStore,
    model: ModelDefinition,
) -> RecordMapper<InMemoryStore> {
    let mut mapper = RecordMapper::new(store);
    mapper.register(model).await.unwrap();
    mapper
}

async fn seed_users(mapper: &RecordMapper<InMemoryStore>) {
    let users = [
        ("u1", "John Lennon", Some("lead"), 2.0),
        ("u2", "Paul McCartney", Some("lead"), 1.0),
        ("u3", "George Harrison", None, 5.0),
        ("u4", "Ringo Starr", None, 6.0),
        ("u5", "Pete Best", None, 4.0),
        ("u6", "Stuart Sutcliffe", None, 3.0),
    ];
    for (id, name, role, order) in users {
        let mut rec = record(vec![
            ("id", id.into()),
            ("name", name.into()),
            ("order", Value::N(order)),
        ]);
        if let Some(role) = role {
            rec.insert("role".to_string(), role.into());
        }
        mapper.create("User", rec).await.unwrap();
    }
}

#[tokio::test]
async fn create_then_find_roundtrips() {
    let mapper = mapper_for(InMemoryStore::new(), user_model()).await;
    let id = mapper
        .create(
            "User",
            record(vec![("id", "u-1".into()), ("name", "Ann".into())]),
        )
        .await
        .unwrap();
    assert_eq!(id, Value::S("u-1".to_string()));

    let found = mapper.find("User", &id).await.unwrap().unwrap();
    assert_eq!(found.get("name"), Some(&Value::S("Ann".to_string())));
}

#[tokio::test]
async fn find_missing_returns_none() {
    let mapper = mapper_for(InMemoryStore::new(), user_model()).await;
    let found = mapper.find("User", &"ghost".into()).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn unknown_models_are_rejected() {
    let mapper = RecordMapper::new(InMemoryStore::new());
    let err = mapper.find("Nope", &"x".into()).await.unwrap_err();
    assert!(matches!(err, Error::UnknownModel { .. }));
}

#[tokio::test]
async fn composite_ids_join_hash_and_range() {
    let mapper = mapper_for(InMemoryStore::new(), message_model()).await;
    let id = mapper
        .create(
            "Message",
            record(vec![("ida", "abcd".into()), ("subject", "Nature".into())]),
        )
        .await
        .unwrap();
    assert_eq!(id, Value::S("abcd--x--Nature".to_string()));

    let found = mapper.find("Message", &id).await.unwrap().unwrap();
    assert_eq!(found.get("ida"), Some(&Value::S("abcd".to_string())));
    assert_eq!(found.get("subject"), Some(&Value::S("Nature".to_string())));
    // The virtual composite attribute is exposed on the way out.
    assert_eq!(found.get("id"), Some(&id));
}

#[tokio::test]
async fn missing_keys_fail_before_any_write() {
    let mapper = mapper_for(InMemoryStore::new(), message_model()).await;
    let err = mapper
        .create("Message", record(vec![("ida", "abcd".into())]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingRangeKey { .. }));
    assert_eq!(mapper.store().item_count("Message"), 0);
}

#[tokio::test]
async fn generated_ids_are_uuids() {
    let mapper = mapper_for(InMemoryStore::new(), todo_model()).await;
    let id = mapper
        .create("Todo", record(vec![("tasks", "walk the dog".into())]))
        .await
        .unwrap();
    let Value::S(raw) = &id else { panic!("expected string id") };
    assert_eq!(raw.len(), 36);
    assert!(mapper.find("Todo", &id).await.unwrap().is_some());
}

#[tokio::test]
async fn sharded_attributes_roundtrip_invisibly() {
    let mapper = mapper_for(InMemoryStore::new(), todo_model()).await;
    let id = mapper
        .create("Todo", record(vec![("tasks", "Blah blah blah".into())]))
        .await
        .unwrap();

    // Fragments live in the companion table, not the main item.
    assert_eq!(mapper.store().item_count("Todo_tasks"), 2);

    let found = mapper.find("Todo", &id).await.unwrap().unwrap();
    assert_eq!(
        found.get("tasks"),
        Some(&Value::S("Blah blah blah".to_string()))
    );
    // No residual fragment-index attributes.
    let mut names: Vec<_> = found.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["id", "tasks"]);
}

#[tokio::test]
async fn sharded_nullish_values_roundtrip() {
    let mapper = mapper_for(InMemoryStore::new(), todo_model()).await;

    let id = mapper
        .create("Todo", record(vec![("tasks", Value::Null)]))
        .await
        .unwrap();
    let found = mapper.find("Todo", &id).await.unwrap().unwrap();
    assert_eq!(found.get("tasks"), Some(&Value::Null));

    let id = mapper
        .create("Todo", record(vec![("tasks", "".into())]))
        .await
        .unwrap();
    let found = mapper.find("Todo", &id).await.unwrap().unwrap();
    assert_eq!(found.get("tasks"), Some(&Value::S(String::new())));
}

#[tokio::test]
async fn destroy_removes_every_fragment() {
    let mapper = mapper_for(InMemoryStore::new(), todo_model()).await;
    let id = mapper
        .create("Todo", record(vec![("tasks", "Blah blah blah".into())]))
        .await
        .unwrap();
    assert_eq!(mapper.store().item_count("Todo_tasks"), 2);

    let snapshot = mapper.destroy("Todo", &id).await.unwrap().unwrap();
    assert_eq!(
        snapshot.get("tasks"),
        Some(&Value::S("Blah blah blah".to_string()))
    );
    assert_eq!(mapper.store().item_count("Todo_tasks"), 0);
    assert_eq!(mapper.store().item_count("Todo"), 0);
    assert!(mapper.find("Todo", &id).await.unwrap().is_none());

    // Destroying a missing record is not an error.
    assert!(mapper.destroy("Todo", &id).await.unwrap().is_none());
}

#[tokio::test]
async fn updates_overwrite_fragments_rather_than_diffing() {
    let model = ModelDefinition::builder("Todo")
        .attribute(
            AttributeDefinition::new("tasks", NativeType::String)
                .sharded(ShardingRule::ChunkCount(4)),
        )
        .build()
        .unwrap();
    let mapper = mapper_for(InMemoryStore::new(), model).await;

    let id = mapper
        .create("Todo", record(vec![("tasks", "aaaaaaaa".into())]))
        .await
        .unwrap();
    assert_eq!(mapper.store().item_count("Todo_tasks"), 4);

    let updated = mapper
        .update_attributes("Todo", &id, record(vec![("tasks", "bb".into())]))
        .await
        .unwrap();
    assert_eq!(updated.get("tasks"), Some(&Value::S("bb".to_string())));
    // Two single-character fragments; the stale four are gone.
    assert_eq!(mapper.store().item_count("Todo_tasks"), 2);

    let found = mapper.find("Todo", &id).await.unwrap().unwrap();
    assert_eq!(found.get("tasks"), Some(&Value::S("bb".to_string())));
}

#[tokio::test]
async fn save_merges_with_stored_attributes() {
    let mapper = mapper_for(InMemoryStore::new(), user_model()).await;
    mapper
        .create(
            "User",
            record(vec![
                ("id", "u-1".into()),
                ("name", "Ann".into()),
                ("role", "admin".into()),
            ]),
        )
        .await
        .unwrap();

    let merged = mapper
        .save(
            "User",
            record(vec![("id", "u-1".into()), ("name", "Anna".into())]),
        )
        .await
        .unwrap();
    assert_eq!(merged.get("name"), Some(&Value::S("Anna".to_string())));
    assert_eq!(merged.get("role"), Some(&Value::S("admin".to_string())));
}

#[tokio::test]
async fn update_attributes_returns_the_merged_record() {
    let mapper = mapper_for(InMemoryStore::new(), message_model()).await;
    let id = mapper
        .create(
            "Message",
            record(vec![
                ("ida", "abcd".into()),
                ("subject", "Nature".into()),
                ("content", "first".into()),
            ]),
        )
        .await
        .unwrap();

    let merged = mapper
        .update_attributes("Message", &id, record(vec![("content", "second".into())]))
        .await
        .unwrap();
    assert_eq!(merged.get("content"), Some(&Value::S("second".to_string())));
    assert_eq!(merged.get("subject"), Some(&Value::S("Nature".to_string())));
    assert_eq!(merged.get("id"), Some(&id));
}

#[tokio::test]
async fn all_shapes_results_after_exhausting_pages() {
    // Two items per page: six users take three query round trips.
    let mapper = mapper_for(InMemoryStore::with_page_size(2), user_model()).await;
    seed_users(&mapper).await;

    let shaped = mapper
        .all(
            "User",
            Filter::new()
                .order_by("order", SortOrder::Asc)
                .offset(2)
                .limit(3),
        )
        .await
        .unwrap();
    let names: Vec<_> = shaped
        .iter()
        .map(|r| r.get("name").and_then(Value::as_s).unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Stuart Sutcliffe", "Pete Best", "George Harrison"]
    );
}

#[tokio::test]
async fn all_splices_fragments_onto_every_record() {
    let mapper = mapper_for(InMemoryStore::with_page_size(2), todo_model()).await;
    for text in ["first task list", "second task list", "third task list"] {
        mapper
            .create("Todo", record(vec![("tasks", text.into())]))
            .await
            .unwrap();
    }
    let all = mapper.all("Todo", Filter::new()).await.unwrap();
    assert_eq!(all.len(), 3);
    for todo in &all {
        let tasks = todo.get("tasks").and_then(Value::as_s).unwrap();
        assert!(tasks.ends_with("task list"));
    }
}

#[tokio::test]
async fn all_filters_are_anded() {
    let mapper = mapper_for(InMemoryStore::new(), user_model()).await;
    seed_users(&mapper).await;

    let leads = mapper
        .all("User", Filter::new().eq("role", "lead"))
        .await
        .unwrap();
    assert_eq!(leads.len(), 2);

    let one = mapper
        .all(
            "User",
            Filter::new().eq("role", "lead").eq("name", "John Lennon"),
        )
        .await
        .unwrap();
    assert_eq!(one.len(), 1);
}

#[tokio::test]
async fn hash_conditions_query_and_hash_lists_scan() {
    let mapper = mapper_for(InMemoryStore::new(), user_model()).await;
    seed_users(&mapper).await;

    let by_id = mapper
        .all("User", Filter::new().eq("id", "u3"))
        .await
        .unwrap();
    assert_eq!(by_id.len(), 1);

    let by_ids = mapper
        .all(
            "User",
            Filter::new().condition("id", Condition::In(vec!["u3".into(), "u5".into()])),
        )
        .await
        .unwrap();
    assert_eq!(by_ids.len(), 2);
}

#[tokio::test]
async fn default_order_is_the_hash_key_ascending() {
    let mapper = mapper_for(InMemoryStore::new(), user_model()).await;
    for id in ["b", "a", "c"] {
        mapper
            .create("User", record(vec![("id", id.into())]))
            .await
            .unwrap();
    }
    let all = mapper.all("User", Filter::new()).await.unwrap();
    let ids: Vec<_> = all
        .iter()
        .map(|r| r.get("id").and_then(Value::as_s).unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn typed_attributes_roundtrip_through_the_mapper() {
    let model = ModelDefinition::builder("Event")
        .attribute(AttributeDefinition::new("id", NativeType::String).key_role(KeyRole::Hash))
        .attribute(AttributeDefinition::new("at", NativeType::Date))
        .attribute(AttributeDefinition::new("open", NativeType::Boolean))
        .attribute(AttributeDefinition::new("count", NativeType::Number))
        .build()
        .unwrap();
    let mapper = mapper_for(InMemoryStore::new(), model).await;

    let at = ddb_record_mapper::DateTime::from_millis(1_364_515_200_000);
    let id = mapper
        .create(
            "Event",
            record(vec![
                ("id", "e1".into()),
                ("at", at.into()),
                ("open", true.into()),
                ("count", Value::N(42.0)),
                ("note", Value::Null),
            ]),
        )
        .await
        .unwrap();

    let found = mapper.find("Event", &id).await.unwrap().unwrap();
    assert_eq!(found.get("at"), Some(&Value::Date(at)));
    assert_eq!(found.get("open"), Some(&Value::Bool(true)));
    assert_eq!(found.get("count"), Some(&Value::N(42.0)));
    assert_eq!(found.get("note"), Some(&Value::Null));
}

#[tokio::test]
async fn runaway_pagination_is_bounded() {
    let store = InMemoryStore::with_page_size(1);
    let mut mapper =
        RecordMapper::with_config(store, MapperConfig::new().max_pages(Some(2)));
    mapper.register(user_model()).await.unwrap();
    for i in 0..5 {
        mapper
            .create("User", record(vec![("id", format!("u{}", i).into())]))
            .await
            .unwrap();
    }
    let err = mapper.all("User", Filter::new()).await.unwrap_err();
    assert!(matches!(err, Error::PaginationLimitExceeded { pages: 2 }));
}
