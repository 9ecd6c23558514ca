mod support;

use hexagonal_core::db::open_db_in_memory;
use hexagonal_core::{
    Actor, PersistenceAdapter, PipelineError, Record, RecordQuery, SqliteAdapter,
};
use serde_json::json;
use support::attrs;

fn post(title: &str) -> Record {
    Record::new("posts", attrs(json!({ "title": title })))
}

#[test]
fn save_inserts_then_updates() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);

    let mut record = post("Hi");
    assert!(adapter.save(&mut record).unwrap());
    let id = record.id.unwrap();

    record.assign(attrs(json!({ "title": "Hello", "tags": ["a", "b"] })));
    assert!(adapter.save(&mut record).unwrap());
    assert_eq!(record.id, Some(id));

    let loaded = adapter.find("posts", id).unwrap();
    assert_eq!(loaded.attribute_str("title"), Some("Hello"));
    assert_eq!(loaded.attribute("tags"), Some(&json!(["a", "b"])));
}

#[test]
fn lenient_save_returns_false_for_invalid_record() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);

    let mut record = Record::new("posts", attrs(json!({ "id": 5 })));
    assert!(!adapter.save(&mut record).unwrap());
    assert!(record.id.is_none());

    let err = adapter.save_strict(&mut record).unwrap_err();
    match err {
        PipelineError::RecordInvalid(invalid) => {
            assert_eq!(invalid.errors.get("id"), ["is reserved"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn updating_missing_record_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);

    let mut record = post("ghost");
    record.id = Some(77);
    let err = adapter.save_strict(&mut record).unwrap_err();
    assert_eq!(err.kind(), "record_not_found");
}

#[test]
fn destroy_requires_persisted_record() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);

    let err = adapter.destroy(&post("draft")).unwrap_err();
    assert_eq!(err.kind(), "record_invalid");

    let mut record = post("Hi");
    adapter.save_strict(&mut record).unwrap();
    adapter.destroy(&record).unwrap();
    assert_eq!(adapter.destroy(&record).unwrap_err().kind(), "record_not_found");
}

#[test]
fn missing_table_surfaces_as_statement_invalid() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE records;").unwrap();
    let adapter = SqliteAdapter::new(&conn);

    let err = adapter.find("posts", 1).unwrap_err();
    match &err {
        PipelineError::StatementInvalid(invalid) => assert_eq!(invalid.operation, "find"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(std::error::Error::source(&err).is_some());

    let err = adapter.query(&RecordQuery::new("posts")).unwrap_err();
    assert_eq!(err.kind(), "statement_invalid");
}

#[test]
fn corrupt_row_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO records (id, collection, owner_uuid, attributes)
         VALUES (1, 'posts', 'not-a-uuid', '{}');",
        [],
    )
    .unwrap();
    let adapter = SqliteAdapter::new(&conn);

    let err = adapter.find("posts", 1).unwrap_err();
    assert_eq!(err.kind(), "statement_invalid");
    assert!(err.to_string().contains("owner_uuid"));
}

#[test]
fn query_filters_by_owner_and_attributes_with_paging() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);
    let alice = Actor::new();
    let bob = Actor::new();

    for index in 0..5 {
        let mut record = Record::new("posts", attrs(json!({ "n": index, "kind": "note" })))
            .owned_by(alice.id);
        adapter.save_strict(&mut record).unwrap();
    }
    let mut foreign = post("bob").owned_by(bob.id);
    adapter.save_strict(&mut foreign).unwrap();
    let mut comment = Record::new("comments", attrs(json!({ "kind": "note" })));
    adapter.save_strict(&mut comment).unwrap();

    let owned = adapter
        .query(&RecordQuery::new("posts").owned_by(alice.id))
        .unwrap();
    assert_eq!(owned.len(), 5);

    let notes = adapter
        .query(&RecordQuery::new("posts").with_attribute("kind", "note"))
        .unwrap();
    assert_eq!(notes.len(), 5);

    let third = adapter
        .query(&RecordQuery::new("posts").with_attribute("n", 2))
        .unwrap();
    assert_eq!(third.len(), 1);

    let page = adapter
        .query(&RecordQuery::new("posts").owned_by(alice.id).limit(2).offset(1))
        .unwrap();
    let numbers: Vec<_> = page.iter().map(|r| r.attribute("n").cloned()).collect();
    assert_eq!(numbers, vec![Some(json!(1)), Some(json!(2))]);

    let tail = adapter
        .query(&RecordQuery::new("posts").owned_by(alice.id).offset(4))
        .unwrap();
    assert_eq!(tail.len(), 1);

    assert_eq!(adapter.all("comments").unwrap().len(), 1);
}

#[test]
fn attribute_filter_compares_json_types_exactly() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);

    for value in [
        json!({ "label": "int", "flag": 1, "score": 1 }),
        json!({ "label": "bool", "flag": true, "score": 1.0 }),
        json!({ "label": "null", "flag": null }),
        json!({ "label": "missing" }),
    ] {
        let mut record = Record::new("posts", attrs(value));
        adapter.save_strict(&mut record).unwrap();
    }

    let labels = |query: RecordQuery| -> Vec<String> {
        adapter
            .query(&query)
            .unwrap()
            .iter()
            .filter_map(|r| r.attribute_str("label").map(str::to_string))
            .collect()
    };

    assert_eq!(
        labels(RecordQuery::new("posts").with_attribute("flag", true)),
        vec!["bool"]
    );
    assert_eq!(
        labels(RecordQuery::new("posts").with_attribute("flag", 1)),
        vec!["int"]
    );
    assert_eq!(
        labels(RecordQuery::new("posts").with_attribute("flag", serde_json::Value::Null)),
        vec!["null"]
    );
    assert_eq!(
        labels(RecordQuery::new("posts").with_attribute("score", 1)),
        vec!["int"]
    );
    assert_eq!(
        labels(RecordQuery::new("posts").with_attribute("score", 1.0)),
        vec!["bool"]
    );
}

#[test]
fn transaction_control_tracks_state() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);

    assert!(!adapter.in_transaction());
    adapter.begin().unwrap();
    assert!(adapter.in_transaction());
    let mut record = post("Hi");
    adapter.save_strict(&mut record).unwrap();
    adapter.rollback().unwrap();
    assert!(!adapter.in_transaction());
    assert!(adapter.all("posts").unwrap().is_empty());

    let err = adapter.commit().unwrap_err();
    assert_eq!(err.kind(), "statement_invalid");
}

#[test]
fn owner_attribute_is_rejected_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);

    let mut record = Record::new("posts", attrs(json!({ "owner": "someone-else" })));
    let err = adapter.save_strict(&mut record).unwrap_err();
    match err {
        PipelineError::RecordInvalid(invalid) => {
            assert_eq!(invalid.errors.get("owner"), ["is reserved"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(adapter.all("posts").unwrap().is_empty());
}
