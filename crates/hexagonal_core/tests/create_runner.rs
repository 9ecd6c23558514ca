mod support;

use hexagonal_core::db::open_db_in_memory;
use hexagonal_core::error::InvalidSource;
use hexagonal_core::{
    Actor, AttributesForm, CreateListener, CreateOutcome, CreateResponse, CreateRunner,
    OutcomeListener, PipelineError, Record, RecordInvalid, Repository, SqliteAdapter,
};
use serde_json::json;
use support::{attrs, CountingAdapter};

#[derive(Default)]
struct RecordingListener {
    created: Vec<Record>,
    failed: Vec<RecordInvalid>,
}

impl CreateListener for RecordingListener {
    type Response = ();

    fn created_successfully(&mut self, target: Record) {
        self.created.push(target);
    }

    fn creation_failed(&mut self, error: RecordInvalid) {
        self.failed.push(error);
    }
}

#[test]
fn valid_input_creates_owned_record() {
    let conn = open_db_in_memory().unwrap();
    let adapter = CountingAdapter::new(SqliteAdapter::new(&conn));
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();

    let outcome = CreateRunner::new(
        OutcomeListener,
        &actor,
        attrs(json!({ "title": "Hi" })),
        &repository,
    )
    .run()
    .unwrap();

    let target = match outcome {
        CreateOutcome::Created(target) => target,
        other => panic!("expected created outcome, got {other:?}"),
    };
    assert!(target.is_persisted());
    assert_eq!(target.owner, Some(actor.id));
    assert_eq!(target.attribute_str("title"), Some("Hi"));
    assert_eq!(adapter.saves.get(), 1);
    assert_eq!(adapter.commits.get(), 1);

    let stored = repository.find(target.id.unwrap()).unwrap();
    assert_eq!(stored, target);
}

#[test]
fn invalid_form_skips_persistence() {
    let conn = open_db_in_memory().unwrap();
    let adapter = CountingAdapter::new(SqliteAdapter::new(&conn));
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();

    let input = attrs(json!({ "body": "no title" }));
    let outcome = CreateRunner::new(OutcomeListener, &actor, input.clone(), &repository)
        .with_form(AttributesForm::new(input).require("title"))
        .run()
        .unwrap();

    let invalid = match outcome {
        CreateOutcome::CreationFailed(invalid) => invalid,
        other => panic!("expected creation failure, got {other:?}"),
    };
    assert_eq!(invalid.source, InvalidSource::Form);
    assert_eq!(invalid.errors.get("title"), ["can't be blank"]);
    assert_eq!(adapter.saves.get(), 0);
    assert_eq!(adapter.begins.get(), 0);
    assert!(repository.all().unwrap().is_empty());
}

#[test]
fn defaults_fill_missing_keys_only() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();

    let outcome = CreateRunner::new(
        OutcomeListener,
        &actor,
        attrs(json!({ "title": "Hi" })),
        &repository,
    )
    .with_defaults(attrs(json!({ "title": "Untitled", "status": "draft" })))
    .run()
    .unwrap();

    let target = match outcome {
        CreateOutcome::Created(target) => target,
        other => panic!("expected created outcome, got {other:?}"),
    };
    assert_eq!(target.attribute_str("title"), Some("Hi"));
    assert_eq!(target.attribute_str("status"), Some("draft"));
}

#[test]
fn listener_receives_exactly_one_callback() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();
    let mut listener = RecordingListener::default();

    CreateRunner::new(
        &mut listener,
        &actor,
        attrs(json!({ "title": "Hi" })),
        &repository,
    )
    .run()
    .unwrap();

    assert_eq!(listener.created.len(), 1);
    assert!(listener.failed.is_empty());
}

#[test]
fn record_rejected_by_adapter_is_reported_as_creation_failure() {
    let conn = open_db_in_memory().unwrap();
    let adapter = CountingAdapter::new(SqliteAdapter::new(&conn));
    let repository = Repository::new(&adapter, "Bad Collection");
    let actor = Actor::new();

    let outcome = CreateRunner::new(
        OutcomeListener,
        &actor,
        attrs(json!({ "title": "Hi" })),
        &repository,
    )
    .run()
    .unwrap();

    let invalid = match outcome {
        CreateOutcome::CreationFailed(invalid) => invalid,
        other => panic!("expected creation failure, got {other:?}"),
    };
    assert_eq!(invalid.source, InvalidSource::Record);
    assert_eq!(invalid.errors.fields().collect::<Vec<_>>(), vec!["collection"]);
    assert_eq!(adapter.rollbacks.get(), 1);
    assert_eq!(adapter.commits.get(), 0);
}

#[test]
fn storage_failure_propagates_without_callback() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE records;").unwrap();
    let adapter = SqliteAdapter::new(&conn);
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();
    let mut listener = RecordingListener::default();

    let err = CreateRunner::new(
        &mut listener,
        &actor,
        attrs(json!({ "title": "Hi" })),
        &repository,
    )
    .run()
    .unwrap_err();

    match err {
        PipelineError::StatementInvalid(invalid) => assert_eq!(invalid.operation, "save"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(listener.created.is_empty());
    assert!(listener.failed.is_empty());
}

#[test]
fn fresh_runner_repeats_the_side_effect() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();
    let input = attrs(json!({ "title": "Hi" }));

    for _ in 0..2 {
        CreateRunner::new(OutcomeListener, &actor, input.clone(), &repository)
            .run()
            .unwrap();
    }

    let stored = repository.all().unwrap();
    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0].id, stored[1].id);
}

#[test]
fn json_response_renders_created_record() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();

    let response = CreateRunner::new(
        CreateResponse::new("post"),
        &actor,
        attrs(json!({ "title": "Hi" })),
        &repository,
    )
    .run()
    .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body["post"]["title"], "Hi");
    assert_eq!(response.body["post"]["owner"], actor.id.to_string());
    assert!(response.body["post"]["id"].is_i64());
}

#[test]
fn json_response_renders_validation_errors() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();

    let response = CreateRunner::new(CreateResponse::new("post"), &actor, attrs(json!({})), &repository)
        .with_form(AttributesForm::new(attrs(json!({}))).require("title"))
        .run()
        .unwrap();

    assert_eq!(response.status, 422);
    assert_eq!(response.body, json!({ "errors": { "title": ["can't be blank"] } }));
}

#[test]
fn injected_form_supplies_the_persisted_attributes() {
    let conn = open_db_in_memory().unwrap();
    let adapter = SqliteAdapter::new(&conn);
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();

    let outcome = CreateRunner::new(
        OutcomeListener,
        &actor,
        attrs(json!({ "title": "from constructor" })),
        &repository,
    )
    .with_form(AttributesForm::new(attrs(json!({ "title": "from form" }))))
    .run()
    .unwrap();

    let target = match outcome {
        CreateOutcome::Created(target) => target,
        other => panic!("expected created outcome, got {other:?}"),
    };
    assert_eq!(target.attribute_str("title"), Some("from form"));
}
