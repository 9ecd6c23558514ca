//! JSON-shaped reference listeners.
//!
//! # Responsibility
//! - Turn runner outcomes into a status code plus JSON body.
//! - Keep transport binding (HTTP framework, caching, pagination) outside core.
//!
//! # Invariants
//! - Validation failures render as `422 { "errors": { field: [messages] } }`.
//! - Authorization failures render as `401 { "message": ... }`.

use crate::error::{RecordInvalid, Unauthorized};
use crate::model::record::Record;
use crate::runner::{CreateListener, DeleteListener, FilterListener, UpdateListener};
use serde_json::{json, Map, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_UNPROCESSABLE: u16 = 422;

/// Presentation artifact produced by the reference listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: Value,
}

impl JsonResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn no_content() -> Self {
        Self::new(STATUS_NO_CONTENT, Value::Null)
    }

    fn invalid(error: &RecordInvalid) -> Self {
        Self::new(STATUS_UNPROCESSABLE, json!({ "errors": error.errors }))
    }

    fn unauthorized(error: &Unauthorized) -> Self {
        Self::new(STATUS_UNAUTHORIZED, json!({ "message": error.message }))
    }
}

/// Flattens a record into `{ "id": .., "owner": .., <attributes>.. }`.
pub fn present_record(record: &Record) -> Value {
    let mut object = Map::new();
    object.insert("id".to_string(), json!(record.id));
    object.insert(
        "owner".to_string(),
        json!(record.owner.map(|owner| owner.to_string())),
    );
    for (key, value) in &record.attributes {
        object.insert(key.clone(), value.clone());
    }
    Value::Object(object)
}

/// Renders create outcomes under `key`.
#[derive(Debug, Clone)]
pub struct CreateResponse {
    key: String,
}

impl CreateResponse {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl CreateListener for CreateResponse {
    type Response = JsonResponse;

    fn created_successfully(&mut self, target: Record) -> JsonResponse {
        let mut body = Map::new();
        body.insert(self.key.clone(), present_record(&target));
        JsonResponse::new(STATUS_CREATED, Value::Object(body))
    }

    fn creation_failed(&mut self, error: RecordInvalid) -> JsonResponse {
        JsonResponse::invalid(&error)
    }
}

/// Renders update outcomes under `key`.
#[derive(Debug, Clone)]
pub struct UpdateResponse {
    key: String,
}

impl UpdateResponse {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl UpdateListener for UpdateResponse {
    type Response = JsonResponse;

    fn updated_successfully(&mut self, target: Record) -> JsonResponse {
        let mut body = Map::new();
        body.insert(self.key.clone(), present_record(&target));
        JsonResponse::new(STATUS_OK, Value::Object(body))
    }

    fn update_failed(&mut self, error: RecordInvalid) -> JsonResponse {
        JsonResponse::invalid(&error)
    }

    fn unauthorized(&mut self, error: Unauthorized) -> JsonResponse {
        JsonResponse::unauthorized(&error)
    }
}

/// Renders delete outcomes; success has no body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteResponse;

impl DeleteListener for DeleteResponse {
    type Response = JsonResponse;

    fn deleted_successfully(&mut self, _target: Record) -> JsonResponse {
        JsonResponse::no_content()
    }

    fn unauthorized(&mut self, error: Unauthorized) -> JsonResponse {
        JsonResponse::unauthorized(&error)
    }
}

/// Renders filter outcomes as a list under `key`, optionally with `meta`.
#[derive(Debug, Clone)]
pub struct FindAllResponse {
    key: String,
    with_meta: bool,
}

impl FindAllResponse {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            with_meta: false,
        }
    }

    /// Adds `meta: { count }` to successful responses.
    pub fn with_meta(mut self) -> Self {
        self.with_meta = true;
        self
    }
}

impl FilterListener for FindAllResponse {
    type Response = JsonResponse;

    fn found(&mut self, items: Vec<Record>) -> JsonResponse {
        let mut body = Map::new();
        if self.with_meta {
            body.insert("meta".to_string(), json!({ "count": items.len() }));
        }
        body.insert(
            self.key.clone(),
            Value::Array(items.iter().map(present_record).collect()),
        );
        JsonResponse::new(STATUS_OK, Value::Object(body))
    }

    fn invalid(&mut self, error: RecordInvalid) -> JsonResponse {
        JsonResponse::invalid(&error)
    }
}
