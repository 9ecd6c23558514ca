//! Generic persisted record.
//!
//! # Responsibility
//! - Carry one domain object's identity, ownership and attribute map.
//! - Enforce the structural rules every adapter relies on.
//!
//! # Invariants
//! - `collection` is a lowercase identifier (safe to embed in storage keys).
//! - Attribute keys are identifiers and never shadow `id` or `owner`.

use crate::model::actor::ActorId;
use crate::model::field_errors::FieldErrors;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Storage-assigned record identifier.
pub type RecordId = i64;

/// Attribute name to JSON value mapping used for input, filters and records.
pub type Attributes = BTreeMap<String, Value>;

static COLLECTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid collection regex"));
static ATTRIBUTE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid attribute regex"));

const RESERVED_ATTRIBUTES: &[&str] = &["id", "owner"];

/// Domain object targeted by one pipeline operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// `None` until the adapter persists the record.
    pub id: Option<RecordId>,
    pub collection: String,
    /// Actor that created the record, used for ownership scoping.
    pub owner: Option<ActorId>,
    pub attributes: Attributes,
}

impl Record {
    /// Creates an unsaved, unowned record.
    pub fn new(collection: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: None,
            collection: collection.into(),
            owner: None,
            attributes,
        }
    }

    pub fn owned_by(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns the attribute as `&str` when it holds a JSON string.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Value::as_str)
    }

    /// Overlays `attributes` onto this record; incoming keys win.
    pub fn assign(&mut self, attributes: Attributes) {
        self.attributes.extend(attributes);
    }

    /// Checks the structural rules required before persistence.
    ///
    /// Returns every violation at once so callers can report field-level detail.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if !COLLECTION_NAME.is_match(&self.collection) {
            errors.add("collection", "must be a lowercase identifier");
        }

        for key in self.attributes.keys() {
            if RESERVED_ATTRIBUTES.contains(&key.as_str()) {
                errors.add(key.as_str(), "is reserved");
            } else if !ATTRIBUTE_NAME.is_match(key) {
                errors.add(key.as_str(), "is not a valid attribute name");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Returns whether `key` may be used as an attribute name.
pub fn is_attribute_name(key: &str) -> bool {
    ATTRIBUTE_NAME.is_match(key) && !RESERVED_ATTRIBUTES.contains(&key)
}

/// Merges `defaults` underneath `attributes`.
///
/// Caller-supplied keys always win; defaults only fill missing keys.
pub fn merge_defaults(mut attributes: Attributes, defaults: &Attributes) -> Attributes {
    for (key, value) in defaults {
        attributes
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::{is_attribute_name, merge_defaults, Attributes, Record};
    use serde_json::json;

    fn attrs(value: serde_json::Value) -> Attributes {
        serde_json::from_value(value).expect("attributes fixture")
    }

    #[test]
    fn defaults_fill_gaps_without_overriding() {
        let merged = merge_defaults(
            attrs(json!({ "name": "a" })),
            &attrs(json!({ "name": "default", "role": "user" })),
        );
        assert_eq!(merged, attrs(json!({ "name": "a", "role": "user" })));
    }

    #[test]
    fn validate_accepts_well_formed_record() {
        let record = Record::new("posts", attrs(json!({ "title": "Hi", "_draft": true })));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn validate_collects_every_violation() {
        let record = Record::new(
            "Posts!",
            attrs(json!({ "id": 3, "bad key": 1, "ok": 2 })),
        );
        let errors = record.validate().expect_err("record should be invalid");
        assert_eq!(errors.get("collection"), ["must be a lowercase identifier"]);
        assert_eq!(errors.get("id"), ["is reserved"]);
        assert_eq!(errors.get("bad key"), ["is not a valid attribute name"]);
        assert!(errors.get("ok").is_empty());
    }

    #[test]
    fn assign_overlays_incoming_keys() {
        let mut record = Record::new("posts", attrs(json!({ "title": "old", "body": "kept" })));
        record.assign(attrs(json!({ "title": "new" })));
        assert_eq!(record.attribute_str("title"), Some("new"));
        assert_eq!(record.attribute_str("body"), Some("kept"));
    }

    #[test]
    fn attribute_name_rules() {
        assert!(is_attribute_name("title"));
        assert!(!is_attribute_name("id"));
        assert!(!is_attribute_name("owner"));
        assert!(!is_attribute_name("9lives"));
    }
}
