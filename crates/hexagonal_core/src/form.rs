//! Input validation collaborator contracts.
//!
//! # Responsibility
//! - Decide whether operation input is acceptable before any write.
//! - Expose field-level errors and the attributes to hand to the mediator.
//!
//! # Invariants
//! - `errors()` reflects the most recent `is_valid()` call.
//! - `attributes()` never changes across `is_valid()` calls.

use crate::model::field_errors::FieldErrors;
use crate::model::record::{is_attribute_name, Attributes};
use serde_json::Value;
use std::collections::BTreeSet;

/// Validator for one operation's input.
pub trait Form {
    /// Runs validation and records field errors.
    fn is_valid(&mut self) -> bool;
    /// Attributes handed downstream once validation passes.
    fn attributes(&self) -> &Attributes;
    fn errors(&self) -> &FieldErrors;
}

impl<F: Form + ?Sized> Form for Box<F> {
    fn is_valid(&mut self) -> bool {
        (**self).is_valid()
    }

    fn attributes(&self) -> &Attributes {
        (**self).attributes()
    }

    fn errors(&self) -> &FieldErrors {
        (**self).errors()
    }
}

/// Minimal presence/permission form.
///
/// Without rules it only rejects malformed attribute names, so it doubles as
/// the default form for runners.
#[derive(Debug, Clone, Default)]
pub struct AttributesForm {
    attributes: Attributes,
    required: BTreeSet<String>,
    permitted: Option<BTreeSet<String>>,
    errors: FieldErrors,
}

impl AttributesForm {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    /// Requires `field` to be present, non-null and, for strings, non-blank.
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required.insert(field.into());
        self
    }

    /// Restricts input to the listed fields; anything else is an error.
    pub fn permit<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permitted
            .get_or_insert_with(BTreeSet::new)
            .extend(fields.into_iter().map(Into::into));
        self
    }
}

impl Form for AttributesForm {
    fn is_valid(&mut self) -> bool {
        self.errors.clear();

        for key in self.attributes.keys() {
            if !is_attribute_name(key) {
                self.errors.add(key.as_str(), "is not a valid attribute name");
            } else if let Some(permitted) = &self.permitted {
                if !permitted.contains(key) {
                    self.errors.add(key.as_str(), "is not permitted");
                }
            }
        }

        for field in &self.required {
            if is_blank(self.attributes.get(field)) {
                self.errors.add(field.as_str(), "can't be blank");
            }
        }

        self.errors.is_empty()
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn errors(&self) -> &FieldErrors {
        &self.errors
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}
