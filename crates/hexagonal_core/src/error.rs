//! Pipeline error taxonomy.
//!
//! # Responsibility
//! - Define the only four failure kinds observable above the adapter boundary.
//! - Carry enough context for listeners to render field-level detail.
//!
//! # Invariants
//! - Storage-native errors never escape an adapter except as the `source()` of
//!   `StatementInvalid`.
//! - Each runner handles only the kinds its own steps can produce; every other
//!   kind is returned to the caller unchanged.

use crate::model::actor::ActorId;
use crate::model::field_errors::FieldErrors;
use crate::model::record::{Attributes, RecordId};
use crate::policy::Action;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failure raised while validating, authorizing or persisting one operation.
#[derive(Debug)]
pub enum PipelineError {
    /// The adapter found no record for the id.
    RecordNotFound(RecordNotFound),
    /// The adapter failed to execute a statement (constraint, schema, I/O).
    StatementInvalid(StatementInvalid),
    /// Input or record failed validation.
    RecordInvalid(RecordInvalid),
    /// The policy denied the action.
    Unauthorized(Unauthorized),
}

impl PipelineError {
    /// Stable kind label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RecordNotFound(_) => "record_not_found",
            Self::StatementInvalid(_) => "statement_invalid",
            Self::RecordInvalid(_) => "record_invalid",
            Self::Unauthorized(_) => "unauthorized",
        }
    }
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordNotFound(err) => write!(f, "{err}"),
            Self::StatementInvalid(err) => write!(f, "{err}"),
            Self::RecordInvalid(err) => write!(f, "{err}"),
            Self::Unauthorized(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StatementInvalid(err) => Some(err),
            Self::RecordNotFound(_) => None,
            Self::RecordInvalid(_) => None,
            Self::Unauthorized(_) => None,
        }
    }
}

impl From<RecordNotFound> for PipelineError {
    fn from(value: RecordNotFound) -> Self {
        Self::RecordNotFound(value)
    }
}

impl From<StatementInvalid> for PipelineError {
    fn from(value: StatementInvalid) -> Self {
        Self::StatementInvalid(value)
    }
}

impl From<RecordInvalid> for PipelineError {
    fn from(value: RecordInvalid) -> Self {
        Self::RecordInvalid(value)
    }
}

impl From<Unauthorized> for PipelineError {
    fn from(value: Unauthorized) -> Self {
        Self::Unauthorized(value)
    }
}

/// No record with `id` exists in `collection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordNotFound {
    pub collection: String,
    pub id: RecordId,
}

impl Display for RecordNotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "record not found: {}#{}", self.collection, self.id)
    }
}

impl Error for RecordNotFound {}

/// Adapter-level statement failure.
#[derive(Debug)]
pub struct StatementInvalid {
    /// Adapter operation that failed, e.g. `save` or `begin`.
    pub operation: &'static str,
    pub cause: Box<dyn Error + Send + Sync + 'static>,
}

impl StatementInvalid {
    pub fn new(operation: &'static str, cause: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            operation,
            cause: cause.into(),
        }
    }
}

impl Display for StatementInvalid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "statement invalid during {}: {}", self.operation, self.cause)
    }
}

impl Error for StatementInvalid {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Which collaborator rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSource {
    /// The runner's form rejected operation input.
    Form,
    /// The adapter rejected the record before writing it.
    Record,
}

/// Validation failure with field-level detail.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInvalid {
    pub source: InvalidSource,
    pub errors: FieldErrors,
    /// Attributes of the failing form or record, for re-rendering input.
    pub attributes: Attributes,
}

impl RecordInvalid {
    pub fn from_form(errors: FieldErrors, attributes: Attributes) -> Self {
        Self {
            source: InvalidSource::Form,
            errors,
            attributes,
        }
    }

    pub fn from_record(errors: FieldErrors, attributes: Attributes) -> Self {
        Self {
            source: InvalidSource::Record,
            errors,
            attributes,
        }
    }
}

impl Display for RecordInvalid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: {}", self.errors)
    }
}

impl Error for RecordInvalid {}

/// Policy denial for `action` by `actor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unauthorized {
    pub action: Action,
    pub actor: ActorId,
    pub message: String,
}

impl Unauthorized {
    pub fn new(action: Action, actor: ActorId) -> Self {
        Self {
            action,
            actor,
            message: "Unauthorized".to_string(),
        }
    }
}

impl Display for Unauthorized {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: actor {} may not {}",
            self.message,
            self.actor,
            self.action.as_str()
        )
    }
}

impl Error for Unauthorized {}
