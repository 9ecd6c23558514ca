//! Runners orchestrate one operation end to end.
//!
//! # Responsibility
//! - Sequence validate, authorize and execute steps for one operation.
//! - Route handled failures and success to the matching listener callback.
//!
//! # Invariants
//! - Steps run in order `validate -> authorize -> execute`; a failed step
//!   skips every later step.
//! - A runner handles only the error kinds its steps produce; anything else is
//!   returned as `Err` without touching the listener.
//! - `run` consumes the runner, so one instance runs at most once:
//!
//! ```compile_fail
//! use hexagonal_core::db::open_db_in_memory;
//! use hexagonal_core::{Actor, Attributes, CreateRunner, OutcomeListener, Repository, SqliteAdapter};
//!
//! let conn = open_db_in_memory().unwrap();
//! let adapter = SqliteAdapter::new(&conn);
//! let repository = Repository::new(&adapter, "posts");
//! let actor = Actor::new();
//! let runner = CreateRunner::new(OutcomeListener, &actor, Attributes::new(), &repository);
//! runner.run().unwrap();
//! runner.run().unwrap();
//! ```
//!
//! # Example
//!
//! ```
//! use hexagonal_core::db::open_db_in_memory;
//! use hexagonal_core::{
//!     Actor, AttributesForm, CreateOutcome, CreateRunner, OutcomeListener, Repository,
//!     SqliteAdapter,
//! };
//!
//! let conn = open_db_in_memory().unwrap();
//! let adapter = SqliteAdapter::new(&conn);
//! let repository = Repository::new(&adapter, "posts");
//! let actor = Actor::new();
//! let attributes = serde_json::from_value(serde_json::json!({ "title": "Hi" })).unwrap();
//!
//! let outcome = CreateRunner::new(OutcomeListener, &actor, attributes, &repository)
//!     .with_form(AttributesForm::new(Default::default()).require("title"))
//!     .run()
//!     .unwrap();
//! assert!(matches!(outcome, CreateOutcome::CreationFailed(_)));
//! ```

mod create;
mod delete;
mod filter;
mod update;

pub use create::{CreateListener, CreateOutcome, CreateRunner};
pub use delete::{DeleteListener, DeleteOutcome, DeleteRunner};
pub use filter::{FilterListener, FilterOutcome, FilterRunner};
pub use update::{UpdateListener, UpdateOutcome, UpdateRunner};

use crate::error::{RecordInvalid, Unauthorized};
use crate::form::Form;
use crate::model::record::Record;

/// Listener whose responses are the runners' outcome values themselves.
///
/// Lets callers branch on a returned enum instead of implementing callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeListener;

impl CreateListener for OutcomeListener {
    type Response = CreateOutcome;

    fn created_successfully(&mut self, target: Record) -> CreateOutcome {
        CreateOutcome::Created(target)
    }

    fn creation_failed(&mut self, error: RecordInvalid) -> CreateOutcome {
        CreateOutcome::CreationFailed(error)
    }
}

impl UpdateListener for OutcomeListener {
    type Response = UpdateOutcome;

    fn updated_successfully(&mut self, target: Record) -> UpdateOutcome {
        UpdateOutcome::Updated(target)
    }

    fn update_failed(&mut self, error: RecordInvalid) -> UpdateOutcome {
        UpdateOutcome::UpdateFailed(error)
    }

    fn unauthorized(&mut self, error: Unauthorized) -> UpdateOutcome {
        UpdateOutcome::Unauthorized(error)
    }
}

impl DeleteListener for OutcomeListener {
    type Response = DeleteOutcome;

    fn deleted_successfully(&mut self, target: Record) -> DeleteOutcome {
        DeleteOutcome::Deleted(target)
    }

    fn unauthorized(&mut self, error: Unauthorized) -> DeleteOutcome {
        DeleteOutcome::Unauthorized(error)
    }
}

impl FilterListener for OutcomeListener {
    type Response = FilterOutcome;

    fn found(&mut self, items: Vec<Record>) -> FilterOutcome {
        FilterOutcome::Found(items)
    }

    fn invalid(&mut self, error: RecordInvalid) -> FilterOutcome {
        FilterOutcome::Invalid(error)
    }
}

/// Runner step, reported in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Validate,
    Locate,
    Authorize,
    Execute,
}

impl Stage {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Locate => "locate",
            Self::Authorize => "authorize",
            Self::Execute => "execute",
        }
    }
}

/// Runs `form` and converts a rejection into `RecordInvalid`.
pub(crate) fn validate_form<F: Form + ?Sized>(form: &mut F) -> Result<(), RecordInvalid> {
    if form.is_valid() {
        return Ok(());
    }
    Err(RecordInvalid::from_form(
        form.errors().clone(),
        form.attributes().clone(),
    ))
}
