//! Hexagonal request pipeline core.
//! Runners sequence validation, authorization and persistence for one
//! operation and report the outcome to a listener; storage stays behind
//! `PersistenceAdapter`.

pub mod adapter;
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod logging;
pub mod mediator;
pub mod model;
pub mod policy;
pub mod repository;
pub mod response;
pub mod runner;

pub use adapter::{PersistenceAdapter, RecordQuery, SqliteAdapter};
pub use config::{ConfigError, CoreConfig, DatabaseLocation};
pub use error::{
    PipelineError, PipelineResult, RecordInvalid, RecordNotFound, StatementInvalid, Unauthorized,
};
pub use form::{AttributesForm, Form};
pub use logging::{default_log_level, init_logging, logging_status};
pub use mediator::{CreateMediator, DeleteMediator, Mediator, UpdateMediator};
pub use model::actor::{Actor, ActorId};
pub use model::field_errors::FieldErrors;
pub use model::record::{Attributes, Record, RecordId};
pub use policy::{Action, AllowAll, OwnerPolicy, Policy};
pub use repository::{Repository, UnitOfWork};
pub use response::{CreateResponse, DeleteResponse, FindAllResponse, JsonResponse, UpdateResponse};
pub use runner::{
    CreateListener, CreateOutcome, CreateRunner, DeleteListener, DeleteOutcome, DeleteRunner,
    FilterListener, FilterOutcome, FilterRunner, OutcomeListener, UpdateListener, UpdateOutcome,
    UpdateRunner,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
