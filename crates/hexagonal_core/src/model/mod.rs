//! Domain model shared by every pipeline stage.
//!
//! # Responsibility
//! - Define the generic `Record` target persisted by adapters.
//! - Define the acting identity and field-level error collection.
//!
//! # Invariants
//! - A record is persisted iff it carries an `id`.
//! - Records reaching storage have passed `Record::validate()`.

pub mod actor;
pub mod field_errors;
pub mod record;
