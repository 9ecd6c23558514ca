//! Mediators perform the single persistence action of one operation.
//!
//! # Responsibility
//! - Build or receive the target and issue exactly one write.
//! - Wrap that write in the repository's unit of work.
//!
//! # Invariants
//! - A mediator never authorizes, validates input or touches a listener.
//! - `call` consumes the mediator; it runs at most once.

mod create;
mod delete;
mod update;

use crate::error::PipelineResult;

pub use create::CreateMediator;
pub use delete::DeleteMediator;
pub use update::UpdateMediator;

/// One persistence action executed on behalf of a runner.
///
/// Implement this for multi-write operations; issue every write inside one
/// `UnitOfWork::run` so they commit or roll back together.
pub trait Mediator {
    type Output;

    fn call(self) -> PipelineResult<Self::Output>;
}
