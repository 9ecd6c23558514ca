//! Transaction scope for one logical operation.
//!
//! # Invariants
//! - Writes made through the adapter inside `run` commit or roll back together.
//! - Errors returned by the block propagate unchanged after rollback.
//! - Nested `run` calls join the already-open transaction (flattened); only
//!   the outermost scope commits or rolls back.
//! - A panic inside the block rolls the transaction back during unwinding.

use crate::adapter::PersistenceAdapter;
use crate::error::PipelineResult;
use log::{debug, warn};

/// Transaction demarcation over one adapter.
pub struct UnitOfWork<'a, A: PersistenceAdapter> {
    adapter: &'a A,
}

impl<'a, A: PersistenceAdapter> UnitOfWork<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self { adapter }
    }

    /// Executes `block` inside one transaction.
    ///
    /// # Errors
    /// - Returns the block's error after rolling back.
    /// - Returns `StatementInvalid` when `BEGIN` or `COMMIT` fails.
    pub fn run<T, F>(&self, block: F) -> PipelineResult<T>
    where
        F: FnOnce() -> PipelineResult<T>,
    {
        if self.adapter.in_transaction() {
            debug!("event=unit_of_work module=unit_of_work status=joined");
            return block();
        }

        self.adapter.begin()?;
        let mut guard = RollbackOnUnwind {
            adapter: self.adapter,
            armed: true,
        };

        let outcome = block();
        guard.armed = false;

        match outcome {
            Ok(value) => {
                if let Err(err) = self.adapter.commit() {
                    self.rollback_quietly();
                    return Err(err);
                }
                debug!("event=unit_of_work module=unit_of_work status=committed");
                Ok(value)
            }
            Err(err) => {
                self.rollback_quietly();
                debug!(
                    "event=unit_of_work module=unit_of_work status=rolled_back cause={}",
                    err.kind()
                );
                Err(err)
            }
        }
    }

    fn rollback_quietly(&self) {
        if !self.adapter.in_transaction() {
            return;
        }
        if let Err(err) = self.adapter.rollback() {
            warn!("event=unit_of_work module=unit_of_work status=rollback_failed error={err}");
        }
    }
}

struct RollbackOnUnwind<'a, A: PersistenceAdapter> {
    adapter: &'a A,
    armed: bool,
}

impl<A: PersistenceAdapter> Drop for RollbackOnUnwind<'_, A> {
    fn drop(&mut self) {
        if self.armed && self.adapter.in_transaction() {
            warn!("event=unit_of_work module=unit_of_work status=rolled_back cause=panic");
            let _ = self.adapter.rollback();
        }
    }
}
