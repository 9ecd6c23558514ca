use crate::adapter::PersistenceAdapter;
use crate::error::{PipelineError, PipelineResult, Unauthorized};
use crate::mediator::{DeleteMediator, Mediator};
use crate::model::actor::Actor;
use crate::model::record::{Record, RecordId};
use crate::policy::{Action, OwnerPolicy, Policy};
use crate::repository::Repository;
use crate::runner::Stage;
use log::{error, info, warn};
use std::time::Instant;

/// Callbacks a delete operation reports to.
pub trait DeleteListener {
    type Response;

    fn deleted_successfully(&mut self, target: Record) -> Self::Response;
    fn unauthorized(&mut self, error: Unauthorized) -> Self::Response;
}

impl<L: DeleteListener + ?Sized> DeleteListener for &mut L {
    type Response = L::Response;

    fn deleted_successfully(&mut self, target: Record) -> Self::Response {
        (**self).deleted_successfully(target)
    }

    fn unauthorized(&mut self, error: Unauthorized) -> Self::Response {
        (**self).unauthorized(error)
    }
}

/// Handled outcomes of a delete operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Record),
    Unauthorized(Unauthorized),
}

/// Locate -> authorize -> destroy -> report.
///
/// Handles `Unauthorized`; a missing record is returned as `RecordNotFound`.
pub struct DeleteRunner<'r, A: PersistenceAdapter, L: DeleteListener> {
    listener: L,
    actor: &'r Actor,
    repository: &'r Repository<'r, A>,
    id: RecordId,
    policy: Box<dyn Policy + 'r>,
}

impl<'r, A: PersistenceAdapter, L: DeleteListener> DeleteRunner<'r, A, L> {
    pub fn new(
        listener: L,
        actor: &'r Actor,
        id: RecordId,
        repository: &'r Repository<'r, A>,
    ) -> Self {
        Self {
            listener,
            actor,
            repository,
            id,
            policy: Box::new(OwnerPolicy),
        }
    }

    /// Replaces the default `OwnerPolicy`.
    pub fn with_policy(mut self, policy: impl Policy + 'r) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn run(self) -> PipelineResult<L::Response> {
        let started_at = Instant::now();
        let Self {
            mut listener,
            actor,
            repository,
            id,
            policy,
        } = self;

        let result = repository
            .find(id)
            .map_err(|err| (Stage::Locate, err))
            .and_then(|target| {
                if policy.can_delete(actor, &target) {
                    Ok(target)
                } else {
                    Err((
                        Stage::Authorize,
                        Unauthorized::new(Action::Delete, actor.id).into(),
                    ))
                }
            })
            .and_then(|target| {
                DeleteMediator::new(repository, actor, target)
                    .call()
                    .map_err(|err| (Stage::Execute, err))
            });

        match result {
            Ok(target) => {
                info!(
                    "event=runner_delete module=runner status=ok collection={} id={id} duration_ms={}",
                    repository.collection(),
                    started_at.elapsed().as_millis()
                );
                Ok(listener.deleted_successfully(target))
            }
            Err((stage, PipelineError::Unauthorized(denied))) => {
                warn!(
                    "event=runner_delete module=runner status=unauthorized collection={} id={id} stage={} actor={}",
                    repository.collection(),
                    stage.as_str(),
                    denied.actor
                );
                Ok(listener.unauthorized(denied))
            }
            Err((stage, err)) => {
                error!(
                    "event=runner_delete module=runner status=error collection={} id={id} stage={} error_code={} error={}",
                    repository.collection(),
                    stage.as_str(),
                    err.kind(),
                    err
                );
                Err(err)
            }
        }
    }
}
