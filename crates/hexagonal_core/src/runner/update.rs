use crate::adapter::PersistenceAdapter;
use crate::error::{PipelineError, PipelineResult, RecordInvalid, Unauthorized};
use crate::form::{AttributesForm, Form};
use crate::mediator::{Mediator, UpdateMediator};
use crate::model::actor::Actor;
use crate::model::record::{Attributes, Record, RecordId};
use crate::policy::{Action, OwnerPolicy, Policy};
use crate::repository::Repository;
use crate::runner::{validate_form, Stage};
use log::{error, info, warn};
use std::time::Instant;

/// Callbacks an update operation reports to.
pub trait UpdateListener {
    type Response;

    fn updated_successfully(&mut self, target: Record) -> Self::Response;
    fn update_failed(&mut self, error: RecordInvalid) -> Self::Response;
    fn unauthorized(&mut self, error: Unauthorized) -> Self::Response;
}

impl<L: UpdateListener + ?Sized> UpdateListener for &mut L {
    type Response = L::Response;

    fn updated_successfully(&mut self, target: Record) -> Self::Response {
        (**self).updated_successfully(target)
    }

    fn update_failed(&mut self, error: RecordInvalid) -> Self::Response {
        (**self).update_failed(error)
    }

    fn unauthorized(&mut self, error: Unauthorized) -> Self::Response {
        (**self).unauthorized(error)
    }
}

/// Handled outcomes of an update operation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Record),
    UpdateFailed(RecordInvalid),
    Unauthorized(Unauthorized),
}

/// Validate -> locate -> authorize -> update -> report.
pub struct UpdateRunner<'r, A: PersistenceAdapter, L: UpdateListener> {
    listener: L,
    actor: &'r Actor,
    repository: &'r Repository<'r, A>,
    id: RecordId,
    attributes: Attributes,
    form: Option<Box<dyn Form + 'r>>,
    policy: Box<dyn Policy + 'r>,
}

impl<'r, A: PersistenceAdapter, L: UpdateListener> UpdateRunner<'r, A, L> {
    /// `attributes` seed the default `AttributesForm`; they are discarded when
    /// `with_form` injects a form.
    pub fn new(
        listener: L,
        actor: &'r Actor,
        id: RecordId,
        attributes: Attributes,
        repository: &'r Repository<'r, A>,
    ) -> Self {
        Self {
            listener,
            actor,
            repository,
            id,
            attributes,
            form: None,
            policy: Box::new(OwnerPolicy),
        }
    }

    /// Replaces the default `AttributesForm`; its attributes are applied.
    pub fn with_form(mut self, form: impl Form + 'r) -> Self {
        self.form = Some(Box::new(form));
        self
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
            attributes,
            form,
            policy,
        } = self;
        let mut form: Box<dyn Form + 'r> = match form {
            Some(form) => form,
            None => Box::new(AttributesForm::new(attributes)),
        };

        let result = validate_form(&mut *form)
            .map_err(|invalid| (Stage::Validate, PipelineError::from(invalid)))
            .and_then(|()| repository.find(id).map_err(|err| (Stage::Locate, err)))
            .and_then(|target| {
                if policy.can_update(actor, &target) {
                    Ok(target)
                } else {
                    Err((
                        Stage::Authorize,
                        Unauthorized::new(Action::Update, actor.id).into(),
                    ))
                }
            })
            .and_then(|target| {
                UpdateMediator::new(repository, actor, target, form.attributes().clone())
                    .call()
                    .map_err(|err| (Stage::Execute, err))
            });

        match result {
            Ok(target) => {
                info!(
                    "event=runner_update module=runner status=ok collection={} id={id} duration_ms={}",
                    repository.collection(),
                    started_at.elapsed().as_millis()
                );
                Ok(listener.updated_successfully(target))
            }
            Err((stage, PipelineError::RecordInvalid(invalid))) => {
                warn!(
                    "event=runner_update module=runner status=invalid collection={} id={id} stage={} fields={}",
                    repository.collection(),
                    stage.as_str(),
                    invalid.errors.len()
                );
                Ok(listener.update_failed(invalid))
            }
            Err((stage, PipelineError::Unauthorized(denied))) => {
                warn!(
                    "event=runner_update module=runner status=unauthorized collection={} id={id} stage={} actor={}",
                    repository.collection(),
                    stage.as_str(),
                    denied.actor
                );
                Ok(listener.unauthorized(denied))
            }
            Err((stage, err)) => {
                error!(
                    "event=runner_update module=runner status=error collection={} id={id} stage={} error_code={} error={}",
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
