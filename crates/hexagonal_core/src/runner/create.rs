use crate::adapter::PersistenceAdapter;
use crate::error::{PipelineError, PipelineResult, RecordInvalid};
use crate::form::{AttributesForm, Form};
use crate::mediator::{CreateMediator, Mediator};
use crate::model::actor::Actor;
use crate::model::record::{Attributes, Record};
use crate::repository::Repository;
use crate::runner::{validate_form, Stage};
use log::{error, info, warn};
use std::time::Instant;

/// Callbacks a create operation reports to.
pub trait CreateListener {
    type Response;

    fn created_successfully(&mut self, target: Record) -> Self::Response;
    fn creation_failed(&mut self, error: RecordInvalid) -> Self::Response;
}

impl<L: CreateListener + ?Sized> CreateListener for &mut L {
    type Response = L::Response;

    fn created_successfully(&mut self, target: Record) -> Self::Response {
        (**self).created_successfully(target)
    }

    fn creation_failed(&mut self, error: RecordInvalid) -> Self::Response {
        (**self).creation_failed(error)
    }
}

/// Handled outcomes of a create operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(Record),
    CreationFailed(RecordInvalid),
}

/// Validate -> create -> report.
///
/// Handles `RecordInvalid` from the form or from the strict save.
pub struct CreateRunner<'r, A: PersistenceAdapter, L: CreateListener> {
    listener: L,
    actor: &'r Actor,
    repository: &'r Repository<'r, A>,
    attributes: Attributes,
    form: Option<Box<dyn Form + 'r>>,
    defaults: Attributes,
}

impl<'r, A: PersistenceAdapter, L: CreateListener> CreateRunner<'r, A, L> {
    /// `attributes` seed the default `AttributesForm`; they are discarded when
    /// `with_form` injects a form.
    pub fn new(
        listener: L,
        actor: &'r Actor,
        attributes: Attributes,
        repository: &'r Repository<'r, A>,
    ) -> Self {
        Self {
            listener,
            actor,
            repository,
            attributes,
            form: None,
            defaults: Attributes::new(),
        }
    }

    /// Replaces the default `AttributesForm`.
    ///
    /// The injected form's attributes are what gets persisted.
    pub fn with_form(mut self, form: impl Form + 'r) -> Self {
        self.form = Some(Box::new(form));
        self
    }

    /// Default attributes merged under the validated input.
    pub fn with_defaults(mut self, defaults: Attributes) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn run(self) -> PipelineResult<L::Response> {
        let started_at = Instant::now();
        let Self {
            mut listener,
            actor,
            repository,
            attributes,
            form,
            defaults,
        } = self;
        let mut form: Box<dyn Form + 'r> = match form {
            Some(form) => form,
            None => Box::new(AttributesForm::new(attributes)),
        };

        let result = validate_form(&mut *form)
            .map_err(|invalid| (Stage::Validate, PipelineError::from(invalid)))
            .and_then(|()| {
                CreateMediator::new(repository, actor, form.attributes().clone())
                    .with_defaults(&defaults)
                    .call()
                    .map_err(|err| (Stage::Execute, err))
            });

        match result {
            Ok(target) => {
                info!(
                    "event=runner_create module=runner status=ok collection={} id={} duration_ms={}",
                    repository.collection(),
                    target.id.unwrap_or_default(),
                    started_at.elapsed().as_millis()
                );
                Ok(listener.created_successfully(target))
            }
            Err((stage, PipelineError::RecordInvalid(invalid))) => {
                warn!(
                    "event=runner_create module=runner status=invalid collection={} stage={} fields={}",
                    repository.collection(),
                    stage.as_str(),
                    invalid.errors.len()
                );
                Ok(listener.creation_failed(invalid))
            }
            Err((stage, err)) => {
                error!(
                    "event=runner_create module=runner status=error collection={} stage={} error_code={} error={}",
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
