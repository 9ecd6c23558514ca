use crate::adapter::PersistenceAdapter;
use crate::error::{PipelineError, PipelineResult, RecordInvalid};
use crate::form::{AttributesForm, Form};
use crate::model::actor::Actor;
use crate::model::record::{Attributes, Record};
use crate::repository::Repository;
use crate::runner::{validate_form, Stage};
use log::{error, info, warn};
use std::time::Instant;

/// Callbacks a filter operation reports to.
pub trait FilterListener {
    type Response;

    fn found(&mut self, items: Vec<Record>) -> Self::Response;
    fn invalid(&mut self, error: RecordInvalid) -> Self::Response;
}

impl<L: FilterListener + ?Sized> FilterListener for &mut L {
    type Response = L::Response;

    fn found(&mut self, items: Vec<Record>) -> Self::Response {
        (**self).found(items)
    }

    fn invalid(&mut self, error: RecordInvalid) -> Self::Response {
        (**self).invalid(error)
    }
}

/// Handled outcomes of a filter operation.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Found(Vec<Record>),
    Invalid(RecordInvalid),
}

/// Validate (only with filter input) -> query scoped to actor -> report.
pub struct FilterRunner<'r, A: PersistenceAdapter, L: FilterListener> {
    listener: L,
    actor: &'r Actor,
    repository: &'r Repository<'r, A>,
    attributes: Option<Attributes>,
    form: Option<Box<dyn Form + 'r>>,
}

impl<'r, A: PersistenceAdapter, L: FilterListener> FilterRunner<'r, A, L> {
    /// `attributes = None` lists every record the actor owns. With an injected
    /// form, `attributes` only decides whether validation runs.
    pub fn new(
        listener: L,
        actor: &'r Actor,
        attributes: Option<Attributes>,
        repository: &'r Repository<'r, A>,
    ) -> Self {
        Self {
            listener,
            actor,
            repository,
            attributes,
            form: None,
        }
    }

    /// Replaces the default `AttributesForm`.
    ///
    /// The form's attributes become the filter. It is validated only when
    /// filter attributes were supplied to `new`.
    pub fn with_form(mut self, form: impl Form + 'r) -> Self {
        self.form = Some(Box::new(form));
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
        } = self;

        let needs_validation = attributes.is_some();
        let mut form: Box<dyn Form + 'r> = match form {
            Some(form) => form,
            None => Box::new(AttributesForm::new(attributes.unwrap_or_default())),
        };

        let validated = if needs_validation {
            validate_form(&mut *form)
        } else {
            Ok(())
        };

        let result = validated
            .map_err(|invalid| (Stage::Validate, PipelineError::from(invalid)))
            .and_then(|()| {
                repository
                    .filter_for_actor(actor, form.attributes())
                    .map_err(|err| (Stage::Execute, err))
            });

        match result {
            Ok(items) => {
                info!(
                    "event=runner_filter module=runner status=ok collection={} count={} duration_ms={}",
                    repository.collection(),
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(listener.found(items))
            }
            Err((stage, PipelineError::RecordInvalid(invalid))) => {
                warn!(
                    "event=runner_filter module=runner status=invalid collection={} stage={} fields={}",
                    repository.collection(),
                    stage.as_str(),
                    invalid.errors.len()
                );
                Ok(listener.invalid(invalid))
            }
            Err((stage, err)) => {
                error!(
                    "event=runner_filter module=runner status=error collection={} stage={} error_code={} error={}",
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
