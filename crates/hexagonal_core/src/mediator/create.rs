use crate::adapter::PersistenceAdapter;
use crate::error::PipelineResult;
use crate::mediator::Mediator;
use crate::model::actor::Actor;
use crate::model::record::{merge_defaults, Attributes, Record};
use crate::repository::Repository;
use log::debug;

/// Builds a new target from validated attributes and saves it strictly.
pub struct CreateMediator<'r, A: PersistenceAdapter> {
    repository: &'r Repository<'r, A>,
    actor: &'r Actor,
    attributes: Attributes,
}

impl<'r, A: PersistenceAdapter> CreateMediator<'r, A> {
    pub fn new(repository: &'r Repository<'r, A>, actor: &'r Actor, attributes: Attributes) -> Self {
        Self {
            repository,
            actor,
            attributes,
        }
    }

    /// Fills keys missing from the input with `defaults`.
    pub fn with_defaults(mut self, defaults: &Attributes) -> Self {
        self.attributes = merge_defaults(self.attributes, defaults);
        self
    }

    /// Attributes the target will be built from.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl<A: PersistenceAdapter> Mediator for CreateMediator<'_, A> {
    type Output = Record;

    fn call(self) -> PipelineResult<Record> {
        let repository = self.repository;
        let mut target = repository.build(self.actor, self.attributes);
        repository
            .unit_of_work()
            .run(|| repository.save_strict(&mut target))?;

        debug!(
            "event=mediator_create module=mediator status=ok collection={} actor={}",
            repository.collection(),
            self.actor.id
        );
        Ok(target)
    }
}
