use crate::adapter::PersistenceAdapter;
use crate::error::PipelineResult;
use crate::mediator::Mediator;
use crate::model::actor::Actor;
use crate::model::record::{Attributes, Record};
use crate::repository::Repository;
use log::debug;

/// Overlays validated attributes onto a located target and saves it strictly.
pub struct UpdateMediator<'r, A: PersistenceAdapter> {
    repository: &'r Repository<'r, A>,
    actor: &'r Actor,
    target: Record,
    attributes: Attributes,
}

impl<'r, A: PersistenceAdapter> UpdateMediator<'r, A> {
    pub fn new(
        repository: &'r Repository<'r, A>,
        actor: &'r Actor,
        target: Record,
        attributes: Attributes,
    ) -> Self {
        Self {
            repository,
            actor,
            target,
            attributes,
        }
    }
}

impl<A: PersistenceAdapter> Mediator for UpdateMediator<'_, A> {
    type Output = Record;

    fn call(self) -> PipelineResult<Record> {
        let repository = self.repository;
        let mut target = self.target;
        target.assign(self.attributes);
        repository
            .unit_of_work()
            .run(|| repository.save_strict(&mut target))?;

        debug!(
            "event=mediator_update module=mediator status=ok collection={} actor={}",
            repository.collection(),
            self.actor.id
        );
        Ok(target)
    }
}
