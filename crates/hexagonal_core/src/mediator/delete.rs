use crate::adapter::PersistenceAdapter;
use crate::error::PipelineResult;
use crate::mediator::Mediator;
use crate::model::actor::Actor;
use crate::model::record::Record;
use crate::repository::Repository;
use log::debug;

/// Destroys an already located target.
pub struct DeleteMediator<'r, A: PersistenceAdapter> {
    repository: &'r Repository<'r, A>,
    actor: &'r Actor,
    target: Record,
}

impl<'r, A: PersistenceAdapter> DeleteMediator<'r, A> {
    pub fn new(repository: &'r Repository<'r, A>, actor: &'r Actor, target: Record) -> Self {
        Self {
            repository,
            actor,
            target,
        }
    }
}

impl<A: PersistenceAdapter> Mediator for DeleteMediator<'_, A> {
    type Output = Record;

    fn call(self) -> PipelineResult<Record> {
        let repository = self.repository;
        let target = self.target;
        let destroyed = repository
            .unit_of_work()
            .run(|| repository.destroy(target))?;

        debug!(
            "event=mediator_delete module=mediator status=ok collection={} actor={}",
            repository.collection(),
            self.actor.id
        );
        Ok(destroyed)
    }
}
