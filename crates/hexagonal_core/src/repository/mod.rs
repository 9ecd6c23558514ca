//! Storage-agnostic repository facade.
//!
//! # Responsibility
//! - Give mediators and runners a narrow surface over one adapter and one
//!   collection.
//! - Own the unit of work used for every write issued through it.
//!
//! # Invariants
//! - The repository holds no business logic.
//! - `unit_of_work()` returns the same instance for the repository lifetime.

pub mod unit_of_work;

use crate::adapter::{PersistenceAdapter, RecordQuery};
use crate::error::PipelineResult;
use crate::model::actor::Actor;
use crate::model::record::{Attributes, Record, RecordId};

pub use unit_of_work::UnitOfWork;

/// Facade over one adapter scoped to one collection.
pub struct Repository<'a, A: PersistenceAdapter> {
    adapter: &'a A,
    collection: String,
    unit_of_work: UnitOfWork<'a, A>,
}

impl<'a, A: PersistenceAdapter> Repository<'a, A> {
    pub fn new(adapter: &'a A, collection: impl Into<String>) -> Self {
        Self {
            adapter,
            collection: collection.into(),
            unit_of_work: UnitOfWork::new(adapter),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn adapter(&self) -> &'a A {
        self.adapter
    }

    /// Construction path for new targets; performs no I/O.
    pub fn build(&self, owner: &Actor, attributes: Attributes) -> Record {
        Record::new(self.collection.as_str(), attributes).owned_by(owner.id)
    }

    pub fn find(&self, id: RecordId) -> PipelineResult<Record> {
        self.adapter.find(&self.collection, id)
    }

    /// Lenient save; `Ok(false)` when the record is semantically invalid.
    pub fn save(&self, record: &mut Record) -> PipelineResult<bool> {
        self.adapter.save(record)
    }

    /// Strict save; fails with `RecordInvalid` instead of returning `false`.
    pub fn save_strict(&self, record: &mut Record) -> PipelineResult<()> {
        self.adapter.save_strict(record)
    }

    /// Removes the record and hands it back to the caller.
    pub fn destroy(&self, record: Record) -> PipelineResult<Record> {
        self.adapter.destroy(&record)?;
        Ok(record)
    }

    pub fn all(&self) -> PipelineResult<Vec<Record>> {
        self.adapter.all(&self.collection)
    }

    /// Query builder pre-scoped to this repository's collection.
    pub fn scoped_query(&self) -> RecordQuery {
        RecordQuery::new(self.collection.as_str())
    }

    pub fn query(&self, query: &RecordQuery) -> PipelineResult<Vec<Record>> {
        self.adapter.query(query)
    }

    /// Records owned by `actor` whose attributes equal every entry of `filter`.
    pub fn filter_for_actor(&self, actor: &Actor, filter: &Attributes) -> PipelineResult<Vec<Record>> {
        let query = self
            .scoped_query()
            .owned_by(actor.id)
            .matching(filter.clone());
        self.adapter.query(&query)
    }

    pub fn unit_of_work(&self) -> &UnitOfWork<'a, A> {
        &self.unit_of_work
    }
}
