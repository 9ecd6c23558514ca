//! Persistence adapter boundary.
//!
//! # Responsibility
//! - Enumerate every storage operation the repository needs.
//! - Translate storage-native failures into `PipelineError` exactly once.
//!
//! # Invariants
//! - No method returns a storage-native error type.
//! - `save_strict` rejects records failing `Record::validate()` with
//!   `RecordInvalid` before touching storage.
//! - `begin`/`commit`/`rollback` demarcate one flat transaction; nesting is
//!   resolved by `UnitOfWork` through `in_transaction`.

pub mod sqlite;

use crate::error::{PipelineError, PipelineResult};
use crate::model::actor::ActorId;
use crate::model::record::{Attributes, Record, RecordId};
use serde_json::Value;

pub use sqlite::SqliteAdapter;

/// Ad-hoc query over one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub collection: String,
    /// Restrict to records owned by this actor.
    pub owner: Option<ActorId>,
    /// Attribute equality filter; every entry must match.
    pub attributes: Attributes,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl RecordQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn matching(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// Storage operations required by `Repository` and `UnitOfWork`.
pub trait PersistenceAdapter {
    /// Loads one record or fails with `RecordNotFound`.
    fn find(&self, collection: &str, id: RecordId) -> PipelineResult<Record>;

    /// Inserts (no id) or updates (with id) the record, assigning its id.
    fn save_strict(&self, record: &mut Record) -> PipelineResult<()>;

    /// Lenient save: semantic invalidity yields `Ok(false)` instead of an error.
    fn save(&self, record: &mut Record) -> PipelineResult<bool> {
        match self.save_strict(record) {
            Ok(()) => Ok(true),
            Err(PipelineError::RecordInvalid(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Removes a persisted record.
    fn destroy(&self, record: &Record) -> PipelineResult<()>;

    fn query(&self, query: &RecordQuery) -> PipelineResult<Vec<Record>>;

    fn all(&self, collection: &str) -> PipelineResult<Vec<Record>> {
        self.query(&RecordQuery::new(collection))
    }

    fn begin(&self) -> PipelineResult<()>;
    fn commit(&self) -> PipelineResult<()>;
    fn rollback(&self) -> PipelineResult<()>;
    /// Whether a transaction is currently open on the underlying storage.
    fn in_transaction(&self) -> bool;
}

impl<A: PersistenceAdapter + ?Sized> PersistenceAdapter for &A {
    fn find(&self, collection: &str, id: RecordId) -> PipelineResult<Record> {
        (**self).find(collection, id)
    }

    fn save_strict(&self, record: &mut Record) -> PipelineResult<()> {
        (**self).save_strict(record)
    }

    fn save(&self, record: &mut Record) -> PipelineResult<bool> {
        (**self).save(record)
    }

    fn destroy(&self, record: &Record) -> PipelineResult<()> {
        (**self).destroy(record)
    }

    fn query(&self, query: &RecordQuery) -> PipelineResult<Vec<Record>> {
        (**self).query(query)
    }

    fn all(&self, collection: &str) -> PipelineResult<Vec<Record>> {
        (**self).all(collection)
    }

    fn begin(&self) -> PipelineResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> PipelineResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> PipelineResult<()> {
        (**self).rollback()
    }

    fn in_transaction(&self) -> bool {
        (**self).in_transaction()
    }
}
