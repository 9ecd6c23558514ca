#![allow(dead_code)]

use hexagonal_core::{
    Attributes, PersistenceAdapter, PipelineResult, Record, RecordId, RecordQuery,
};
use std::cell::Cell;

pub fn attrs(value: serde_json::Value) -> Attributes {
    serde_json::from_value(value).unwrap()
}

/// Wraps an adapter and counts the calls issued through it.
pub struct CountingAdapter<A> {
    inner: A,
    pub finds: Cell<usize>,
    pub saves: Cell<usize>,
    pub destroys: Cell<usize>,
    pub queries: Cell<usize>,
    pub begins: Cell<usize>,
    pub commits: Cell<usize>,
    pub rollbacks: Cell<usize>,
}

impl<A: PersistenceAdapter> CountingAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            finds: Cell::new(0),
            saves: Cell::new(0),
            destroys: Cell::new(0),
            queries: Cell::new(0),
            begins: Cell::new(0),
            commits: Cell::new(0),
            rollbacks: Cell::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.saves.get() + self.destroys.get()
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl<A: PersistenceAdapter> PersistenceAdapter for CountingAdapter<A> {
    fn find(&self, collection: &str, id: RecordId) -> PipelineResult<Record> {
        bump(&self.finds);
        self.inner.find(collection, id)
    }

    fn save_strict(&self, record: &mut Record) -> PipelineResult<()> {
        bump(&self.saves);
        self.inner.save_strict(record)
    }

    fn destroy(&self, record: &Record) -> PipelineResult<()> {
        bump(&self.destroys);
        self.inner.destroy(record)
    }

    fn query(&self, query: &RecordQuery) -> PipelineResult<Vec<Record>> {
        bump(&self.queries);
        self.inner.query(query)
    }

    fn begin(&self) -> PipelineResult<()> {
        bump(&self.begins);
        self.inner.begin()
    }

    fn commit(&self) -> PipelineResult<()> {
        bump(&self.commits);
        self.inner.commit()
    }

    fn rollback(&self) -> PipelineResult<()> {
        bump(&self.rollbacks);
        self.inner.rollback()
    }

    fn in_transaction(&self) -> bool {
        self.inner.in_transaction()
    }
}
