//! RecordStore port - 外部レコードストアへのインターフェース
//!
//! The engine reads and writes entities only through these traits. A store
//! offers per-record atomic writes and nothing more: no multi-record
//! transactions and no cross-record constraints. Invariants spanning several
//! records are the engine's job.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    CollectionName, FieldValue, Id, Ingredient, Recipe, Record, Reviewer, Submitter,
    WorkflowError,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Transient backend failure; the call may succeed if repeated.
    #[error("{collection} unavailable: {message}")]
    Unavailable {
        collection: CollectionName,
        message: String,
    },

    #[error("{collection} has no record {id}")]
    NotFound {
        collection: CollectionName,
        id: String,
    },
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { .. } => WorkflowError::StoreUnavailable(err.to_string()),
            StoreError::NotFound { .. } => WorkflowError::NotFound(err.to_string()),
        }
    }
}

/// Conjunction of field-equality predicates. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<(&'static str, FieldValue)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: &'static str, value: FieldValue) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: &'static str, value: FieldValue) -> Self {
        self.predicates.push((field, value));
        self
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.predicates
            .iter()
            .all(|(field, value)| record.field(field).as_ref() == Some(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Descending,
        }
    }
}

/// One collection of the record store.
///
/// Without sort keys, `query` returns records in insertion order. Records
/// lacking a sort field order before those that have it.
#[async_trait]
pub trait Collection<R: Record>: Send + Sync {
    async fn create(&self, draft: R::Draft) -> Result<R, StoreError>;

    /// `Ok(None)` when the id does not resolve.
    async fn get(&self, id: Id<R::Marker>) -> Result<Option<R>, StoreError>;

    /// Apply `patch` atomically to one record.
    async fn update(&self, id: Id<R::Marker>, patch: R::Patch) -> Result<R, StoreError>;

    async fn query(&self, filter: &Filter, sort: &[SortKey]) -> Result<Vec<R>, StoreError>;
}

/// The four collections the workflow works with.
pub trait RecordStore: Send + Sync {
    fn submitters(&self) -> &dyn Collection<Submitter>;
    fn reviewers(&self) -> &dyn Collection<Reviewer>;
    fn ingredients(&self) -> &dyn Collection<Ingredient>;
    fn recipes(&self) -> &dyn Collection<Recipe>;
}
