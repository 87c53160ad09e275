//! Record shape shared by every stored entity.
//!
//! The record store knows nothing about recipes or submitters; it creates,
//! patches and filters anything implementing [`Record`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

use super::ids::{Id, IdMarker};

/// The four collections of the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionName {
    Submitters,
    Reviewers,
    Ingredients,
    Recipes,
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollectionName::Submitters => "submitters",
            CollectionName::Reviewers => "reviewers",
            CollectionName::Ingredients => "ingredients",
            CollectionName::Recipes => "recipes",
        };
        f.write_str(s)
    }
}

/// A field value as seen by filter and sort evaluation.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum FieldValue {
    Text(String),
    Id(Ulid),
    Bool(bool),
    Count(u64),
    Time(DateTime<Utc>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn id<T: IdMarker>(id: Id<T>) -> Self {
        FieldValue::Id(id.as_ulid())
    }
}

/// A stored entity.
///
/// `Draft` is what a caller hands to `create`; the store assigns the id and
/// timestamps. `Patch` is the only way to change a stored record. Entities
/// that never change use an uninhabited patch type.
pub trait Record: Clone + Send + Sync + 'static {
    type Marker: IdMarker;
    type Draft: Send + 'static;
    type Patch: Send + 'static;

    const COLLECTION: CollectionName;

    fn id(&self) -> Id<Self::Marker>;

    fn from_draft(id: Id<Self::Marker>, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// Named field lookup used by `Filter` and `SortKey`.
    fn field(&self, name: &str) -> Option<FieldValue>;
}
