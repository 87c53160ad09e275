//! Ingredient catalog entry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::convert::Infallible;

use super::errors::WorkflowError;
use super::ids::{self, IngredientId, ReviewerId};
use super::record::{CollectionName, FieldValue, Record};

/// An ingredient. Recipes reference it by id; it never changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    id: IngredientId,
    name: String,
    added_by: ReviewerId,
    created_at: DateTime<Utc>,
}

impl Ingredient {
    pub const NAME: &'static str = "name";

    pub fn id(&self) -> IngredientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn added_by(&self) -> ReviewerId {
        self.added_by
    }
}

#[derive(Debug, Clone)]
pub struct IngredientDraft {
    pub name: String,
    pub added_by: ReviewerId,
}

impl IngredientDraft {
    pub fn new(name: &str, added_by: ReviewerId) -> Result<Self, WorkflowError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkflowError::Validation(
                "ingredient name cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            added_by,
        })
    }
}

impl Record for Ingredient {
    type Marker = ids::Ingredient;
    type Draft = IngredientDraft;
    type Patch = Infallible;

    const COLLECTION: CollectionName = CollectionName::Ingredients;

    fn id(&self) -> IngredientId {
        self.id
    }

    fn from_draft(id: IngredientId, draft: IngredientDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            added_by: draft.added_by,
            created_at: now,
        }
    }

    fn apply(&mut self, patch: Infallible, _now: DateTime<Utc>) {
        match patch {}
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            Self::NAME => Some(FieldValue::text(&self.name)),
            _ => None,
        }
    }
}
