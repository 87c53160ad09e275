//! Recipe record: the reviewable unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ids::{self, IngredientId, RecipeId, ReviewerId, SubmitterId};
use super::price::{Price, PriceSheet};
use super::record::{CollectionName, FieldValue, Record};
use super::state::{RecipeStatus, Verdict};

/// A recipe submission.
///
/// Fields are read-only outside the store; every change goes through a
/// [`RecipePatch`] so the reviewer link and status always move together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    id: RecipeId,
    owner: SubmitterId,
    #[serde(flatten)]
    prices: PriceSheet,
    vegan: bool,
    ingredients: BTreeSet<IngredientId>,
    reviewer: Option<ReviewerId>,
    status: RecipeStatus,

    /// Number of times the recipe went back to the queue after a rejection.
    review_round: u32,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Recipe {
    pub const STATUS: &'static str = "status";
    pub const OWNER: &'static str = "owner";
    pub const REVIEWER: &'static str = "reviewer";
    pub const CREATED_AT: &'static str = "created_at";

    pub fn id(&self) -> RecipeId {
        self.id
    }

    pub fn owner(&self) -> SubmitterId {
        self.owner
    }

    pub fn price(&self) -> Price {
        self.prices.price()
    }

    pub fn price_2x(&self) -> f64 {
        self.prices.price_2x()
    }

    pub fn price_3x(&self) -> f64 {
        self.prices.price_3x()
    }

    pub fn is_vegan(&self) -> bool {
        self.vegan
    }

    pub fn ingredients(&self) -> &BTreeSet<IngredientId> {
        &self.ingredients
    }

    pub fn reviewer(&self) -> Option<ReviewerId> {
        self.reviewer
    }

    pub fn status(&self) -> RecipeStatus {
        self.status
    }

    pub fn review_round(&self) -> u32 {
        self.review_round
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_reviewed_by(&self, reviewer: ReviewerId) -> bool {
        self.reviewer == Some(reviewer)
    }

    /// Idempotency key for recording `verdict` on the current round.
    pub fn decision_key(&self, verdict: Verdict) -> DecisionKey {
        DecisionKey {
            recipe: self.id,
            round: self.review_round,
            verdict,
        }
    }
}

/// Input for creating a recipe. Always starts unassigned.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub owner: SubmitterId,
    pub price: Price,
    pub vegan: bool,
    pub ingredients: BTreeSet<IngredientId>,
}

/// The changes the workflow makes to a stored recipe.
#[derive(Debug, Clone)]
pub enum RecipePatch {
    /// Unassigned -> InProgress.
    Assign { reviewer: ReviewerId },
    /// InProgress -> Approved | Rejected. The reviewer link is kept.
    Decide { verdict: Verdict },
    /// Rejected -> Unassigned with edits; clears the reviewer link.
    Resubmit {
        vegan: bool,
        ingredients: BTreeSet<IngredientId>,
    },
}

impl Record for Recipe {
    type Marker = ids::Recipe;
    type Draft = RecipeDraft;
    type Patch = RecipePatch;

    const COLLECTION: CollectionName = CollectionName::Recipes;

    fn id(&self) -> RecipeId {
        self.id
    }

    fn from_draft(id: RecipeId, draft: RecipeDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner: draft.owner,
            prices: PriceSheet::from(draft.price),
            vegan: draft.vegan,
            ingredients: draft.ingredients,
            reviewer: None,
            status: RecipeStatus::Unassigned,
            review_round: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: RecipePatch, now: DateTime<Utc>) {
        match patch {
            RecipePatch::Assign { reviewer } => {
                self.status = RecipeStatus::InProgress;
                self.reviewer = Some(reviewer);
            }
            RecipePatch::Decide { verdict } => {
                self.status = verdict.status();
            }
            RecipePatch::Resubmit { vegan, ingredients } => {
                self.vegan = vegan;
                self.ingredients = ingredients;
                self.reviewer = None;
                self.status = RecipeStatus::Unassigned;
                self.review_round += 1;
            }
        }
        self.updated_at = now;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            Self::STATUS => Some(FieldValue::text(self.status.as_str())),
            Self::OWNER => Some(FieldValue::id(self.owner)),
            Self::REVIEWER => self.reviewer.map(FieldValue::id),
            Self::CREATED_AT => Some(FieldValue::Time(self.created_at)),
            "vegan" => Some(FieldValue::Bool(self.vegan)),
            "review_round" => Some(FieldValue::Count(u64::from(self.review_round))),
            _ => None,
        }
    }
}

/// Identifies one verdict on one review round of one recipe.
///
/// A submitter's stats are incremented at most once per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecisionKey {
    pub recipe: RecipeId,
    pub round: u32,
    pub verdict: Verdict,
}
