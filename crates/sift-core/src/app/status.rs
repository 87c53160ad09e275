//! Status - レビュー状況の集計

use serde::{Deserialize, Serialize};

use crate::app::engine::WorkflowEngine;
use crate::domain::{RecipeStatus, WorkflowError};
use crate::ports::Filter;

/// Number of recipes in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCounts {
    pub unassigned: usize,
    pub in_progress: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ReviewCounts {
    pub fn add(&mut self, status: RecipeStatus) {
        match status {
            RecipeStatus::Unassigned => self.unassigned += 1,
            RecipeStatus::InProgress => self.in_progress += 1,
            RecipeStatus::Approved => self.approved += 1,
            RecipeStatus::Rejected => self.rejected += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.unassigned + self.in_progress + self.approved + self.rejected
    }
}

impl WorkflowEngine {
    pub async fn review_counts(&self) -> Result<ReviewCounts, WorkflowError> {
        let recipes = self.store.recipes().query(&Filter::all(), &[]).await?;
        let mut counts = ReviewCounts::default();
        for recipe in &recipes {
            counts.add(recipe.status());
        }
        Ok(counts)
    }
}
