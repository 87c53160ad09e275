//! Dashboards - 画面ごとの読み取りビュー
//!
//! Reads take no locks; a view may be stale as soon as it is returned.

use serde::Serialize;

use crate::app::engine::WorkflowEngine;
use crate::app::queries::Link;
use crate::domain::{
    Ingredient, Recipe, RecipeStatus, ReviewerId, SubmitterId, SubmitterStats, WorkflowError,
};

#[derive(Debug, Clone, Serialize)]
pub struct SubmitterDashboard {
    pub submitter: SubmitterId,
    pub name: String,
    pub stats: SubmitterStats,
    pub rejected: Vec<Recipe>,
    /// False while a rejected recipe waits for resubmission.
    pub can_submit: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewerDashboard {
    pub reviewer: ReviewerId,
    pub name: String,
    pub in_progress: Option<Recipe>,
    /// Unassigned recipes, oldest first. Empty while `in_progress` is set.
    pub queue: Vec<Recipe>,
    pub ingredients: Vec<Ingredient>,
}

impl ReviewerDashboard {
    /// The recipe this reviewer should take next: the oldest unassigned one.
    pub fn next_up(&self) -> Option<&Recipe> {
        if self.in_progress.is_some() {
            return None;
        }
        self.queue.first()
    }
}

impl WorkflowEngine {
    pub async fn submitter_dashboard(
        &self,
        submitter: SubmitterId,
    ) -> Result<SubmitterDashboard, WorkflowError> {
        let account = self.require_submitter(submitter).await?;
        let rejected = self
            .queries()
            .with_status_linked(RecipeStatus::Rejected, Link::Owner(submitter))
            .await?;

        Ok(SubmitterDashboard {
            submitter,
            name: account.profile().display_name(),
            stats: account.stats(),
            can_submit: rejected.is_empty(),
            rejected,
        })
    }

    pub async fn reviewer_dashboard(
        &self,
        reviewer: ReviewerId,
    ) -> Result<ReviewerDashboard, WorkflowError> {
        let account = self.require_reviewer(reviewer).await?;
        let in_progress = self
            .queries()
            .with_status_linked(RecipeStatus::InProgress, Link::Reviewer(reviewer))
            .await?
            .into_iter()
            .next();
        let queue = match in_progress {
            Some(_) => Vec::new(),
            None => self.queries().with_status(RecipeStatus::Unassigned).await?,
        };

        Ok(ReviewerDashboard {
            reviewer,
            name: account.profile().display_name(),
            in_progress,
            queue,
            ingredients: self.ingredients().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::app::engine::Submission;
    use crate::app::EngineBuilder;
    use crate::domain::{Profile, Verdict};
    use crate::impls::InMemoryRecordStore;
    use crate::ports::FixedClock;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn submission() -> Submission {
        Submission {
            price: "12.5".to_string(),
            vegan: true,
            ingredients: vec![],
        }
    }

    #[tokio::test]
    async fn reviewer_queue_is_fifo_and_hidden_while_busy() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let store = InMemoryRecordStore::with_clock(Arc::new(FixedClock::stepping(
            start,
            Duration::seconds(5),
        )));
        let engine = EngineBuilder::new().store(Arc::new(store)).build().unwrap();
        let sub = engine
            .register_submitter(Profile::new("Uma", "Oz", "uma@example.com").unwrap())
            .await
            .unwrap()
            .id();
        let rev = engine
            .register_reviewer(Profile::new("Vic", "Lo", "vic@example.com").unwrap())
            .await
            .unwrap()
            .id();

        let first = engine.submit(sub, submission()).await.unwrap();
        let second = engine.submit(sub, submission()).await.unwrap();

        let board = engine.reviewer_dashboard(rev).await.unwrap();
        assert_eq!(board.name, "Vic Lo");
        let queued: Vec<_> = board.queue.iter().map(|r| r.id()).collect();
        assert_eq!(queued, vec![first.id(), second.id()]);
        assert_eq!(board.next_up().map(|r| r.id()), Some(first.id()));

        engine.assign(first.id(), rev).await.unwrap();
        let board = engine.reviewer_dashboard(rev).await.unwrap();
        assert_eq!(board.in_progress.as_ref().map(|r| r.id()), Some(first.id()));
        assert!(board.queue.is_empty());
        assert!(board.next_up().is_none());
    }

    #[tokio::test]
    async fn submitter_dashboard_blocks_after_rejection() {
        let engine = EngineBuilder::new()
            .store(Arc::new(InMemoryRecordStore::new()))
            .build()
            .unwrap();
        let sub = engine
            .register_submitter(Profile::new("Uma", "Oz", "uma@example.com").unwrap())
            .await
            .unwrap()
            .id();
        let rev = engine
            .register_reviewer(Profile::new("Vic", "Lo", "vic@example.com").unwrap())
            .await
            .unwrap()
            .id();
        let recipe = engine.submit(sub, submission()).await.unwrap();

        let board = engine.submitter_dashboard(sub).await.unwrap();
        assert!(board.can_submit);

        engine.assign(recipe.id(), rev).await.unwrap();
        engine
            .decide(recipe.id(), rev, Verdict::Rejected)
            .await
            .unwrap();

        let board = engine.submitter_dashboard(sub).await.unwrap();
        assert!(!board.can_submit);
        assert_eq!(board.stats.rejected, 1);
        assert_eq!(board.rejected.len(), 1);
        assert_eq!(board.rejected[0].id(), recipe.id());
    }
}
