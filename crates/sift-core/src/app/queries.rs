//! Recipe lookups by status.
//!
//! The store filters on one status; narrowing to a linked submitter or
//! reviewer happens here. That second step scans every recipe with the
//! status, so its cost grows with the number of such recipes, not with the
//! size of the result.

use crate::domain::{
    FieldValue, Recipe, RecipeStatus, ReviewerId, SubmitterId, WorkflowError,
};
use crate::ports::{Filter, RecordStore, SortKey};

/// The account a recipe is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Owner(SubmitterId),
    Reviewer(ReviewerId),
}

impl Link {
    fn matches(self, recipe: &Recipe) -> bool {
        match self {
            Link::Owner(submitter) => recipe.owner() == submitter,
            Link::Reviewer(reviewer) => recipe.is_reviewed_by(reviewer),
        }
    }
}

pub struct RecipeQueries<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> RecipeQueries<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// All recipes with `status`, oldest submission first.
    pub async fn with_status(&self, status: RecipeStatus) -> Result<Vec<Recipe>, WorkflowError> {
        let filter = Filter::eq(Recipe::STATUS, FieldValue::text(status.as_str()));
        let recipes = self
            .store
            .recipes()
            .query(&filter, &[SortKey::asc(Recipe::CREATED_AT)])
            .await?;
        Ok(recipes)
    }

    /// Recipes with `status` linked to `link`, oldest submission first.
    pub async fn with_status_linked(
        &self,
        status: RecipeStatus,
        link: Link,
    ) -> Result<Vec<Recipe>, WorkflowError> {
        let mut recipes = self.with_status(status).await?;
        recipes.retain(|recipe| link.matches(recipe));
        Ok(recipes)
    }

    /// Every recipe owned by `submitter`, whatever its status.
    pub async fn owned_by(&self, submitter: SubmitterId) -> Result<Vec<Recipe>, WorkflowError> {
        let filter = Filter::eq(Recipe::OWNER, FieldValue::id(submitter));
        let recipes = self
            .store
            .recipes()
            .query(&filter, &[SortKey::asc(Recipe::CREATED_AT)])
            .await?;
        Ok(recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Price, Profile, RecipeDraft, RecipePatch, Verdict};
    use crate::impls::InMemoryRecordStore;
    use crate::ports::FixedClock;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use ulid::Ulid;

    async fn seeded() -> (InMemoryRecordStore, SubmitterId, SubmitterId, ReviewerId) {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let store = InMemoryRecordStore::with_clock(Arc::new(FixedClock::stepping(
            start,
            Duration::seconds(1),
        )));
        let alice = store
            .submitters()
            .create(Profile::new("Alice", "A", "alice@example.com").unwrap())
            .await
            .unwrap()
            .id();
        let bob = store
            .submitters()
            .create(Profile::new("Bob", "B", "bob@example.com").unwrap())
            .await
            .unwrap()
            .id();
        let reviewer = ReviewerId::from_ulid(Ulid::new());

        for owner in [alice, bob, alice] {
            store
                .recipes()
                .create(RecipeDraft {
                    owner,
                    price: Price::new(3.0).unwrap(),
                    vegan: true,
                    ingredients: BTreeSet::new(),
                })
                .await
                .unwrap();
        }
        (store, alice, bob, reviewer)
    }

    #[tokio::test]
    async fn linked_query_narrows_to_owner() {
        let (store, alice, bob, _) = seeded().await;
        let queries = RecipeQueries::new(&store);

        let all = queries.with_status(RecipeStatus::Unassigned).await.unwrap();
        assert_eq!(all.len(), 3);

        let alices = queries
            .with_status_linked(RecipeStatus::Unassigned, Link::Owner(alice))
            .await
            .unwrap();
        assert_eq!(alices.len(), 2);
        assert!(alices.iter().all(|r| r.owner() == alice));
        assert!(alices[0].created_at() < alices[1].created_at());

        let bobs = queries
            .with_status_linked(RecipeStatus::Rejected, Link::Owner(bob))
            .await
            .unwrap();
        assert!(bobs.is_empty());
    }

    #[tokio::test]
    async fn linked_query_by_reviewer() {
        let (store, alice, _, reviewer) = seeded().await;
        let queries = RecipeQueries::new(&store);
        let first = queries.owned_by(alice).await.unwrap()[0].id();
        store
            .recipes()
            .update(first, RecipePatch::Assign { reviewer })
            .await
            .unwrap();
        store
            .recipes()
            .update(first, RecipePatch::Decide { verdict: Verdict::Rejected })
            .await
            .unwrap();

        let reviewed = queries
            .with_status_linked(RecipeStatus::Rejected, Link::Reviewer(reviewer))
            .await
            .unwrap();
        assert_eq!(reviewed.len(), 1);
        assert_eq!(reviewed[0].id(), first);

        let other = ReviewerId::from_ulid(Ulid::new());
        assert!(
            queries
                .with_status_linked(RecipeStatus::Rejected, Link::Reviewer(other))
                .await
                .unwrap()
                .is_empty()
        );
    }
}
