//! Ingredient catalog.

use crate::app::engine::WorkflowEngine;
use crate::domain::{Identity, Ingredient, IngredientDraft, WorkflowError};
use crate::ports::{Filter, SortKey};

impl WorkflowEngine {
    /// Add an ingredient to the catalog. Only reviewers may do this.
    pub async fn add_ingredient(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<Ingredient, WorkflowError> {
        let reviewer = identity.as_reviewer()?;
        let draft = IngredientDraft::new(name, reviewer)?;
        self.require_reviewer(reviewer).await?;

        let ingredient = self.store.ingredients().create(draft).await?;
        tracing::info!(
            ingredient = %ingredient.id(),
            name = ingredient.name(),
            %reviewer,
            "ingredient added"
        );
        Ok(ingredient)
    }

    /// The whole catalog, sorted by name.
    pub async fn ingredients(&self) -> Result<Vec<Ingredient>, WorkflowError> {
        let ingredients = self
            .store
            .ingredients()
            .query(&Filter::all(), &[SortKey::asc(Ingredient::NAME)])
            .await?;
        Ok(ingredients)
    }
}

#[cfg(test)]
mod tests {
    use crate::app::EngineBuilder;
    use crate::domain::{ErrorKind, Identity, Profile};
    use crate::impls::InMemoryRecordStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn reviewers_build_a_sorted_catalog() {
        let engine = EngineBuilder::new()
            .store(Arc::new(InMemoryRecordStore::new()))
            .build()
            .unwrap();
        let reviewer = engine
            .register_reviewer(Profile::new("Rae", "Kim", "rae@example.com").unwrap())
            .await
            .unwrap();
        let submitter = engine
            .register_submitter(Profile::new("Sol", "Park", "sol@example.com").unwrap())
            .await
            .unwrap();
        let as_reviewer = Identity::Reviewer(reviewer.id());

        for name in ["  sage ", "cumin", "anise"] {
            engine.add_ingredient(&as_reviewer, name).await.unwrap();
        }

        let err = engine
            .add_ingredient(&Identity::Submitter(submitter.id()), "salt")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let err = engine.add_ingredient(&as_reviewer, "   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let names: Vec<_> = engine
            .ingredients()
            .await
            .unwrap()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, vec!["anise", "cumin", "sage"]);
    }
}
