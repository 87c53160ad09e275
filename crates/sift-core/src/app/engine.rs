//! WorkflowEngine - レシピのレビューワークフロー
//!
//! Submit, Assign, Decide and Resubmit are check-then-act sequences over a
//! store without multi-record transactions. Each one runs under the lock of
//! the identifier it contends on:
//!
//! | operation | locks (in order)         | invariant checked                  |
//! |-----------|--------------------------|------------------------------------|
//! | submit    | submitter                | submitter owns no rejected recipe  |
//! | assign    | reviewer, recipe         | reviewer has nothing in progress   |
//! | decide    | owning submitter, recipe | stats counted once per verdict     |
//! | resubmit  | submitter, recipe        | only the owner, only from rejected |
//!
//! Reads outside these operations take no locks.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::app::config::EngineConfig;
use crate::app::locks::{LockGuard, LockKey, LockScope, LockTable};
use crate::app::queries::{Link, RecipeQueries};
use crate::domain::{
    ConflictReason, DecisionKey, Id, IdMarker, Identity, IngredientId, Price, Recipe,
    RecipeDraft, RecipeId, RecipePatch, RecipeStatus, Reviewer, ReviewerId, Submitter,
    SubmitterId, SubmitterPatch, Transition, Verdict, WorkflowError,
};
use crate::ports::RecordStore;

/// Input of a new submission, as entered by the submitter.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Unparsed price text; must be a positive number.
    pub price: String,
    pub vegan: bool,
    pub ingredients: Vec<IngredientId>,
}

/// Edits applied to a rejected recipe when it is sent back for review.
#[derive(Debug, Clone)]
pub struct Revision {
    pub vegan: bool,
    pub ingredients: Vec<IngredientId>,
}

/// A state-changing request, for callers that dispatch on the acting identity.
#[derive(Debug, Clone)]
pub enum Command {
    Submit(Submission),
    Assign { recipe: RecipeId },
    Decide { recipe: RecipeId, verdict: Verdict },
    Resubmit { recipe: RecipeId, revision: Revision },
}

pub struct WorkflowEngine {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) locks: LockTable,
    config: EngineConfig,
}

impl WorkflowEngine {
    pub(crate) fn new(store: Arc<dyn RecordStore>, config: EngineConfig) -> Self {
        Self {
            store,
            locks: LockTable::new(config.lock_timeout),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn queries(&self) -> RecipeQueries<'_> {
        RecipeQueries::new(self.store.as_ref())
    }

    /// Run `command` on behalf of `identity`, checking the role first.
    pub async fn execute(
        &self,
        identity: &Identity,
        command: Command,
    ) -> Result<Recipe, WorkflowError> {
        match command {
            Command::Submit(submission) => self.submit(identity.as_submitter()?, submission).await,
            Command::Assign { recipe } => self.assign(recipe, identity.as_reviewer()?).await,
            Command::Decide { recipe, verdict } => {
                self.decide(recipe, identity.as_reviewer()?, verdict).await
            }
            Command::Resubmit { recipe, revision } => {
                self.resubmit(recipe, identity.as_submitter()?, revision)
                    .await
            }
        }
    }

    /// Create a new unassigned recipe owned by `submitter`.
    pub async fn submit(
        &self,
        submitter: SubmitterId,
        submission: Submission,
    ) -> Result<Recipe, WorkflowError> {
        let price = Price::parse(&submission.price)?;

        let _lock = self.lock(LockScope::Submitter, submitter).await?;
        self.require_submitter(submitter).await?;
        let ingredients = self.resolve_ingredients(&submission.ingredients).await?;

        let rejected = self
            .queries()
            .with_status_linked(RecipeStatus::Rejected, Link::Owner(submitter))
            .await?;
        if !rejected.is_empty() {
            tracing::warn!(%submitter, rejected = %rejected[0].id(), "submit refused");
            return Err(WorkflowError::Conflict(ConflictReason::RejectedRecipePending));
        }

        let recipe = self
            .store
            .recipes()
            .create(RecipeDraft {
                owner: submitter,
                price,
                vegan: submission.vegan,
                ingredients,
            })
            .await?;
        tracing::info!(recipe = %recipe.id(), %submitter, price = %price, "recipe submitted");
        Ok(recipe)
    }

    /// Hand an unassigned recipe to `reviewer`.
    ///
    /// Which recipe to pick is the caller's choice; see
    /// [`ReviewerDashboard::next_up`](crate::app::dashboard::ReviewerDashboard::next_up).
    pub async fn assign(
        &self,
        recipe_id: RecipeId,
        reviewer: ReviewerId,
    ) -> Result<Recipe, WorkflowError> {
        let _reviewer_lock = self.lock(LockScope::Reviewer, reviewer).await?;
        let _recipe_lock = self.lock(LockScope::Recipe, recipe_id).await?;

        self.require_reviewer(reviewer).await?;
        let recipe = self.require_recipe(recipe_id).await?;
        recipe.status().apply(Transition::Assign)?;

        let in_progress = self
            .queries()
            .with_status_linked(RecipeStatus::InProgress, Link::Reviewer(reviewer))
            .await?;
        if !in_progress.is_empty() {
            tracing::warn!(
                recipe = %recipe_id,
                %reviewer,
                holding = %in_progress[0].id(),
                "assign refused"
            );
            return Err(WorkflowError::Conflict(ConflictReason::ReviewerBusy));
        }

        let recipe = self
            .store
            .recipes()
            .update(recipe_id, RecipePatch::Assign { reviewer })
            .await?;
        tracing::info!(recipe = %recipe_id, %reviewer, "recipe assigned");
        Ok(recipe)
    }

    /// Record the reviewer's verdict and count it in the owner's stats.
    ///
    /// The status is written first and the stat increment last. If the
    /// increment fails, repeating the same call completes it; once counted,
    /// a repeat is refused with `AlreadyDecided`.
    pub async fn decide(
        &self,
        recipe_id: RecipeId,
        reviewer: ReviewerId,
        verdict: Verdict,
    ) -> Result<Recipe, WorkflowError> {
        // The owner never changes, so it is safe to read before locking.
        let owner = self.require_recipe(recipe_id).await?.owner();
        let _owner_lock = self.lock(LockScope::Submitter, owner).await?;
        let _recipe_lock = self.lock(LockScope::Recipe, recipe_id).await?;

        let recipe = self.require_recipe(recipe_id).await?;
        if recipe.status().is_terminal() {
            return self.complete_decision(recipe, reviewer, verdict).await;
        }

        if !recipe.is_reviewed_by(reviewer) {
            tracing::warn!(recipe = %recipe_id, %reviewer, "decide refused: not assigned");
            return Err(not_assigned(recipe_id, reviewer));
        }
        recipe.status().apply(Transition::Decide(verdict))?;

        let key = recipe.decision_key(verdict);
        let decided = self
            .store
            .recipes()
            .update(recipe_id, RecipePatch::Decide { verdict })
            .await?;
        self.tally(owner, key).await?;
        tracing::info!(recipe = %recipe_id, %reviewer, %verdict, submitter = %owner, "recipe decided");
        Ok(decided)
    }

    /// Decide on a recipe whose status already shows a verdict.
    async fn complete_decision(
        &self,
        recipe: Recipe,
        reviewer: ReviewerId,
        verdict: Verdict,
    ) -> Result<Recipe, WorkflowError> {
        if !recipe.is_reviewed_by(reviewer) {
            return Err(not_assigned(recipe.id(), reviewer));
        }
        if recipe.status() != verdict.status() {
            return Err(WorkflowError::InvalidState {
                current: recipe.status(),
                requested: verdict.status(),
            });
        }

        let key = recipe.decision_key(verdict);
        let owner = self.require_submitter(recipe.owner()).await?;
        if owner.has_tallied(&key) {
            tracing::warn!(recipe = %recipe.id(), %verdict, "decide refused: already decided");
            return Err(WorkflowError::Conflict(ConflictReason::AlreadyDecided));
        }

        tracing::warn!(
            recipe = %recipe.id(),
            %verdict,
            "completing stat update left over from an interrupted decision"
        );
        self.tally(owner.id(), key).await?;
        Ok(recipe)
    }

    /// Send a rejected recipe back to the queue with the owner's edits.
    pub async fn resubmit(
        &self,
        recipe_id: RecipeId,
        submitter: SubmitterId,
        revision: Revision,
    ) -> Result<Recipe, WorkflowError> {
        let _owner_lock = self.lock(LockScope::Submitter, submitter).await?;
        let _recipe_lock = self.lock(LockScope::Recipe, recipe_id).await?;

        let recipe = self.require_recipe(recipe_id).await?;
        if recipe.owner() != submitter {
            tracing::warn!(recipe = %recipe_id, %submitter, "resubmit refused: not the owner");
            return Err(WorkflowError::Authorization(format!(
                "{recipe_id} is not owned by {submitter}"
            )));
        }
        recipe.status().apply(Transition::Resubmit)?;
        let ingredients = self.resolve_ingredients(&revision.ingredients).await?;

        // Count a rejection whose stat write was interrupted before the round moves on.
        let rejection = recipe.decision_key(Verdict::Rejected);
        if !self.require_submitter(submitter).await?.has_tallied(&rejection) {
            tracing::warn!(
                recipe = %recipe_id,
                round = rejection.round,
                "completing stat update left over from an interrupted rejection"
            );
            self.tally(submitter, rejection).await?;
        }

        let recipe = self
            .store
            .recipes()
            .update(
                recipe_id,
                RecipePatch::Resubmit {
                    vegan: revision.vegan,
                    ingredients,
                },
            )
            .await?;
        tracing::info!(
            recipe = %recipe_id,
            %submitter,
            round = recipe.review_round(),
            "recipe resubmitted"
        );
        Ok(recipe)
    }

    pub async fn recipe(&self, recipe_id: RecipeId) -> Result<Recipe, WorkflowError> {
        self.require_recipe(recipe_id).await
    }

    async fn tally(&self, owner: SubmitterId, key: DecisionKey) -> Result<(), WorkflowError> {
        self.store
            .submitters()
            .update(owner, SubmitterPatch::Tally(key))
            .await?;
        Ok(())
    }

    async fn resolve_ingredients(
        &self,
        ids: &[IngredientId],
    ) -> Result<BTreeSet<IngredientId>, WorkflowError> {
        let mut resolved = BTreeSet::new();
        for &id in ids {
            if resolved.contains(&id) {
                continue;
            }
            if self.store.ingredients().get(id).await?.is_none() {
                return Err(WorkflowError::Reference(format!(
                    "ingredient {id} does not exist"
                )));
            }
            resolved.insert(id);
        }
        Ok(resolved)
    }

    pub(crate) async fn lock<T: IdMarker>(
        &self,
        scope: LockScope,
        id: Id<T>,
    ) -> Result<LockGuard, WorkflowError> {
        self.locks.acquire(LockKey::new(scope, id)).await
    }

    pub(crate) async fn require_recipe(&self, id: RecipeId) -> Result<Recipe, WorkflowError> {
        self.store
            .recipes()
            .get(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("recipe {id}")))
    }

    pub(crate) async fn require_submitter(
        &self,
        id: SubmitterId,
    ) -> Result<Submitter, WorkflowError> {
        self.store
            .submitters()
            .get(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("submitter {id}")))
    }

    pub(crate) async fn require_reviewer(&self, id: ReviewerId) -> Result<Reviewer, WorkflowError> {
        self.store
            .reviewers()
            .get(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("reviewer {id}")))
    }
}

fn not_assigned(recipe: RecipeId, reviewer: ReviewerId) -> WorkflowError {
    WorkflowError::Authorization(format!("{recipe} is not assigned to {reviewer}"))
}
