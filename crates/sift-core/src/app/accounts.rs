//! Account registration and lookup.
//!
//! Email uniqueness is per role and is checked under a lock on the address.

use crate::app::engine::WorkflowEngine;
use crate::app::locks::{LockGuard, LockKey, LockScope};
use crate::domain::account::normalize_email;
use crate::domain::{
    ConflictReason, FieldValue, Profile, Reviewer, ReviewerId, Role, Submitter, SubmitterId,
    WorkflowError,
};
use crate::ports::Filter;

impl WorkflowEngine {
    pub async fn register_submitter(&self, profile: Profile) -> Result<Submitter, WorkflowError> {
        let _lock = self.email_lock(Role::Submitter, &profile.email).await?;
        if self.find_submitter_by_email(&profile.email).await?.is_some() {
            tracing::warn!(email = %profile.email, "submitter registration refused");
            return Err(WorkflowError::Conflict(ConflictReason::DuplicateEmail));
        }
        let submitter = self.store.submitters().create(profile).await?;
        tracing::info!(submitter = %submitter.id(), "submitter registered");
        Ok(submitter)
    }

    pub async fn register_reviewer(&self, profile: Profile) -> Result<Reviewer, WorkflowError> {
        let _lock = self.email_lock(Role::Reviewer, &profile.email).await?;
        if self.find_reviewer_by_email(&profile.email).await?.is_some() {
            tracing::warn!(email = %profile.email, "reviewer registration refused");
            return Err(WorkflowError::Conflict(ConflictReason::DuplicateEmail));
        }
        let reviewer = self.store.reviewers().create(profile).await?;
        tracing::info!(reviewer = %reviewer.id(), "reviewer registered");
        Ok(reviewer)
    }

    pub async fn find_submitter_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Submitter>, WorkflowError> {
        let filter = Filter::eq(Submitter::EMAIL, FieldValue::text(normalize_email(email)?));
        let found = self.store.submitters().query(&filter, &[]).await?;
        Ok(found.into_iter().next())
    }

    pub async fn find_reviewer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Reviewer>, WorkflowError> {
        let filter = Filter::eq(Reviewer::EMAIL, FieldValue::text(normalize_email(email)?));
        let found = self.store.reviewers().query(&filter, &[]).await?;
        Ok(found.into_iter().next())
    }

    pub async fn submitter(&self, id: SubmitterId) -> Result<Submitter, WorkflowError> {
        self.require_submitter(id).await
    }

    pub async fn reviewer(&self, id: ReviewerId) -> Result<Reviewer, WorkflowError> {
        self.require_reviewer(id).await
    }

    async fn email_lock(
        &self,
        role: Role,
        email: &str,
    ) -> Result<LockGuard, WorkflowError> {
        let key = LockKey::text(LockScope::Email, &format!("{role}:{email}"));
        self.locks.acquire(key).await
    }
}

#[cfg(test)]
mod tests {
    use crate::app::EngineBuilder;
    use crate::domain::{ErrorKind, Profile};
    use crate::impls::InMemoryRecordStore;
    use std::sync::Arc;

    fn engine() -> crate::app::WorkflowEngine {
        EngineBuilder::new()
            .store(Arc::new(InMemoryRecordStore::new()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict_within_role() {
        let engine = engine();
        engine
            .register_submitter(Profile::new("Ann", "Lee", "ann@example.com").unwrap())
            .await
            .unwrap();

        let err = engine
            .register_submitter(Profile::new("Ann", "Other", "ANN@example.com ").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // the same address may belong to a reviewer
        assert!(
            engine
                .register_reviewer(Profile::new("Ann", "Lee", "ann@example.com").unwrap())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn lookup_by_email_ignores_case() {
        let engine = engine();
        let reviewer = engine
            .register_reviewer(Profile::new("Ray", "Vu", "ray@example.com").unwrap())
            .await
            .unwrap();

        let found = engine
            .find_reviewer_by_email("Ray@Example.com")
            .await
            .unwrap();
        assert_eq!(found.map(|r| r.id()), Some(reviewer.id()));
        assert!(
            engine
                .find_submitter_by_email("ray@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn concurrent_registrations_keep_email_unique() {
        let engine = Arc::new(engine());
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let profile = Profile::new("Dup", &format!("N{i}"), "dup@example.com").unwrap();
                    engine.register_submitter(profile).await
                })
            })
            .collect();

        let mut registered = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                registered += 1;
            }
        }
        assert_eq!(registered, 1);
    }

    #[tokio::test]
    async fn malformed_email_is_validation_error() {
        let engine = engine();
        let err = engine.find_submitter_by_email("nobody").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
