//! Errors - エラー型と分類
//!
//! Every engine operation returns `Result<_, WorkflowError>`. Each variant is
//! a recoverable outcome for the caller; none of them indicates a bug.

use thiserror::Error;

use super::state::{IllegalTransition, RecipeStatus};

/// ErrorKind は呼び出し側向けの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Reference,
    Conflict,
    Authorization,
    InvalidState,
    NotFound,
    StoreUnavailable,
}

/// Which exclusivity rule (or lock) refused the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The submitter owns a rejected recipe; it must be resubmitted first.
    RejectedRecipePending,
    /// The reviewer already holds a recipe in progress.
    ReviewerBusy,
    /// The verdict for this review round was already recorded.
    AlreadyDecided,
    /// An account with this email already exists for the role.
    DuplicateEmail,
    /// The lock guarding the operation was not acquired in time.
    LockTimeout,
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConflictReason::RejectedRecipePending => "resolve rejected recipe first",
            ConflictReason::ReviewerBusy => "reviewer already has a recipe in progress",
            ConflictReason::AlreadyDecided => "recipe has already been decided",
            ConflictReason::DuplicateEmail => "an account with this email already exists",
            ConflictReason::LockTimeout => "timed out waiting for a conflicting operation",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unresolved reference: {0}")]
    Reference(String),

    #[error("conflict: {0}")]
    Conflict(ConflictReason),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("cannot move recipe from {current} to {requested}")]
    InvalidState {
        current: RecipeStatus,
        requested: RecipeStatus,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Validation(_) => ErrorKind::Validation,
            WorkflowError::Reference(_) => ErrorKind::Reference,
            WorkflowError::Conflict(_) => ErrorKind::Conflict,
            WorkflowError::Authorization(_) => ErrorKind::Authorization,
            WorkflowError::InvalidState { .. } => ErrorKind::InvalidState,
            WorkflowError::NotFound(_) => ErrorKind::NotFound,
            WorkflowError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }

    /// Could the same call succeed if simply repeated later?
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkflowError::Conflict(ConflictReason::LockTimeout) | WorkflowError::StoreUnavailable(_)
        )
    }
}

impl From<IllegalTransition> for WorkflowError {
    fn from(err: IllegalTransition) -> Self {
        WorkflowError::InvalidState {
            current: err.from,
            requested: err.requested,
        }
    }
}
