//! Acting identity passed into every engine operation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::WorkflowError;
use super::ids::{ReviewerId, SubmitterId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Submitter,
    Reviewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Submitter => f.write_str("submitter"),
            Role::Reviewer => f.write_str("reviewer"),
        }
    }
}

/// A verified (role, identity) pair, as resolved by an `IdentityProvider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Identity {
    Submitter(SubmitterId),
    Reviewer(ReviewerId),
}

impl Identity {
    pub fn role(&self) -> Role {
        match self {
            Identity::Submitter(_) => Role::Submitter,
            Identity::Reviewer(_) => Role::Reviewer,
        }
    }

    pub fn as_submitter(&self) -> Result<SubmitterId, WorkflowError> {
        match self {
            Identity::Submitter(id) => Ok(*id),
            other => Err(WorkflowError::Authorization(format!(
                "{} cannot act as a submitter",
                other.role()
            ))),
        }
    }

    pub fn as_reviewer(&self) -> Result<ReviewerId, WorkflowError> {
        match self {
            Identity::Reviewer(id) => Ok(*id),
            other => Err(WorkflowError::Authorization(format!(
                "{} cannot act as a reviewer",
                other.role()
            ))),
        }
    }
}

impl From<SubmitterId> for Identity {
    fn from(id: SubmitterId) -> Self {
        Identity::Submitter(id)
    }
}

impl From<ReviewerId> for Identity {
    fn from(id: ReviewerId) -> Self {
        Identity::Reviewer(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use ulid::Ulid;

    #[test]
    fn role_guards() {
        let submitter = SubmitterId::from_ulid(Ulid::new());
        let identity = Identity::from(submitter);

        assert_eq!(identity.role(), Role::Submitter);
        assert_eq!(identity.as_submitter().unwrap(), submitter);
        assert_eq!(
            identity.as_reviewer().unwrap_err().kind(),
            ErrorKind::Authorization
        );
    }

    #[test]
    fn identity_serializes_role_and_id() {
        let ulid = Ulid::new();
        let identity = Identity::Reviewer(ReviewerId::from_ulid(ulid));
        let v = serde_json::to_value(identity).unwrap();
        assert_eq!(v["role"], "reviewer");
        assert_eq!(v["id"], ulid.to_string());
    }
}
