//! Submitter and reviewer accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::convert::Infallible;

use super::errors::WorkflowError;
use super::ids::{self, ReviewerId, SubmitterId};
use super::recipe::DecisionKey;
use super::record::{CollectionName, FieldValue, Record};
use super::state::Verdict;

/// Name and email shared by both account kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Profile {
    /// Trim the inputs and lowercase the email.
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<Self, WorkflowError> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(WorkflowError::Validation(
                "first and last name are required".to_string(),
            ));
        }
        let email = normalize_email(email)?;
        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email,
        })
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub(crate) fn normalize_email(email: &str) -> Result<String, WorkflowError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(WorkflowError::Validation(format!(
            "malformed email address {email:?}"
        ))),
    }
}

/// A recipe author. Stats change only through verdicts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submitter {
    id: SubmitterId,
    #[serde(flatten)]
    profile: Profile,
    approved_count: u64,
    rejected_count: u64,

    /// Verdicts already counted, so a retried decision is not counted twice.
    #[serde(skip)]
    tallied: BTreeSet<DecisionKey>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Submitter {
    pub const EMAIL: &'static str = "email";

    pub fn id(&self) -> SubmitterId {
        self.id
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn approved_count(&self) -> u64 {
        self.approved_count
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected_count
    }

    pub fn has_tallied(&self, key: &DecisionKey) -> bool {
        self.tallied.contains(key)
    }

    pub fn stats(&self) -> SubmitterStats {
        SubmitterStats {
            approved: self.approved_count,
            rejected: self.rejected_count,
        }
    }
}

/// Approval and rejection totals of a submitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmitterStats {
    pub approved: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone)]
pub enum SubmitterPatch {
    /// Count a verdict once; a key seen before leaves the record unchanged.
    Tally(DecisionKey),
}

impl Record for Submitter {
    type Marker = ids::Submitter;
    type Draft = Profile;
    type Patch = SubmitterPatch;

    const COLLECTION: CollectionName = CollectionName::Submitters;

    fn id(&self) -> SubmitterId {
        self.id
    }

    fn from_draft(id: SubmitterId, profile: Profile, now: DateTime<Utc>) -> Self {
        Self {
            id,
            profile,
            approved_count: 0,
            rejected_count: 0,
            tallied: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: SubmitterPatch, now: DateTime<Utc>) {
        match patch {
            SubmitterPatch::Tally(key) => {
                if !self.tallied.insert(key) {
                    return;
                }
                match key.verdict {
                    Verdict::Approved => self.approved_count += 1,
                    Verdict::Rejected => self.rejected_count += 1,
                }
            }
        }
        self.updated_at = now;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            Self::EMAIL => Some(FieldValue::text(&self.profile.email)),
            "approved_count" => Some(FieldValue::Count(self.approved_count)),
            "rejected_count" => Some(FieldValue::Count(self.rejected_count)),
            _ => None,
        }
    }
}

/// A reviewer account. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reviewer {
    id: ReviewerId,
    #[serde(flatten)]
    profile: Profile,
    created_at: DateTime<Utc>,
}

impl Reviewer {
    pub const EMAIL: &'static str = "email";

    pub fn id(&self) -> ReviewerId {
        self.id
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}

impl Record for Reviewer {
    type Marker = ids::Reviewer;
    type Draft = Profile;
    type Patch = Infallible;

    const COLLECTION: CollectionName = CollectionName::Reviewers;

    fn id(&self) -> ReviewerId {
        self.id
    }

    fn from_draft(id: ReviewerId, profile: Profile, now: DateTime<Utc>) -> Self {
        Self {
            id,
            profile,
            created_at: now,
        }
    }

    fn apply(&mut self, patch: Infallible, _now: DateTime<Utc>) {
        match patch {}
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            Self::EMAIL => Some(FieldValue::text(&self.profile.email)),
            _ => None,
        }
    }
}
