//! Recipe lifecycle state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recipe status.
///
/// State transitions:
/// - Unassigned -> InProgress (assign)
/// - InProgress -> Approved | Rejected (decide)
/// - Rejected -> Unassigned (resubmit)
///
/// `Approved` is terminal. Serialized with the names the record store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecipeStatus {
    Unassigned,
    InProgress,
    Approved,
    Rejected,
}

impl RecipeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecipeStatus::Unassigned => "unassigned",
            RecipeStatus::InProgress => "inProgress",
            RecipeStatus::Approved => "approved",
            RecipeStatus::Rejected => "rejected",
        }
    }

    /// Has a reviewer made a decision on the current round?
    pub fn is_terminal(self) -> bool {
        matches!(self, RecipeStatus::Approved | RecipeStatus::Rejected)
    }

    /// Must a reviewer be linked in this status?
    pub fn requires_reviewer(self) -> bool {
        !matches!(self, RecipeStatus::Unassigned)
    }

    /// Apply a transition, returning the resulting status.
    pub fn apply(self, transition: Transition) -> Result<RecipeStatus, IllegalTransition> {
        let next = match (self, transition) {
            (RecipeStatus::Unassigned, Transition::Assign) => RecipeStatus::InProgress,
            (RecipeStatus::InProgress, Transition::Decide(verdict)) => verdict.status(),
            (RecipeStatus::Rejected, Transition::Resubmit) => RecipeStatus::Unassigned,
            (from, transition) => {
                return Err(IllegalTransition {
                    from,
                    requested: transition.target(),
                });
            }
        };
        Ok(next)
    }
}

impl fmt::Display for RecipeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer outcome for a recipe in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    pub fn status(self) -> RecipeStatus {
        match self {
            Verdict::Approved => RecipeStatus::Approved,
            Verdict::Rejected => RecipeStatus::Rejected,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.status().fmt(f)
    }
}

/// A requested lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Assign,
    Decide(Verdict),
    Resubmit,
}

impl Transition {
    /// Status the transition would lead to if it were legal.
    pub fn target(self) -> RecipeStatus {
        match self {
            Transition::Assign => RecipeStatus::InProgress,
            Transition::Decide(verdict) => verdict.status(),
            Transition::Resubmit => RecipeStatus::Unassigned,
        }
    }
}

/// A transition attempted from a status that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IllegalTransition {
    pub from: RecipeStatus,
    pub requested: RecipeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::assign(RecipeStatus::Unassigned, Transition::Assign, RecipeStatus::InProgress)]
    #[case::approve(
        RecipeStatus::InProgress,
        Transition::Decide(Verdict::Approved),
        RecipeStatus::Approved
    )]
    #[case::reject(
        RecipeStatus::InProgress,
        Transition::Decide(Verdict::Rejected),
        RecipeStatus::Rejected
    )]
    #[case::resubmit(RecipeStatus::Rejected, Transition::Resubmit, RecipeStatus::Unassigned)]
    fn legal_transitions(
        #[case] from: RecipeStatus,
        #[case] transition: Transition,
        #[case] expected: RecipeStatus,
    ) {
        assert_eq!(from.apply(transition), Ok(expected));
    }

    #[rstest]
    #[case::assign_in_progress(RecipeStatus::InProgress, Transition::Assign)]
    #[case::assign_approved(RecipeStatus::Approved, Transition::Assign)]
    #[case::assign_rejected(RecipeStatus::Rejected, Transition::Assign)]
    #[case::decide_unassigned(RecipeStatus::Unassigned, Transition::Decide(Verdict::Approved))]
    #[case::decide_approved(RecipeStatus::Approved, Transition::Decide(Verdict::Rejected))]
    #[case::decide_rejected(RecipeStatus::Rejected, Transition::Decide(Verdict::Rejected))]
    #[case::resubmit_unassigned(RecipeStatus::Unassigned, Transition::Resubmit)]
    #[case::resubmit_in_progress(RecipeStatus::InProgress, Transition::Resubmit)]
    #[case::resubmit_approved(RecipeStatus::Approved, Transition::Resubmit)]
    fn illegal_transitions_name_both_states(
        #[case] from: RecipeStatus,
        #[case] transition: Transition,
    ) {
        let err = from.apply(transition).unwrap_err();
        assert_eq!(err.from, from);
        assert_eq!(err.requested, transition.target());
    }

    #[test]
    fn status_serializes_with_store_names() {
        let s = serde_json::to_string(&RecipeStatus::InProgress).unwrap();
        assert_eq!(s, "\"inProgress\"");
        assert_eq!(RecipeStatus::InProgress.as_str(), "inProgress");
    }

    #[test]
    fn only_decided_statuses_are_terminal() {
        assert!(RecipeStatus::Approved.is_terminal());
        assert!(RecipeStatus::Rejected.is_terminal());
        assert!(!RecipeStatus::Unassigned.is_terminal());
        assert!(!RecipeStatus::InProgress.is_terminal());
    }
}
