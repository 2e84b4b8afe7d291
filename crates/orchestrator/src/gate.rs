//! Revision gate: decides whether a reviewed script is accepted.

use serde::{Deserialize, Serialize};
use studio_core::{ApprovalReason, GateDecision};

use crate::error::{PipelineError, Result};

pub const DEFAULT_APPROVAL_THRESHOLD: u8 = 7;
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Threshold and cap for the revision loop.
///
/// [`RevisionPolicy::decide`] is a pure function of the policy and its two
/// arguments. A rating at or above the threshold approves on quality; failing
/// that, reaching the iteration cap approves regardless of rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionPolicy {
    pub approval_threshold: u8,
    pub max_iterations: u32,
}

impl Default for RevisionPolicy {
    fn default() -> Self {
        Self {
            approval_threshold: DEFAULT_APPROVAL_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl RevisionPolicy {
    pub fn new(approval_threshold: u8, max_iterations: u32) -> Result<Self> {
        let policy = Self {
            approval_threshold,
            max_iterations,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=10).contains(&self.approval_threshold) {
            return Err(PipelineError::Configuration(format!(
                "approval threshold must be within 1..=10, got {}",
                self.approval_threshold
            )));
        }
        if self.max_iterations == 0 {
            return Err(PipelineError::Configuration(
                "max iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn decide(&self, rating: u8, iteration: u32) -> GateDecision {
        if rating >= self.approval_threshold {
            GateDecision::Approved(ApprovalReason::Quality)
        } else if iteration >= self.max_iterations {
            GateDecision::Approved(ApprovalReason::IterationCap)
        } else {
            GateDecision::NeedsRevision
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_table() {
        let policy = RevisionPolicy::default();
        assert_eq!(
            policy.decide(7, 0),
            GateDecision::Approved(ApprovalReason::Quality)
        );
        assert_eq!(policy.decide(3, 0), GateDecision::NeedsRevision);
        assert_eq!(
            policy.decide(3, 3),
            GateDecision::Approved(ApprovalReason::IterationCap)
        );
        assert_eq!(
            policy.decide(10, 1),
            GateDecision::Approved(ApprovalReason::Quality)
        );
    }

    #[test]
    fn test_quality_takes_precedence_over_cap() {
        let policy = RevisionPolicy::default();
        assert_eq!(
            policy.decide(9, 5),
            GateDecision::Approved(ApprovalReason::Quality)
        );
    }

    #[test]
    fn test_decision_is_deterministic() {
        let policy = RevisionPolicy::default();
        for rating in 0..=10u8 {
            for iteration in 0..=5u32 {
                let first = policy.decide(rating, iteration);
                let second = policy.decide(rating, iteration);
                assert_eq!(first, second);

                let expected_approved = rating >= 7 || iteration >= 3;
                assert_eq!(first.is_approved(), expected_approved);
            }
        }
    }

    #[test]
    fn test_policy_validation() {
        assert!(RevisionPolicy::new(7, 3).is_ok());
        assert!(RevisionPolicy::new(0, 3).is_err());
        assert!(RevisionPolicy::new(11, 3).is_err());
        assert!(RevisionPolicy::new(7, 0).is_err());
    }
}
