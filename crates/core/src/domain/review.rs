use serde::{Deserialize, Serialize};

/// A reviewer verdict extracted from free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub rating: u8,
    pub feedback: String,
    /// True when no rating could be read and the default was used
    pub rating_defaulted: bool,
    /// True when no feedback marker was present and the generic critique was used
    pub feedback_defaulted: bool,
}

impl Review {
    /// A review where both fields were read from the response.
    pub fn parsed(rating: u8, feedback: impl Into<String>) -> Self {
        Self {
            rating,
            feedback: feedback.into(),
            rating_defaulted: false,
            feedback_defaulted: false,
        }
    }
}

/// Why a script was accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalReason {
    /// The rating met the threshold
    Quality,
    /// The iteration cap was reached regardless of rating
    IterationCap,
}

impl ApprovalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::IterationCap => "iteration_cap",
        }
    }
}

/// Output of the revision gate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum GateDecision {
    NeedsRevision,
    Approved(ApprovalReason),
}

impl GateDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsRevision => "needs_revision",
            Self::Approved(_) => "approved",
        }
    }
}
