use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

use super::review::Review;

/// The three fixed roles of the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StepKind {
    #[serde(rename = "researcher")]
    Researcher,
    #[serde(rename = "writing_team")]
    Writer,
    #[serde(rename = "review_team")]
    Reviewer,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Researcher => "researcher",
            Self::Writer => "writing_team",
            Self::Reviewer => "review_team",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the research text came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResearchSource {
    /// Built from retrieval results
    Retrieved,
    /// Canned summary used because retrieval failed
    Fallback,
}

impl ResearchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieved => "retrieved",
            Self::Fallback => "fallback",
        }
    }
}

/// Which parts of the latest review were substituted with defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewProvenance {
    pub rating_defaulted: bool,
    pub feedback_defaulted: bool,
}

impl ReviewProvenance {
    pub fn is_degraded(&self) -> bool {
        self.rating_defaulted || self.feedback_defaulted
    }
}

/// The record threaded through every step of one pipeline run.
///
/// Steps take a state by value and hand back a new one; the `with_*`
/// constructors are the only way fields change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionState {
    topic: String,
    pub research_findings: String,
    pub research_source: Option<ResearchSource>,
    pub script: String,
    /// 0 until the first review, then within 1..=10
    pub rating: u8,
    pub feedback: Option<String>,
    pub review_provenance: Option<ReviewProvenance>,
    /// Number of writer invocations so far
    pub iteration: u32,
}

impl ProductionState {
    /// Create the initial state for a run. The topic must contain
    /// something other than whitespace.
    pub fn new(topic: impl Into<String>) -> Result<Self> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(CoreError::Validation("topic must not be empty".to_string()));
        }

        Ok(Self {
            topic,
            research_findings: String::new(),
            research_source: None,
            script: String::new(),
            rating: 0,
            feedback: None,
            review_provenance: None,
            iteration: 0,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Feedback to hand to the next writer run, if this is a revision.
    pub fn pending_feedback(&self) -> Option<&str> {
        if self.iteration == 0 {
            return None;
        }
        self.feedback.as_deref().filter(|f| !f.trim().is_empty())
    }

    pub fn with_research(self, findings: String, source: ResearchSource) -> Self {
        Self {
            research_findings: findings,
            research_source: Some(source),
            ..self
        }
    }

    /// Store a new draft and count the writer invocation.
    pub fn with_script(self, script: String) -> Self {
        let iteration = self.iteration + 1;
        Self {
            script,
            iteration,
            ..self
        }
    }

    pub fn with_review(self, review: Review) -> Self {
        Self {
            rating: review.rating,
            feedback: Some(review.feedback),
            review_provenance: Some(ReviewProvenance {
                rating_defaulted: review.rating_defaulted,
                feedback_defaulted: review.feedback_defaulted,
            }),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = ProductionState::new("Space Exploration").unwrap();
        assert_eq!(state.topic(), "Space Exploration");
        assert!(state.research_findings.is_empty());
        assert!(state.script.is_empty());
        assert_eq!(state.rating, 0);
        assert!(state.feedback.is_none());
        assert_eq!(state.iteration, 0);
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert!(ProductionState::new("").is_err());
        assert!(ProductionState::new("   \n").is_err());
    }

    #[test]
    fn test_with_script_increments_iteration() {
        let mut state = ProductionState::new("Heist").unwrap();
        for n in 1..=5 {
            state = state.with_script(format!("draft {}", n));
            assert_eq!(state.iteration, n);
        }
        assert_eq!(state.script, "draft 5");
    }

    #[test]
    fn test_pending_feedback_only_on_revision() {
        let state = ProductionState::new("Heist").unwrap();
        assert_eq!(state.pending_feedback(), None);

        let state = state
            .with_script("draft".to_string())
            .with_review(Review::parsed(4, "Tighten the second act."));
        assert_eq!(state.pending_feedback(), Some("Tighten the second act."));

        let state = state
            .with_script("draft 2".to_string())
            .with_review(Review::parsed(5, ""));
        assert_eq!(state.pending_feedback(), None);
    }

    #[test]
    fn test_with_review_records_provenance() {
        let state = ProductionState::new("Heist")
            .unwrap()
            .with_script("draft".to_string())
            .with_review(Review {
                rating: 7,
                feedback: "fine".to_string(),
                rating_defaulted: true,
                feedback_defaulted: false,
            });
        let provenance = state.review_provenance.unwrap();
        assert!(provenance.rating_defaulted);
        assert!(!provenance.feedback_defaulted);
        assert!(provenance.is_degraded());
    }

    #[test]
    fn test_step_kind_serializes_as_display_name() {
        for kind in [StepKind::Researcher, StepKind::Writer, StepKind::Reviewer] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
            let back: StepKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
        assert!(serde_json::from_str::<StepKind>("\"writer\"").is_err());
    }
}
