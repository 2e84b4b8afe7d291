use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

use super::review::ApprovalReason;
use super::state::{ProductionState, ResearchSource};

/// Version of the exported result document.
pub const RESULT_SCHEMA_VERSION: u32 = 1;

/// One completed writer→reviewer cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub rating: u8,
    pub feedback: String,
    pub script: String,
    #[serde(default)]
    pub rating_defaulted: bool,
    #[serde(default)]
    pub feedback_defaulted: bool,
}

impl IterationRecord {
    /// Capture a reviewed state.
    pub fn from_state(state: &ProductionState) -> Self {
        let provenance = state.review_provenance.unwrap_or_default();
        Self {
            iteration: state.iteration,
            rating: state.rating,
            feedback: state.feedback.clone().unwrap_or_default(),
            script: state.script.clone(),
            rating_defaulted: provenance.rating_defaulted,
            feedback_defaulted: provenance.feedback_defaulted,
        }
    }
}

/// Final record of a terminated run, suitable for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionResult {
    pub schema_version: u32,
    pub run_id: Uuid,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub research: String,
    pub research_source: ResearchSource,
    pub script: String,
    pub rating: u8,
    pub feedback: String,
    pub iterations: u32,
    pub approval: ApprovalReason,
    pub all_iterations: Vec<IterationRecord>,
    pub model_used: String,
}

impl ProductionResult {
    pub fn new(
        final_state: &ProductionState,
        approval: ApprovalReason,
        history: Vec<IterationRecord>,
        model_used: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: RESULT_SCHEMA_VERSION,
            run_id: Uuid::new_v4(),
            topic: final_state.topic().to_string(),
            timestamp: Utc::now(),
            research: final_state.research_findings.clone(),
            research_source: final_state
                .research_source
                .unwrap_or(ResearchSource::Fallback),
            script: final_state.script.clone(),
            rating: final_state.rating,
            feedback: final_state.feedback.clone().unwrap_or_default(),
            iterations: final_state.iteration,
            approval,
            all_iterations: history,
            model_used: model_used.into(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// File name for the export document, derived from the run timestamp.
    pub fn export_file_name(&self) -> String {
        format!("production_{}.json", self.timestamp.format("%Y%m%d_%H%M%S"))
    }
}
