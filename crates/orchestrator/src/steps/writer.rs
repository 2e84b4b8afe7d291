use std::sync::Arc;

use async_trait::async_trait;
use studio_core::{Generator, ProductionState, StepKind};
use tracing::{debug, info};

use super::Step;
use crate::error::{PipelineError, Result};
use crate::prompts::StepPrompts;

/// Writer step - drafts the script, or revises it when the previous
/// review left feedback.
///
/// Every invocation increments the iteration counter by one. A failed
/// generation call is fatal for the run; there is no template fallback.
pub struct Writer {
    generator: Arc<dyn Generator>,
}

impl Writer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Build the prompt for the next draft of `state`.
    pub fn build_prompt(state: &ProductionState) -> String {
        match state.pending_feedback() {
            Some(feedback) => {
                StepPrompts::revision(state.topic(), &state.research_findings, feedback)
            }
            None => StepPrompts::first_draft(state.topic(), &state.research_findings),
        }
    }
}

#[async_trait]
impl Step for Writer {
    fn kind(&self) -> StepKind {
        StepKind::Writer
    }

    async fn apply(&self, state: ProductionState) -> Result<ProductionState> {
        let is_revision = state.pending_feedback().is_some();
        let prompt = Self::build_prompt(&state);

        debug!(
            topic = %state.topic(),
            iteration = state.iteration,
            is_revision,
            prompt_length = prompt.len(),
            "Building writer prompt"
        );

        let script = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| PipelineError::step_failed(StepKind::Writer, &state, e))?;

        let next = state.with_script(script);
        info!(
            topic = %next.topic(),
            iteration = next.iteration,
            is_revision,
            script_length = next.script.len(),
            "Script draft written"
        );

        Ok(next)
    }
}
