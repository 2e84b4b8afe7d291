use std::sync::Arc;

use async_trait::async_trait;
use studio_core::{Generator, ProductionState, StepKind};
use tracing::{debug, info, warn};

use super::Step;
use crate::error::{PipelineError, Result};
use crate::prompts::StepPrompts;
use crate::review_parser::ReviewParser;

/// Reviewer step - rates the current script and writes feedback.
///
/// A response in the wrong format is recovered with defaults (see
/// [`ReviewParser`]); a failed generation call is fatal.
pub struct Reviewer {
    generator: Arc<dyn Generator>,
}

impl Reviewer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Step for Reviewer {
    fn kind(&self) -> StepKind {
        StepKind::Reviewer
    }

    async fn apply(&self, state: ProductionState) -> Result<ProductionState> {
        let prompt = StepPrompts::review(&state.script);
        debug!(
            topic = %state.topic(),
            iteration = state.iteration,
            prompt_length = prompt.len(),
            "Building review prompt"
        );

        let response = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| PipelineError::step_failed(StepKind::Reviewer, &state, e))?;

        let review = ReviewParser::parse(&response);
        if review.rating_defaulted || review.feedback_defaulted {
            warn!(
                topic = %state.topic(),
                iteration = state.iteration,
                rating_defaulted = review.rating_defaulted,
                feedback_defaulted = review.feedback_defaulted,
                "Review response was malformed, using defaults"
            );
        }

        info!(
            topic = %state.topic(),
            iteration = state.iteration,
            rating = review.rating,
            "Script reviewed"
        );

        Ok(state.with_review(review))
    }
}
