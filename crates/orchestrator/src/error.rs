use studio_core::{CollaboratorError, CoreError, ProductionState, StepKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Step {step} failed for topic '{topic}' at iteration {iteration}: {source}")]
    StepFailed {
        step: StepKind,
        topic: String,
        iteration: u32,
        #[source]
        source: CollaboratorError,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Run ended without an approved script (last iteration {iteration})")]
    Incomplete { iteration: u32 },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PipelineError {
    /// Create a step failure carrying the topic and iteration of the
    /// state the step was working on.
    pub fn step_failed(step: StepKind, state: &ProductionState, source: CollaboratorError) -> Self {
        Self::StepFailed {
            step,
            topic: state.topic().to_string(),
            iteration: state.iteration,
            source,
        }
    }

    /// The step that failed, if this error came from a step.
    pub fn failed_step(&self) -> Option<StepKind> {
        match self {
            Self::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
