//! Pipeline driver.
//!
//! Runs the researcher once, then writer → reviewer → gate until the gate
//! approves. Progress is exposed as a pull-based stream of snapshots: the
//! next step does not start until the consumer asks for the next item, so
//! dropping the stream between items cancels the run without disturbing
//! the snapshots already received.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use studio_core::{
    GateDecision, Generator, ProductionResult, ProductionState, Retriever, StepKind,
};
use tracing::{debug, error, info};

use crate::error::{PipelineError, Result};
use crate::gate::RevisionPolicy;
use crate::recorder::RunRecorder;
use crate::steps::{Researcher, Reviewer, Step, Writer};

/// State observed after one step completed.
#[derive(Debug, Clone, Serialize)]
pub struct StepSnapshot {
    pub step: StepKind,
    pub state: ProductionState,
    /// Gate outcome; only present on reviewer snapshots
    pub decision: Option<GateDecision>,
}

impl StepSnapshot {
    /// Whether this snapshot ends the run.
    pub fn is_final(&self) -> bool {
        self.decision.map(|d| d.is_approved()).unwrap_or(false)
    }
}

/// Finite stream of snapshots for one run. Ends after the approving review
/// or after the first error.
pub type SnapshotStream = BoxStream<'static, Result<StepSnapshot>>;

#[derive(Clone)]
struct StepSet {
    researcher: Arc<Researcher>,
    writer: Arc<Writer>,
    reviewer: Arc<Reviewer>,
}

impl StepSet {
    fn get(&self, kind: StepKind) -> &dyn Step {
        match kind {
            StepKind::Researcher => self.researcher.as_ref(),
            StepKind::Writer => self.writer.as_ref(),
            StepKind::Reviewer => self.reviewer.as_ref(),
        }
    }
}

/// Position of the driver between steps.
enum Cursor {
    Next(StepKind, ProductionState),
    Finished,
}

pub struct Pipeline {
    steps: StepSet,
    policy: RevisionPolicy,
    model_name: String,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn policy(&self) -> RevisionPolicy {
        self.policy
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn has_retriever(&self) -> bool {
        self.steps.researcher.has_retriever()
    }

    /// Start a run for `topic`.
    ///
    /// The topic is validated here, before any step runs. Each call starts
    /// an independent run with its own state.
    pub fn run(&self, topic: impl Into<String>) -> Result<SnapshotStream> {
        let initial = ProductionState::new(topic)
            .map_err(|e| PipelineError::InvalidTopic(e.to_string()))?;

        info!(
            topic = %initial.topic(),
            model = %self.model_name,
            approval_threshold = self.policy.approval_threshold,
            max_iterations = self.policy.max_iterations,
            "Starting production run"
        );

        let steps = self.steps.clone();
        let policy = self.policy;
        let start = Cursor::Next(StepKind::Researcher, initial);

        let stream = stream::unfold(start, move |cursor| {
            let steps = steps.clone();
            async move {
                let (kind, state) = match cursor {
                    Cursor::Finished => return None,
                    Cursor::Next(kind, state) => (kind, state),
                };

                debug!(
                    step = %kind,
                    topic = %state.topic(),
                    iteration = state.iteration,
                    "Executing step"
                );

                match steps.get(kind).apply(state).await {
                    Ok(next) => {
                        let (decision, cursor) = Self::advance(kind, &next, policy);
                        let snapshot = StepSnapshot {
                            step: kind,
                            state: next,
                            decision,
                        };
                        Some((Ok(snapshot), cursor))
                    }
                    Err(e) => {
                        error!(step = %kind, error = %e, "Step failed, aborting run");
                        Some((Err(e), Cursor::Finished))
                    }
                }
            }
        });

        Ok(stream.boxed())
    }

    /// Decide where the driver goes after `kind` produced `state`.
    fn advance(
        kind: StepKind,
        state: &ProductionState,
        policy: RevisionPolicy,
    ) -> (Option<GateDecision>, Cursor) {
        match kind {
            StepKind::Researcher => (None, Cursor::Next(StepKind::Writer, state.clone())),
            StepKind::Writer => (None, Cursor::Next(StepKind::Reviewer, state.clone())),
            StepKind::Reviewer => {
                let decision = policy.decide(state.rating, state.iteration);
                match decision {
                    GateDecision::Approved(reason) => {
                        info!(
                            topic = %state.topic(),
                            iteration = state.iteration,
                            rating = state.rating,
                            reason = reason.as_str(),
                            "Script approved"
                        );
                        (Some(decision), Cursor::Finished)
                    }
                    GateDecision::NeedsRevision => {
                        info!(
                            topic = %state.topic(),
                            iteration = state.iteration,
                            rating = state.rating,
                            "Script needs revision"
                        );
                        (Some(decision), Cursor::Next(StepKind::Writer, state.clone()))
                    }
                }
            }
        }
    }

    /// Run to completion and build the result record.
    pub async fn execute(&self, topic: impl Into<String>) -> Result<ProductionResult> {
        let mut snapshots = self.run(topic)?;
        let mut recorder = RunRecorder::new(self.model_name.clone());

        while let Some(item) = snapshots.next().await {
            recorder.observe(&item?);
        }

        recorder.finish()
    }
}

/// Builder for [`Pipeline`]. Collaborators are passed in explicitly.
#[derive(Default)]
pub struct PipelineBuilder {
    generator: Option<Arc<dyn Generator>>,
    retriever: Option<Arc<dyn Retriever>>,
    policy: Option<RevisionPolicy>,
}

impl PipelineBuilder {
    /// Generator used by both the writer and the reviewer. Required.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Retriever for the researcher. Without one, research always uses
    /// the fallback summary.
    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn policy(mut self, policy: RevisionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let generator = self.generator.ok_or_else(|| {
            PipelineError::Configuration("a text generator is required".to_string())
        })?;

        let policy = self.policy.unwrap_or_default();
        policy.validate()?;

        let researcher = match self.retriever {
            Some(retriever) => Researcher::new(retriever),
            None => Researcher::without_retriever(),
        };

        Ok(Pipeline {
            model_name: generator.model_name().to_string(),
            steps: StepSet {
                researcher: Arc::new(researcher),
                writer: Arc::new(Writer::new(Arc::clone(&generator))),
                reviewer: Arc::new(Reviewer::new(generator)),
            },
            policy,
        })
    }
}
