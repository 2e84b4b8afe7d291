use studio_core::{
    ApprovalReason, GateDecision, IterationRecord, ProductionResult, ProductionState, StepKind,
};

use crate::error::{PipelineError, Result};
use crate::pipeline::StepSnapshot;

/// Observer that accumulates the per-iteration history of a run.
///
/// Feed it every snapshot in order. If the run aborts, the last completed
/// state and the history so far remain available for inspection.
#[derive(Debug, Clone)]
pub struct RunRecorder {
    model_name: String,
    history: Vec<IterationRecord>,
    last_state: Option<ProductionState>,
    approval: Option<ApprovalReason>,
}

impl RunRecorder {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            history: Vec::new(),
            last_state: None,
            approval: None,
        }
    }

    pub fn observe(&mut self, snapshot: &StepSnapshot) {
        if snapshot.step == StepKind::Reviewer {
            self.history
                .push(IterationRecord::from_state(&snapshot.state));
        }
        if let Some(GateDecision::Approved(reason)) = snapshot.decision {
            self.approval = Some(reason);
        }
        self.last_state = Some(snapshot.state.clone());
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    pub fn last_state(&self) -> Option<&ProductionState> {
        self.last_state.as_ref()
    }

    pub fn approval(&self) -> Option<ApprovalReason> {
        self.approval
    }

    /// Build the result record. Fails if no approving review was observed.
    pub fn finish(self) -> Result<ProductionResult> {
        let iteration = self.last_state.as_ref().map(|s| s.iteration).unwrap_or(0);
        match (self.last_state, self.approval) {
            (Some(state), Some(approval)) => Ok(ProductionResult::new(
                &state,
                approval,
                self.history,
                self.model_name,
            )),
            _ => Err(PipelineError::Incomplete { iteration }),
        }
    }
}
