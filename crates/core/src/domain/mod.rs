mod result;
mod review;
mod state;

pub use result::{IterationRecord, ProductionResult, RESULT_SCHEMA_VERSION};
pub use review::{ApprovalReason, GateDecision, Review};
pub use state::{ProductionState, ResearchSource, ReviewProvenance, StepKind};
