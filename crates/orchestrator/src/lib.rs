//! Research → write → review pipeline with a bounded revision loop.

pub mod error;
pub mod gate;
pub mod graph;
pub mod pipeline;
pub mod prompts;
pub mod recorder;
pub mod review_parser;
pub mod steps;

pub use error::{PipelineError, Result};
pub use gate::{RevisionPolicy, DEFAULT_APPROVAL_THRESHOLD, DEFAULT_MAX_ITERATIONS};
pub use graph::workflow_graph;
pub use pipeline::{Pipeline, PipelineBuilder, SnapshotStream, StepSnapshot};
pub use recorder::RunRecorder;
pub use review_parser::{ReviewParser, DEFAULT_FEEDBACK, DEFAULT_RATING};
