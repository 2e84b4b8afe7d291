//! The three fixed roles of the pipeline.
//!
//! Each role implements [`Step`]: it takes the current [`ProductionState`]
//! by value and returns the next one.
//!
//! - [`Researcher`] - gathers market research, never fails outward
//! - [`Writer`] - drafts or revises the script outline
//! - [`Reviewer`] - rates the script and writes feedback

mod researcher;
mod reviewer;
mod writer;

use async_trait::async_trait;
use studio_core::{ProductionState, StepKind};

use crate::error::Result;

pub use researcher::{Researcher, MAX_RESEARCH_ITEMS};
pub use reviewer::Reviewer;
pub use writer::Writer;

/// A single transformation of the production state.
#[async_trait]
pub trait Step: Send + Sync {
    /// Which role this step plays.
    fn kind(&self) -> StepKind;

    /// Consume the current state and produce the next one.
    async fn apply(&self, state: ProductionState) -> Result<ProductionState>;
}
