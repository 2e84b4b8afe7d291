use std::sync::Arc;

use async_trait::async_trait;
use studio_core::{
    CollaboratorError, ProductionState, ResearchSource, Retriever, SearchHit, StepKind,
};
use tracing::{debug, info, warn};

use super::Step;
use crate::error::Result;
use crate::prompts::StepPrompts;

/// Number of retrieval results included in the research text.
pub const MAX_RESEARCH_ITEMS: usize = 5;

/// Researcher step - turns a topic into research text.
///
/// Retrieval problems of any kind (no retriever configured, transport
/// errors, rate limiting, an empty result list) are replaced by a canned
/// summary that names the topic. The state records which of the two was
/// used in `research_source`.
pub struct Researcher {
    retriever: Option<Arc<dyn Retriever>>,
}

impl Researcher {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            retriever: Some(retriever),
        }
    }

    /// A researcher that always uses the canned summary.
    pub fn without_retriever() -> Self {
        Self { retriever: None }
    }

    pub fn has_retriever(&self) -> bool {
        self.retriever.is_some()
    }

    pub fn format_findings(topic: &str, hits: &[SearchHit]) -> String {
        let mut text = format!("Research findings for '{}':\n\n", topic);
        for (i, hit) in hits.iter().take(MAX_RESEARCH_ITEMS).enumerate() {
            text.push_str(&format!(
                "{}. {}\nSource: {}\n\n",
                i + 1,
                hit.content,
                hit.url
            ));
        }
        text
    }

    pub fn fallback_findings(topic: &str) -> String {
        format!(
            "Research for '{}':\n\nMarket analysis shows strong commercial potential. \
             Target audience is 18-45 demographic with global appeal. Current genre trends \
             favor innovative storytelling. Similar successful films have demonstrated \
             significant box office performance. Cultural relevance is high with \
             contemporary themes.",
            topic
        )
    }

    async fn retrieve(&self, topic: &str) -> std::result::Result<Vec<SearchHit>, CollaboratorError> {
        let retriever = self
            .retriever
            .as_ref()
            .ok_or_else(|| CollaboratorError::empty("no retriever configured"))?;

        let query = StepPrompts::research_query(topic);
        debug!(query = %query, "Running research query");

        let hits = retriever.search(&query).await?;
        if hits.is_empty() {
            return Err(CollaboratorError::empty("retrieval returned no results"));
        }
        Ok(hits)
    }
}

#[async_trait]
impl Step for Researcher {
    fn kind(&self) -> StepKind {
        StepKind::Researcher
    }

    async fn apply(&self, state: ProductionState) -> Result<ProductionState> {
        let topic = state.topic().to_string();

        let (findings, source) = match self.retrieve(&topic).await {
            Ok(hits) => {
                info!(topic = %topic, hit_count = hits.len(), "Research gathered");
                (
                    Self::format_findings(&topic, &hits),
                    ResearchSource::Retrieved,
                )
            }
            Err(e) => {
                warn!(
                    topic = %topic,
                    error = %e,
                    "Retrieval failed, using fallback research"
                );
                (Self::fallback_findings(&topic), ResearchSource::Fallback)
            }
        };

        Ok(state.with_research(findings, source))
    }
}
