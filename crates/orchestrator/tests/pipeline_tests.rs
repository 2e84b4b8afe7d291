use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use orchestrator::{Pipeline, PipelineError, RevisionPolicy, RunRecorder};
use studio_core::{
    ApprovalReason, CollaboratorError, CollaboratorErrorKind, GateDecision, Generator,
    ResearchSource, Retriever, SearchHit, StepKind,
};

const REVIEW_PROMPT_MARKER: &str = "RATING: [number]";

/// Generator that answers writer prompts with numbered drafts and review
/// prompts with a scripted sequence of ratings.
struct ScriptedGenerator {
    ratings: Mutex<VecDeque<u8>>,
    repeat_last: u8,
    writer_calls: AtomicUsize,
    reviewer_calls: AtomicUsize,
    writer_prompts: Mutex<Vec<String>>,
    fail_writer_on_call: Option<usize>,
}

impl ScriptedGenerator {
    fn always(rating: u8) -> Self {
        Self::sequence(&[], rating)
    }

    fn sequence(ratings: &[u8], then: u8) -> Self {
        Self {
            ratings: Mutex::new(ratings.iter().copied().collect()),
            repeat_last: then,
            writer_calls: AtomicUsize::new(0),
            reviewer_calls: AtomicUsize::new(0),
            writer_prompts: Mutex::new(Vec::new()),
            fail_writer_on_call: None,
        }
    }

    fn failing_writer_on(mut self, call: usize) -> Self {
        self.fail_writer_on_call = Some(call);
        self
    }

    fn writer_calls(&self) -> usize {
        self.writer_calls.load(Ordering::SeqCst)
    }

    fn reviewer_calls(&self) -> usize {
        self.reviewer_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        if prompt.contains(REVIEW_PROMPT_MARKER) {
            self.reviewer_calls.fetch_add(1, Ordering::SeqCst);
            let rating = self
                .ratings
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.repeat_last);
            return Ok(format!(
                "RATING: {}\nFEEDBACK: Feedback for rating {}.",
                rating, rating
            ));
        }

        let call = self.writer_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.writer_prompts.lock().unwrap().push(prompt.to_string());
        if self.fail_writer_on_call == Some(call) {
            return Err(CollaboratorError::transport("connection reset by peer"));
        }
        Ok(format!("Draft {}", call))
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

struct StaticRetriever;

#[async_trait]
impl Retriever for StaticRetriever {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollaboratorError> {
        assert!(query.starts_with("film industry trends and market analysis for "));
        Ok(vec![
            SearchHit::new("Space films grossed $2B last year", "https://news.example/1"),
            SearchHit::new("Audiences favor grounded sci-fi", "https://news.example/2"),
        ])
    }
}

struct BrokenRetriever;

#[async_trait]
impl Retriever for BrokenRetriever {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, CollaboratorError> {
        Err(CollaboratorError::new(
            CollaboratorErrorKind::Unauthorized,
            "invalid api key",
        ))
    }
}

fn pipeline(generator: Arc<ScriptedGenerator>) -> Pipeline {
    Pipeline::builder()
        .generator(generator)
        .retriever(Arc::new(StaticRetriever))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_approved_on_first_review() {
    let generator = Arc::new(ScriptedGenerator::always(8));
    let result = pipeline(generator.clone())
        .execute("Space Exploration")
        .await
        .unwrap();

    assert_eq!(generator.writer_calls(), 1);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.rating, 8);
    assert_eq!(result.approval, ApprovalReason::Quality);
    assert_eq!(result.script, "Draft 1");
    assert_eq!(result.topic, "Space Exploration");
    assert_eq!(result.model_used, "scripted-model");
    assert_eq!(result.research_source, ResearchSource::Retrieved);
    assert!(result.research.contains("Space films grossed $2B last year"));
    assert_eq!(result.all_iterations.len(), 1);
}

#[tokio::test]
async fn test_cap_reached_when_ratings_stay_low() {
    let generator = Arc::new(ScriptedGenerator::always(4));
    let result = pipeline(generator.clone())
        .execute("Space Exploration")
        .await
        .unwrap();

    assert_eq!(generator.writer_calls(), 3);
    assert_eq!(generator.reviewer_calls(), 3);
    assert_eq!(result.iterations, 3);
    assert_eq!(result.rating, 4);
    assert_eq!(result.approval, ApprovalReason::IterationCap);
    assert_eq!(result.script, "Draft 3");

    let iterations: Vec<u32> = result.all_iterations.iter().map(|r| r.iteration).collect();
    assert_eq!(iterations, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_revision_passes_feedback_to_writer() {
    let generator = Arc::new(ScriptedGenerator::sequence(&[5], 9));
    let result = pipeline(generator.clone()).execute("Heist").await.unwrap();

    assert_eq!(result.iterations, 2);
    assert_eq!(result.rating, 9);
    assert_eq!(result.all_iterations[0].rating, 5);
    assert_eq!(result.all_iterations[0].feedback, "Feedback for rating 5.");

    let prompts = generator.writer_prompts.lock().unwrap();
    assert!(!prompts[0].contains("FEEDBACK:"));
    assert!(prompts[1].contains("FEEDBACK: Feedback for rating 5."));
}

#[tokio::test]
async fn test_writer_runs_are_bounded_for_any_low_ratings() {
    let sequences: [&[u8]; 4] = [&[1, 1, 1, 1, 1], &[6, 6, 6, 6], &[2, 5, 3, 6], &[6, 1, 4, 2]];

    for ratings in sequences {
        let generator = Arc::new(ScriptedGenerator::sequence(ratings, 1));
        let result = pipeline(generator.clone()).execute("Noir").await.unwrap();

        assert!(generator.writer_calls() <= 4);
        assert_eq!(generator.writer_calls(), 3);
        assert_eq!(result.approval, ApprovalReason::IterationCap);
    }
}

#[tokio::test]
async fn test_snapshots_follow_step_order() {
    let generator = Arc::new(ScriptedGenerator::sequence(&[3], 7));
    let snapshots: Vec<_> = pipeline(generator)
        .run("Space Exploration")
        .unwrap()
        .map(|item| item.unwrap())
        .collect()
        .await;

    let steps: Vec<StepKind> = snapshots.iter().map(|s| s.step).collect();
    assert_eq!(
        steps,
        vec![
            StepKind::Researcher,
            StepKind::Writer,
            StepKind::Reviewer,
            StepKind::Writer,
            StepKind::Reviewer,
        ]
    );

    assert_eq!(snapshots[0].state.iteration, 0);
    assert!(snapshots[0].state.script.is_empty());
    assert_eq!(snapshots[1].state.iteration, 1);
    assert_eq!(snapshots[2].decision, Some(GateDecision::NeedsRevision));
    assert_eq!(snapshots[3].state.iteration, 2);
    assert_eq!(
        snapshots[4].decision,
        Some(GateDecision::Approved(ApprovalReason::Quality))
    );
    assert!(snapshots.iter().filter(|s| s.is_final()).count() == 1);
}

#[tokio::test]
async fn test_retrieval_failure_uses_fallback() {
    let generator = Arc::new(ScriptedGenerator::always(8));
    let pipeline = Pipeline::builder()
        .generator(generator)
        .retriever(Arc::new(BrokenRetriever))
        .build()
        .unwrap();

    let result = pipeline.execute("Space Exploration").await.unwrap();
    assert_eq!(result.research_source, ResearchSource::Fallback);
    assert!(!result.research.is_empty());
    assert!(result.research.contains("Space Exploration"));
}

#[tokio::test]
async fn test_writer_failure_aborts_and_keeps_prior_snapshots() {
    let generator = Arc::new(ScriptedGenerator::always(3).failing_writer_on(2));
    let mut stream = pipeline(generator.clone()).run("Deep Sea").unwrap();
    let mut recorder = RunRecorder::new("scripted-model");

    let mut failure = None;
    while let Some(item) = stream.next().await {
        match item {
            Ok(snapshot) => recorder.observe(&snapshot),
            Err(e) => failure = Some(e),
        }
    }

    match failure {
        Some(PipelineError::StepFailed {
            step,
            topic,
            iteration,
            ..
        }) => {
            assert_eq!(step, StepKind::Writer);
            assert_eq!(topic, "Deep Sea");
            assert_eq!(iteration, 1);
        }
        other => panic!("Expected writer failure, got {:?}", other),
    }

    assert_eq!(recorder.history().len(), 1);
    let last = recorder.last_state().unwrap();
    assert_eq!(last.script, "Draft 1");
    assert_eq!(last.rating, 3);
    assert!(recorder.finish().is_err());
}

#[tokio::test]
async fn test_execute_propagates_step_failure() {
    let generator = Arc::new(ScriptedGenerator::always(8).failing_writer_on(1));
    let err = pipeline(generator).execute("Deep Sea").await.unwrap_err();
    assert_eq!(err.failed_step(), Some(StepKind::Writer));
}

#[tokio::test]
async fn test_dropping_stream_stops_between_steps() {
    let generator = Arc::new(ScriptedGenerator::always(2));
    let pipeline = pipeline(generator.clone());

    let taken: Vec<_> = pipeline.run("Western").unwrap().take(2).collect().await;
    assert_eq!(taken.len(), 2);

    let last = taken.last().unwrap().as_ref().unwrap();
    assert_eq!(last.step, StepKind::Writer);
    assert_eq!(generator.writer_calls(), 1);
    assert_eq!(generator.reviewer_calls(), 0);
}

#[tokio::test]
async fn test_custom_policy() {
    let generator = Arc::new(ScriptedGenerator::sequence(&[8], 9));
    let pipeline = Pipeline::builder()
        .generator(generator.clone())
        .policy(RevisionPolicy::new(9, 5).unwrap())
        .build()
        .unwrap();

    let result = pipeline.execute("Romance").await.unwrap();
    assert_eq!(generator.writer_calls(), 2);
    assert_eq!(result.rating, 9);
    assert_eq!(result.research_source, ResearchSource::Fallback);
}

#[tokio::test]
async fn test_runs_do_not_share_state() {
    let generator = Arc::new(ScriptedGenerator::always(8));
    let pipeline = pipeline(generator);

    let first = pipeline.execute("Comedy").await.unwrap();
    let second = pipeline.execute("Tragedy").await.unwrap();

    assert_eq!(first.topic, "Comedy");
    assert_eq!(second.topic, "Tragedy");
    assert_eq!(second.iterations, 1);
    assert_ne!(first.run_id, second.run_id);
}
