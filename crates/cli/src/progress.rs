use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::StepSnapshot;
use studio_core::{GateDecision, ResearchSource, StepKind};

const FEEDBACK_PREVIEW_CHARS: usize = 100;

/// Spinner plus one summary line per completed step.
pub struct RunProgress {
    spinner: ProgressBar,
}

impl RunProgress {
    pub fn start(topic: &str) -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")?);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message(format!("Researching '{}'", topic));
        Ok(Self { spinner })
    }

    pub fn step_done(&self, snapshot: &StepSnapshot) {
        self.spinner
            .println(format!("{} {}", style("✓").green(), step_summary(snapshot)));
        match next_message(snapshot) {
            Some(message) => self.spinner.set_message(message),
            None => self.spinner.finish_and_clear(),
        }
    }

    pub fn fail(&self, message: &str) {
        self.spinner
            .abandon_with_message(format!("{} {}", style("✗").red(), message));
    }
}

pub fn step_summary(snapshot: &StepSnapshot) -> String {
    let state = &snapshot.state;
    match snapshot.step {
        StepKind::Researcher => {
            let source = match state.research_source {
                Some(ResearchSource::Retrieved) => "web search",
                _ => "fallback summary",
            };
            format!(
                "Research ready from {} ({} chars)",
                source,
                state.research_findings.chars().count()
            )
        }
        StepKind::Writer => format!(
            "Draft v{} written ({} chars)",
            state.iteration,
            state.script.chars().count()
        ),
        StepKind::Reviewer => {
            let feedback = state.feedback.as_deref().unwrap_or_default();
            let degraded = state
                .review_provenance
                .map(|p| p.is_degraded())
                .unwrap_or(false);
            let verdict = match snapshot.decision {
                Some(GateDecision::Approved(reason)) => format!("approved ({})", reason.as_str()),
                _ => "revision requested".to_string(),
            };
            format!(
                "Review of v{}: rating {}/10{}, {} | {}",
                state.iteration,
                state.rating,
                if degraded { " (defaulted)" } else { "" },
                verdict,
                preview(feedback, FEEDBACK_PREVIEW_CHARS)
            )
        }
    }
}

fn next_message(snapshot: &StepSnapshot) -> Option<String> {
    let iteration = snapshot.state.iteration;
    match snapshot.step {
        StepKind::Researcher => Some("Writing draft v1".to_string()),
        StepKind::Writer => Some(format!("Reviewing draft v{}", iteration)),
        StepKind::Reviewer if snapshot.is_final() => None,
        StepKind::Reviewer => Some(format!("Revising into draft v{}", iteration + 1)),
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let cut: String = single_line.chars().take(max_chars).collect();
    format!("{}...", cut)
}
