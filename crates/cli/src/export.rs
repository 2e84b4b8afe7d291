use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use studio_core::ProductionResult;

/// Write the result record as pretty JSON into `dir`, creating it if needed.
pub async fn write_result(result: &ProductionResult, dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(result.export_file_name());
    let json = result.to_json_pretty()?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), run_id = %result.run_id, "Exported production result");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::{ApprovalReason, ProductionState, ResearchSource, Review};
    use tempfile::TempDir;

    fn sample_result() -> ProductionResult {
        let state = ProductionState::new("Space Exploration")
            .unwrap()
            .with_research("findings".to_string(), ResearchSource::Retrieved)
            .with_script("Title: Orbit".to_string())
            .with_review(Review::parsed(8, "Tight pacing."));
        ProductionResult::new(&state, ApprovalReason::Quality, Vec::new(), "test-model")
    }

    #[tokio::test]
    async fn test_write_result_creates_dir_and_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("exports/nested");
        let result = sample_result();

        let path = write_result(&result, &out).await.unwrap();
        assert!(path.starts_with(&out));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("production_"));

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["topic"], "Space Exploration");
        assert_eq!(value["rating"], 8);
        assert_eq!(value["model_used"], "test-model");
    }
}
