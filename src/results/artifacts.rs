//! Prompt and story artifacts kept for manual inspection

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;

/// Artifact name for a condition and model; `:` is not filename-safe
pub fn artifact_name(condition: &str, model: &str) -> String {
    format!("{}_{}", condition, model.replace(':', "_"))
}

/// Write `<name>_prompt.txt` and `<name>_story.txt`. Only the first trial of
/// a condition is kept; later trials return `None`.
pub fn save_experiment_artifacts(
    output_dir: &Path,
    name: &str,
    trial: usize,
    prompt: &str,
    story: &str,
) -> Result<Option<(PathBuf, PathBuf)>> {
    if trial != 1 {
        return Ok(None);
    }

    fs::create_dir_all(output_dir)?;
    let prompt_path = output_dir.join(format!("{}_prompt.txt", name));
    let story_path = output_dir.join(format!("{}_story.txt", name));
    fs::write(&prompt_path, prompt)?;
    fs::write(&story_path, story)?;

    info!("Saved artifacts for {} (trial {})", name, trial);
    Ok(Some((prompt_path, story_path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_name() {
        assert_eq!(artifact_name("fatigue_R5", "llama3.2:3b"), "fatigue_R5_llama3.2_3b");
    }

    #[test]
    fn test_first_trial_saved() {
        let dir = TempDir::new().unwrap();
        let saved = save_experiment_artifacts(dir.path(), "x_m", 1, "the prompt", "the story")
            .unwrap()
            .unwrap();
        assert_eq!(fs::read_to_string(saved.0).unwrap(), "the prompt");
        assert_eq!(fs::read_to_string(saved.1).unwrap(), "the story");
    }

    #[test]
    fn test_later_trials_skipped() {
        let dir = TempDir::new().unwrap();
        let saved = save_experiment_artifacts(dir.path(), "x_m", 2, "p", "s").unwrap();
        assert!(saved.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
