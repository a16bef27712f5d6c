//! Runtime configuration for the experiment suite

use std::path::PathBuf;
use std::time::Duration;

use crate::image::DICTIONARY_PATH;
use crate::llm::{OllamaConfig, RetryPolicy};

pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_LEXICON_LIMIT: usize = 2000;
pub const DEFAULT_TRIALS: usize = 3;
pub const MASTER_LOG_FILE: &str = "master_runner.log";

pub const MODEL_CANDIDATES: [&str; 5] = [
    "phi3:3.8b",
    "llama3.2:3b",
    "gemma2:2b",
    "qwen2:1.5b",
    "mistral:7b",
];

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub output_dir: PathBuf,
    pub lexicon_path: PathBuf,
    pub lexicon_limit: usize,
    pub models: Vec<String>,
    pub trials: usize,
    /// Fixed seed for rule sampling; `None` draws from the OS
    pub seed: Option<u64>,
    pub ollama: OllamaConfig,
    pub retry: RetryPolicy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            lexicon_path: PathBuf::from(DICTIONARY_PATH),
            lexicon_limit: DEFAULT_LEXICON_LIMIT,
            models: MODEL_CANDIDATES.iter().map(|m| m.to_string()).collect(),
            trials: DEFAULT_TRIALS,
            seed: None,
            ollama: OllamaConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl BenchConfig {
    pub fn master_log_path(&self) -> PathBuf {
        self.output_dir.join(MASTER_LOG_FILE)
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry.base_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.models.len(), 5);
        assert_eq!(config.trials, 3);
        assert_eq!(config.lexicon_path, PathBuf::from("/usr/share/dict/words"));
        assert_eq!(config.master_log_path(), PathBuf::from("outputs/master_runner.log"));
        assert_eq!(config.ollama.host, "http://ollama:11434");
    }
}
