//! Language model access
//!
//! Experiments talk to a [`ChatBackend`]; [`generate_with_retries`] wraps a
//! backend with exponential backoff and never fails: after the last attempt
//! it returns a sentinel story that scores like any other response.

pub mod error;
pub mod ollama;

use std::thread;
use std::time::Duration;

use tracing::{error, warn};

pub use error::LlmError;
pub use ollama::{OllamaBackend, OllamaConfig};

/// Single-turn chat completion
pub trait ChatBackend {
    fn chat(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

impl<T: ChatBackend + ?Sized> ChatBackend for &T {
    fn chat(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        (**self).chat(model, prompt)
    }
}

impl<T: ChatBackend + ?Sized> ChatBackend for Box<T> {
    fn chat(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        (**self).chat(model, prompt)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Wait after the first failure; doubles after each further failure
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

pub fn failure_sentinel(max_retries: u32) -> String {
    format!(
        "ERROR: Failed to generate response after {} attempts",
        max_retries
    )
}

/// Ask `backend` for a story, retrying with backoff
pub fn generate_with_retries<B: ChatBackend + ?Sized>(
    backend: &B,
    policy: &RetryPolicy,
    model: &str,
    prompt: &str,
) -> String {
    let attempts = policy.max_retries.max(1);
    for attempt in 0..attempts {
        match backend.chat(model, prompt) {
            Ok(content) => return content,
            Err(e) if attempt + 1 < attempts => {
                let wait = policy.delay_for(attempt);
                warn!(
                    "Attempt {}/{} for model {} failed: {}. Retrying in {}s...",
                    attempt + 1,
                    attempts,
                    model,
                    e,
                    wait.as_secs_f64()
                );
                thread::sleep(wait);
            }
            Err(e) => {
                error!("Model {} failed after {} attempts: {}", model, attempts, e);
            }
        }
    }
    failure_sentinel(policy.max_retries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Fails a fixed number of times, then answers
    struct Flaky {
        failures: Cell<u32>,
        calls: Cell<u32>,
        prompts: RefCell<Vec<String>>,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures: Cell::new(failures),
                calls: Cell::new(0),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatBackend for Flaky {
        fn chat(&self, _model: &str, prompt: &str) -> Result<String, LlmError> {
            self.calls.set(self.calls.get() + 1);
            self.prompts.borrow_mut().push(prompt.to_string());
            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err(LlmError::Network("connection refused".to_string()));
            }
            Ok("a story".to_string())
        }
    }

    fn instant() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_first_try() {
        let backend = Flaky::new(0);
        assert_eq!(generate_with_retries(&backend, &instant(), "m", "p"), "a story");
        assert_eq!(backend.calls.get(), 1);
    }

    #[test]
    fn test_recovers_after_failures() {
        let backend = Flaky::new(2);
        assert_eq!(generate_with_retries(&backend, &instant(), "m", "p"), "a story");
        assert_eq!(backend.calls.get(), 3);
        assert!(backend.prompts.borrow().iter().all(|p| p == "p"));
    }

    #[test]
    fn test_sentinel_after_exhaustion() {
        let backend = Flaky::new(10);
        let story = generate_with_retries(&backend, &instant(), "m", "p");
        assert_eq!(story, "ERROR: Failed to generate response after 3 attempts");
        assert_eq!(backend.calls.get(), 3);
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }
}
