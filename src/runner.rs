//! Suite runner: every selected experiment in order, failures isolated

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::experiments::{run_experiment, ExperimentKind, ExperimentSummary, TrialContext};
use crate::lexicon::load_lexicon;
use crate::llm::ChatBackend;

const BANNER: &str = "==================================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    Completed,
    Failed,
    Interrupted,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentOutcome {
    pub kind: ExperimentKind,
    pub status: ExperimentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ExperimentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExperimentOutcome {
    fn completed(summary: ExperimentSummary) -> Self {
        Self {
            kind: summary.kind,
            status: ExperimentStatus::Completed,
            summary: Some(summary),
            error: None,
        }
    }

    fn failed(kind: ExperimentKind, error: String) -> Self {
        Self {
            kind,
            status: ExperimentStatus::Failed,
            summary: None,
            error: Some(error),
        }
    }

    fn interrupted(kind: ExperimentKind) -> Self {
        Self {
            kind,
            status: ExperimentStatus::Interrupted,
            summary: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub output_dir: String,
    pub experiments: Vec<ExperimentOutcome>,
}

impl SuiteReport {
    pub fn count(&self, status: ExperimentStatus) -> usize {
        self.experiments.iter().filter(|e| e.status == status).count()
    }

    pub fn interrupted(&self) -> bool {
        self.count(ExperimentStatus::Interrupted) > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopRequest {
    Graceful,
    Force,
}

/// Raise the interrupt flag; a flag that was already up means force quit
fn request_stop(flag: &AtomicBool) -> StopRequest {
    if flag.swap(true, Ordering::SeqCst) {
        StopRequest::Force
    } else {
        StopRequest::Graceful
    }
}

pub struct SuiteRunner {
    config: BenchConfig,
    interrupt: Arc<AtomicBool>,
}

impl SuiteRunner {
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Flag that stops the suite before the next trial once set
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// Route Ctrl+C to the interrupt flag. The first signal stops the
    /// suite after the current trial; a second one exits immediately.
    /// Only one handler may be installed per process.
    pub fn install_interrupt_handler(&self) -> Result<()> {
        let flag = self.interrupt.clone();
        ctrlc::set_handler(move || {
            if request_stop(&flag) == StopRequest::Force {
                eprintln!("Interrupted again, exiting");
                std::process::exit(130);
            }
            eprintln!("Stopping after the current trial (Ctrl+C again to force quit)");
        })
        .map_err(|e| BenchError::ConfigError(format!("Failed to set Ctrl+C handler: {}", e)))
    }

    /// Run `kinds` in canonical order.
    ///
    /// Only start-up problems (output directory, lexicon) are returned as
    /// errors; a failing experiment is logged and recorded in the report.
    pub fn run(&self, kinds: &[ExperimentKind], backend: &dyn ChatBackend) -> Result<SuiteReport> {
        let started_at = Utc::now();
        fs::create_dir_all(&self.config.output_dir)?;

        info!("{}", BANNER);
        info!("STARTING COMPREHENSIVE RESEARCH SUITE");
        info!("Models: {}", self.config.models.join(", "));
        info!("{}", BANNER);

        let lexicon = load_lexicon(&self.config.lexicon_path, self.config.lexicon_limit)?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut ordered: Vec<ExperimentKind> = kinds.to_vec();
        ordered.sort_by_key(|k| k.number());
        ordered.dedup();

        let mut experiments = Vec::with_capacity(ordered.len());
        for kind in ordered {
            if self.interrupt.load(Ordering::SeqCst) {
                experiments.push(ExperimentOutcome::interrupted(kind));
                continue;
            }

            info!(">>> Running experiment {}: {}", kind.number(), kind.title());
            let mut ctx = TrialContext {
                config: &self.config,
                backend,
                lexicon: &lexicon,
                rng: &mut rng,
                interrupt: Some(self.interrupt.as_ref()),
            };

            let outcome = match run_experiment(kind.definition().as_ref(), &mut ctx) {
                Ok(summary) => {
                    info!(
                        "Experiment {} completed: {} trials, mean adherence {:.1}%",
                        kind,
                        summary.trials,
                        summary.mean_adherence * 100.0
                    );
                    ExperimentOutcome::completed(summary)
                }
                Err(BenchError::Interrupted) => {
                    warn!("Experiment {} interrupted", kind);
                    ExperimentOutcome::interrupted(kind)
                }
                Err(e) => {
                    error!("Experiment {} failed: {}", kind, e);
                    ExperimentOutcome::failed(kind, e.to_string())
                }
            };
            experiments.push(outcome);
        }

        info!("{}", BANNER);
        info!("RESEARCH SUITE COMPLETED");
        info!("{}", BANNER);

        Ok(SuiteReport {
            started_at,
            finished_at: Utc::now(),
            output_dir: self.config.output_dir.display().to_string(),
            experiments,
        })
    }
}
