//! The trial loop shared by every experiment

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use serde::Serialize;
use tracing::info;

use super::{Experiment, ExperimentKind};
use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::lexicon::sample_rules;
use crate::llm::{generate_with_retries, ChatBackend};
use crate::results::{artifact_name, save_experiment_artifacts, CsvSink, TrialRecord};

/// Everything a trial needs besides the experiment itself
pub struct TrialContext<'a, R: Rng + ?Sized> {
    pub config: &'a BenchConfig,
    pub backend: &'a dyn ChatBackend,
    pub lexicon: &'a [String],
    pub rng: &'a mut R,
    /// Checked before every trial
    pub interrupt: Option<&'a AtomicBool>,
}

impl<R: Rng + ?Sized> TrialContext<'_, R> {
    fn interrupted(&self) -> bool {
        self.interrupt.is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Mean adherence of one condition for one model
#[derive(Debug, Clone, Serialize)]
pub struct ConditionSummary {
    pub condition: String,
    pub model: String,
    pub trials: usize,
    pub mean_adherence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentSummary {
    pub kind: ExperimentKind,
    pub csv_path: String,
    pub trials: usize,
    pub mean_adherence: f64,
    pub conditions: Vec<ConditionSummary>,
}

/// Run every model × condition × trial of one experiment, appending each
/// result to the experiment's CSV file
pub fn run_experiment<R: Rng + ?Sized>(
    experiment: &dyn Experiment,
    ctx: &mut TrialContext<'_, R>,
) -> Result<ExperimentSummary> {
    let kind = experiment.kind();
    let sink = CsvSink::new(ctx.config.output_dir.join(kind.csv_file()));
    let mut conditions = Vec::new();
    let mut total_adherence = 0.0;
    let mut total_trials = 0;

    for model in &ctx.config.models {
        for condition in experiment.conditions() {
            info!("=== Starting {} with model: {} ===", condition.name, model);
            let artifact = artifact_name(&condition.name, model);
            let mut condition_adherence = 0.0;

            for trial in 1..=ctx.config.trials {
                if ctx.interrupted() {
                    return Err(BenchError::Interrupted);
                }

                let mut rules = sample_rules(ctx.lexicon, condition.rule_count, ctx.rng)?;
                experiment.prepare_rules(&condition, &mut rules);
                let prompt = experiment.build_prompt(&condition, &rules);
                let story = generate_with_retries(ctx.backend, &ctx.config.retry, model, &prompt);

                save_experiment_artifacts(&ctx.config.output_dir, &artifact, trial, &prompt, &story)?;

                let score = experiment.score(&condition, &story, &rules);
                sink.append(&TrialRecord {
                    experiment_name: condition.name.clone(),
                    trial,
                    model: model.clone(),
                    rule_count: score.reported_rules,
                    passed: score.lexical.passed_count(),
                    failed: score.lexical.failed_count(),
                    adherence: score.adherence,
                    prompt_len: prompt.chars().count(),
                    details: score.details.clone(),
                })?;

                info!(
                    "Model {} | Trial {}: {}/{} rules followed ({:.1}%) [{}]",
                    model,
                    trial,
                    score.lexical.passed_count(),
                    rules.len(),
                    score.adherence * 100.0,
                    score.details
                );
                condition_adherence += score.adherence;
            }

            let trials = ctx.config.trials;
            total_adherence += condition_adherence;
            total_trials += trials;
            conditions.push(ConditionSummary {
                condition: condition.name,
                model: model.clone(),
                trials,
                mean_adherence: mean(condition_adherence, trials),
            });
        }
    }

    Ok(ExperimentSummary {
        kind,
        csv_path: sink.path().display().to_string(),
        trials: total_trials,
        mean_adherence: mean(total_adherence, total_trials),
        conditions,
    })
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::ExperimentKind;
    use crate::llm::LlmError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Echoes the prompt back, so every required word is present
    struct Echo {
        calls: RefCell<Vec<(String, String)>>,
    }

    impl ChatBackend for Echo {
        fn chat(&self, model: &str, prompt: &str) -> std::result::Result<String, LlmError> {
            self.calls.borrow_mut().push((model.to_string(), prompt.to_string()));
            Ok(prompt.to_string())
        }
    }

    struct Down;

    impl ChatBackend for Down {
        fn chat(&self, _model: &str, _prompt: &str) -> std::result::Result<String, LlmError> {
            Err(LlmError::Network("connection refused".to_string()))
        }
    }

    fn config(dir: &TempDir) -> BenchConfig {
        BenchConfig {
            output_dir: dir.path().to_path_buf(),
            models: vec!["tiny:1b".to_string()],
            trials: 2,
            seed: Some(1),
            ..BenchConfig::default()
        }
        .with_retry_delay(Duration::ZERO)
    }

    fn lexicon() -> Vec<String> {
        (0..200).map(|i| format!("word{:03}", i)).collect()
    }

    #[test]
    fn test_fatigue_with_echo_backend() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let backend = Echo { calls: RefCell::new(Vec::new()) };
        let lexicon = lexicon();
        let mut rng = StdRng::seed_from_u64(3);
        let mut ctx = TrialContext {
            config: &config,
            backend: &backend,
            lexicon: &lexicon,
            rng: &mut rng,
            interrupt: None,
        };

        let summary = run_experiment(ExperimentKind::Fatigue.definition().as_ref(), &mut ctx).unwrap();
        assert_eq!(summary.trials, 8);
        assert_eq!(summary.conditions.len(), 4);
        assert_eq!(summary.mean_adherence, 1.0);
        assert_eq!(backend.calls.borrow().len(), 8);

        let csv = fs::read_to_string(dir.path().join("experiment_1_fatigue.csv")).unwrap();
        assert_eq!(csv.lines().count(), 9);
        assert!(csv.lines().nth(1).unwrap().starts_with("fatigue_R5,1,tiny:1b,5,5,0,1.0,"));

        // Artifacts for trial 1 only, one pair per condition
        assert!(dir.path().join("fatigue_R5_tiny_1b_prompt.txt").exists());
        assert!(dir.path().join("fatigue_R100_tiny_1b_story.txt").exists());
        let artifacts = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().is_some_and(|x| x == "txt"))
            .count();
        assert_eq!(artifacts, 8);
    }

    #[test]
    fn test_backend_failure_scores_sentinel() {
        let dir = TempDir::new().unwrap();
        let config = BenchConfig {
            trials: 1,
            ..config(&dir)
        };
        let lexicon = lexicon();
        let mut rng = StdRng::seed_from_u64(3);
        let mut ctx = TrialContext {
            config: &config,
            backend: &Down,
            lexicon: &lexicon,
            rng: &mut rng,
            interrupt: None,
        };

        let summary =
            run_experiment(ExperimentKind::Contradictions.definition().as_ref(), &mut ctx).unwrap();
        assert_eq!(summary.trials, 1);
        assert_eq!(summary.mean_adherence, 0.0);

        let story = fs::read_to_string(
            dir.path().join("contradiction_tense_R20_tiny_1b_story.txt"),
        )
        .unwrap();
        assert!(story.starts_with("ERROR: Failed to generate response"));
    }

    #[test]
    fn test_lexicon_too_small() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let lexicon: Vec<String> = vec!["only".to_string()];
        let mut rng = StdRng::seed_from_u64(3);
        let mut ctx = TrialContext {
            config: &config,
            backend: &Down,
            lexicon: &lexicon,
            rng: &mut rng,
            interrupt: None,
        };
        let err = run_experiment(ExperimentKind::Formats.definition().as_ref(), &mut ctx).unwrap_err();
        assert!(matches!(err, BenchError::ConfigError(_)));
    }

    #[test]
    fn test_interrupt_stops_before_first_trial() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let lexicon = lexicon();
        let flag = AtomicBool::new(true);
        let backend = Echo { calls: RefCell::new(Vec::new()) };
        let mut rng = StdRng::seed_from_u64(3);
        let mut ctx = TrialContext {
            config: &config,
            backend: &backend,
            lexicon: &lexicon,
            rng: &mut rng,
            interrupt: Some(&flag),
        };
        let err = run_experiment(ExperimentKind::Taxonomy.definition().as_ref(), &mut ctx).unwrap_err();
        assert!(matches!(err, BenchError::Interrupted));
        assert!(backend.calls.borrow().is_empty());
    }
}
