//! Human-readable output formatting

use crate::image::{BuildOutcome, BuildReport, PlannedStep, StepStatus};
use crate::experiments::ExperimentListing;
use crate::output::formatter::Report;
use crate::runner::{ExperimentStatus, SuiteReport};
use bytesize::ByteSize;

pub fn format_human(report: &Report) -> String {
    match report {
        Report::Suite(suite) => format_suite(suite),
        Report::Build(build) => format_build(build),
        Report::Dockerfile(text) => text.clone(),
        Report::Plan(steps) => format_plan(steps),
        Report::Listing(experiments) => format_listing(experiments),
    }
}

fn format_suite(suite: &SuiteReport) -> String {
    let elapsed = suite.finished_at - suite.started_at;
    let mut output = String::from("Experiment Suite\n----------------\n");
    output.push_str(&format!(
        "Started:  {}\nFinished: {} ({}s)\nOutput:   {}\n",
        suite.started_at.format("%Y-%m-%d %H:%M:%S"),
        suite.finished_at.format("%Y-%m-%d %H:%M:%S"),
        elapsed.num_seconds(),
        suite.output_dir
    ));

    for outcome in &suite.experiments {
        output.push_str(&format!("\n{} {}\n", outcome.kind.number(), outcome.kind.title()));
        match outcome.status {
            ExperimentStatus::Completed => {
                if let Some(summary) = &outcome.summary {
                    output.push_str(&format!(
                        "  Completed: {} trials, mean adherence {:.1}% -> {}\n",
                        summary.trials,
                        summary.mean_adherence * 100.0,
                        summary.csv_path
                    ));
                    for c in &summary.conditions {
                        output.push_str(&format!(
                            "  {:<32} {:<16} {:>6.1}%\n",
                            truncate(&c.condition, 32),
                            truncate(&c.model, 16),
                            c.mean_adherence * 100.0
                        ));
                    }
                }
            }
            ExperimentStatus::Failed => {
                output.push_str(&format!(
                    "  Failed: {}\n",
                    outcome.error.as_deref().unwrap_or("unknown error")
                ));
            }
            ExperimentStatus::Interrupted => output.push_str("  Interrupted\n"),
        }
    }
    output
}

fn format_build(build: &BuildReport) -> String {
    let mut output = String::from("Build Check\n-----------\n");
    output.push_str(&format!(
        "Context:      {}\nBase image:   {}\nDependencies: {}\nSource:       {} files, {}\n\n",
        build.context.display(),
        build.base_image,
        build.dependencies.len(),
        build.source_files,
        ByteSize(build.source_bytes)
    ));

    for step in &build.steps {
        let status = match &step.status {
            StepStatus::Done => "done".to_string(),
            StepStatus::Failed(reason) => format!("FAILED: {}", reason),
            StepStatus::NotReached => "not reached".to_string(),
        };
        let layer = step.layer.as_deref().map(short_key).unwrap_or("-");
        output.push_str(&format!(
            "{}. {:<22} {:<14} {}\n",
            step.step.number(),
            step.step,
            layer,
            status
        ));
        for warning in &step.warnings {
            output.push_str(&format!("   warning: {}\n", warning));
        }
    }

    match &build.outcome {
        BuildOutcome::Built => output.push_str("\nResult: built"),
        BuildOutcome::Aborted { step, reason } => {
            output.push_str(&format!("\nResult: aborted at {} ({})", step, reason))
        }
    }
    output
}

fn format_plan(steps: &[PlannedStep]) -> String {
    let mut output = String::from("Build Plan\n----------\n");
    for step in steps {
        output.push_str(&format!("{}. {}\n", step.number, step.description));
    }
    output
}

fn format_listing(experiments: &[ExperimentListing]) -> String {
    let mut output = String::from("Experiments\n-----------\n");
    for exp in experiments {
        output.push_str(&format!(
            "\n{} {} - {} ({})\n",
            exp.number, exp.name, exp.title, exp.csv_file
        ));
        for condition in &exp.conditions {
            output.push_str(&format!("  {:<36} R={}\n", condition.name, condition.rule_count));
        }
    }
    output
}

/// First 12 hex digits of a layer key
fn short_key(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
