//! Experiment definitions
//!
//! Each experiment is a set of conditions plus a prompt builder and a
//! scorer. The shared trial loop in [`trial`] samples rules, asks every
//! configured model for a story, and records the result.

pub mod complexity;
pub mod contradictions;
pub mod fatigue;
pub mod formats;
pub mod prompt;
pub mod taxonomy;
pub mod trial;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::analysis::AdherenceReport;
use crate::error::BenchError;

pub use trial::{run_experiment, ConditionSummary, ExperimentSummary, TrialContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
    Fatigue,
    Taxonomy,
    Contradictions,
    Complexity,
    Formats,
}

impl ExperimentKind {
    /// Canonical suite order
    pub const ALL: [ExperimentKind; 5] = [
        ExperimentKind::Fatigue,
        ExperimentKind::Taxonomy,
        ExperimentKind::Contradictions,
        ExperimentKind::Complexity,
        ExperimentKind::Formats,
    ];

    pub fn number(&self) -> usize {
        match self {
            ExperimentKind::Fatigue => 1,
            ExperimentKind::Taxonomy => 2,
            ExperimentKind::Contradictions => 3,
            ExperimentKind::Complexity => 4,
            ExperimentKind::Formats => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExperimentKind::Fatigue => "fatigue",
            ExperimentKind::Taxonomy => "taxonomy",
            ExperimentKind::Contradictions => "contradictions",
            ExperimentKind::Complexity => "complexity",
            ExperimentKind::Formats => "formats",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ExperimentKind::Fatigue => "Scaled rule fatigue",
            ExperimentKind::Taxonomy => "Constraint type taxonomy",
            ExperimentKind::Contradictions => "Contradiction resolution",
            ExperimentKind::Complexity => "Progressive complexity ladder",
            ExperimentKind::Formats => "Presentation format effects",
        }
    }

    pub fn csv_file(&self) -> String {
        format!("experiment_{}_{}.csv", self.number(), self.name())
    }

    pub fn definition(&self) -> Box<dyn Experiment> {
        match self {
            ExperimentKind::Fatigue => Box::new(fatigue::Fatigue),
            ExperimentKind::Taxonomy => Box::new(taxonomy::Taxonomy),
            ExperimentKind::Contradictions => Box::new(contradictions::Contradictions),
            ExperimentKind::Complexity => Box::new(complexity::Complexity),
            ExperimentKind::Formats => Box::new(formats::Formats),
        }
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ExperimentKind {
    type Err = BenchError;

    /// Accepts the name (`fatigue`) or the number (`1`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        ExperimentKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s || k.number().to_string() == s)
            .ok_or(BenchError::UnknownExperiment(s))
    }
}

/// What `list` shows for one experiment
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentListing {
    pub number: usize,
    pub name: &'static str,
    pub title: &'static str,
    pub csv_file: String,
    pub conditions: Vec<Condition>,
}

pub fn listing() -> Vec<ExperimentListing> {
    ExperimentKind::ALL
        .iter()
        .map(|kind| ExperimentListing {
            number: kind.number(),
            name: kind.name(),
            title: kind.title(),
            csv_file: kind.csv_file(),
            conditions: kind.definition().conditions(),
        })
        .collect()
}

/// One experimental configuration, e.g. `fatigue_R50`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub name: String,
    /// Number of words sampled from the lexicon
    pub rule_count: usize,
    /// Position in the experiment's own condition table
    pub index: usize,
}

/// Outcome of scoring one story
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub lexical: AdherenceReport,
    /// Adherence written to the results; may blend in non-lexical checks
    pub adherence: f64,
    /// R as reported in the results
    pub reported_rules: usize,
    pub details: String,
}

impl Score {
    pub fn lexical(lexical: AdherenceReport, reported_rules: usize, details: String) -> Self {
        Self {
            adherence: lexical.adherence,
            lexical,
            reported_rules,
            details,
        }
    }
}

pub trait Experiment {
    fn kind(&self) -> ExperimentKind;

    fn conditions(&self) -> Vec<Condition>;

    /// Adjust sampled rules before the prompt is built
    fn prepare_rules(&self, _condition: &Condition, _rules: &mut [String]) {}

    fn build_prompt(&self, condition: &Condition, rules: &[String]) -> String;

    fn score(&self, condition: &Condition, story: &str, rules: &[String]) -> Score;
}
