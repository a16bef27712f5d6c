//! Output formatting

use crate::experiments::ExperimentListing;
use crate::image::{BuildReport, PlannedStep};
use crate::output::human::format_human;
use crate::output::json::format_json;
use crate::runner::SuiteReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Anything a command prints on stdout
#[derive(Debug, Clone)]
pub enum Report {
    Suite(SuiteReport),
    Build(BuildReport),
    Dockerfile(String),
    Plan(Vec<PlannedStep>),
    Listing(Vec<ExperimentListing>),
}

pub fn format_output(report: &Report, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(report),
        OutputFormat::Json => format_json(report),
    }
}
