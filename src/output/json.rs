//! JSON output formatting

use crate::output::formatter::Report;
use serde_json::{json, Value};

pub fn format_json(report: &Report) -> String {
    let data: Value = match report {
        Report::Suite(suite) => serde_json::to_value(suite).unwrap_or(json!(null)),
        Report::Build(build) => serde_json::to_value(build).unwrap_or(json!(null)),
        Report::Dockerfile(text) => json!({ "dockerfile": text }),
        Report::Plan(steps) => json!({ "steps": steps }),
        Report::Listing(experiments) => json!({ "experiments": experiments }),
    };

    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}
