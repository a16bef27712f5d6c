//! CSV result rows

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

pub const CSV_HEADER: [&str; 9] = [
    "experiment_name",
    "trial",
    "model",
    "R",
    "passed",
    "failed",
    "adherence",
    "prompt_len",
    "details",
];

/// One scored trial, in CSV column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    pub experiment_name: String,
    pub trial: usize,
    pub model: String,
    #[serde(rename = "R")]
    pub rule_count: usize,
    pub passed: usize,
    pub failed: usize,
    pub adherence: f64,
    pub prompt_len: usize,
    pub details: String,
}

/// Appends records to one CSV file, writing the header only for a new file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &TrialRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}
