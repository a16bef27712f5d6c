//! Result persistence: CSV rows and first-trial artifacts

pub mod artifacts;
pub mod records;

pub use artifacts::{artifact_name, save_experiment_artifacts};
pub use records::{CsvSink, TrialRecord, CSV_HEADER};
