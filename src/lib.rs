//! Lexibench - rule-adherence experiments for local language models
//!
//! Lexibench samples words from a dictionary, asks each model to write a
//! story that uses them under different prompt conditions, and records how
//! many rules were followed. It also carries the container build contract
//! the suite ships in, which can be rendered or checked offline.
//!
//! # Example
//!
//! ```no_run
//! use lexibench::{BenchConfig, ExperimentKind, OllamaBackend, SuiteRunner};
//!
//! let config = BenchConfig::default();
//! let backend = OllamaBackend::new(config.ollama.clone()).unwrap();
//! let runner = SuiteRunner::new(config);
//! let report = runner.run(&ExperimentKind::ALL, &backend).unwrap();
//! println!("{} experiments run", report.experiments.len());
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod experiments;
pub mod image;
pub mod lexicon;
pub mod llm;
pub mod logging;
pub mod output;
pub mod results;
pub mod runner;

pub use config::BenchConfig;
pub use error::{BenchError, Result};
pub use experiments::{Experiment, ExperimentKind};
pub use image::{check_build, render_dockerfile, BuildReport, ImageDescriptor};
pub use llm::{ChatBackend, OllamaBackend};
pub use output::{format_output, OutputFormat, Report};
pub use runner::{SuiteReport, SuiteRunner};
