//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lexibench")]
#[command(author, version, about = "Rule-adherence experiments for local language models", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<SubCommand>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for CSV results, artifacts and the master log
    #[arg(long, global = true, env = "LEXIBENCH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Base URL of the Ollama server
    #[arg(long, global = true, env = "OLLAMA_HOST")]
    pub ollama_host: Option<String>,

    /// Model to evaluate (repeatable); defaults to the built-in candidates.
    /// Values given after a subcommand replace earlier ones.
    #[arg(long = "model", global = true, env = "LEXIBENCH_MODELS", value_delimiter = ',')]
    pub models: Vec<String>,

    /// Trials per condition and model
    #[arg(long, global = true)]
    pub trials: Option<usize>,

    /// Word list used for rule sampling
    #[arg(long, global = true)]
    pub lexicon: Option<PathBuf>,

    /// Seed for rule sampling
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Run the whole experiment suite (the default)
    Run,

    /// Run a single experiment
    Experiment {
        /// Experiment name or number (e.g. fatigue or 1)
        name: String,
    },

    /// List experiments and their conditions
    List,

    /// Inspect the container build contract
    Image {
        #[command(subcommand)]
        command: ImageCommand,
    },
}

#[derive(Subcommand)]
pub enum ImageCommand {
    /// Print the Dockerfile for a descriptor
    Render {
        /// JSON image descriptor; defaults apply when omitted
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },

    /// Check a build context against a descriptor
    Check {
        /// Build context directory
        #[arg(long, default_value = ".")]
        context: PathBuf,

        /// JSON image descriptor; defaults apply when omitted
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },

    /// Print the ordered build steps
    Plan {
        /// JSON image descriptor; defaults apply when omitted
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },
}
