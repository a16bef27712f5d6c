//! Lexibench CLI - run rule-adherence experiments and inspect the build contract

use anyhow::{bail, Context};
use clap::Parser;
use lexibench::cli::{Args, ImageCommand, SubCommand};
use lexibench::experiments::listing;
use lexibench::image::plan_steps;
use lexibench::{
    check_build, format_output, logging, render_dockerfile, BenchConfig, ExperimentKind, ImageDescriptor,
    OllamaBackend, OutputFormat, Report, SuiteRunner,
};
use std::path::Path;

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_json_flag(args.json);
    let config = build_config(&args);

    let report = match args.command {
        None | Some(SubCommand::Run) => run_suite(config, &ExperimentKind::ALL, args.verbose)?,

        Some(SubCommand::Experiment { ref name }) => {
            let kind: ExperimentKind = name.parse()?;
            run_suite(config, &[kind], args.verbose)?
        }

        Some(SubCommand::List) => Report::Listing(listing()),

        Some(SubCommand::Image { command }) => {
            logging::init_stderr(args.verbose)?;
            match command {
                ImageCommand::Render { descriptor } => {
                    Report::Dockerfile(render_dockerfile(&load_descriptor(descriptor.as_deref())?))
                }
                ImageCommand::Plan { descriptor } => {
                    Report::Plan(plan_steps(&load_descriptor(descriptor.as_deref())?))
                }
                ImageCommand::Check { context, descriptor } => {
                    let descriptor = load_descriptor(descriptor.as_deref())?;
                    let build = check_build(&descriptor, &context);
                    let built = build.is_built();
                    println!("{}", format_output(&Report::Build(build), &output_format));
                    if !built {
                        bail!("image build aborted for context {}", context.display());
                    }
                    return Ok(());
                }
            }
        }
    };

    println!("{}", format_output(&report, &output_format));
    Ok(())
}

fn build_config(args: &Args) -> BenchConfig {
    let mut config = BenchConfig::default();
    if let Some(ref dir) = args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(ref host) = args.ollama_host {
        config.ollama.host = host.clone();
    }
    let models: Vec<String> = args
        .models
        .iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    if !models.is_empty() {
        config.models = models;
    }
    if let Some(trials) = args.trials {
        config.trials = trials;
    }
    if let Some(ref lexicon) = args.lexicon {
        config.lexicon_path = lexicon.clone();
    }
    config.seed = args.seed;
    config
}

fn run_suite(config: BenchConfig, kinds: &[ExperimentKind], verbose: bool) -> anyhow::Result<Report> {
    let _log_guard = logging::init_with_master_log(&config.output_dir, verbose)
        .with_context(|| format!("cannot prepare output directory {}", config.output_dir.display()))?;

    let backend = OllamaBackend::new(config.ollama.clone()).context("cannot create Ollama client")?;
    let runner = SuiteRunner::new(config);
    runner.install_interrupt_handler()?;

    let report = runner.run(kinds, &backend)?;
    Ok(Report::Suite(report))
}

fn load_descriptor(path: Option<&Path>) -> anyhow::Result<ImageDescriptor> {
    match path {
        Some(path) => ImageDescriptor::from_json_file(path)
            .with_context(|| format!("cannot load descriptor {}", path.display())),
        None => Ok(ImageDescriptor::default()),
    }
}
