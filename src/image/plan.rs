//! Build plan execution
//!
//! Walks the six build steps in order against a build context directory.
//! The first fatal failure aborts the build and every later step is
//! reported as not reached. Each completed step contributes a layer key
//! chained from the previous one, so a layer key only changes when the
//! step itself or something before it changed.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::descriptor::{BaseImage, ImageDescriptor, DICTIONARY_PACKAGE};
use super::manifest::load_manifest;
use crate::error::{BenchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStep {
    SelectBase,
    Workdir,
    InstallDependencies,
    PruneToolchain,
    CopySource,
    EntryPoint,
}

impl BuildStep {
    pub const ALL: [BuildStep; 6] = [
        BuildStep::SelectBase,
        BuildStep::Workdir,
        BuildStep::InstallDependencies,
        BuildStep::PruneToolchain,
        BuildStep::CopySource,
        BuildStep::EntryPoint,
    ];

    pub fn number(&self) -> usize {
        match self {
            BuildStep::SelectBase => 1,
            BuildStep::Workdir => 2,
            BuildStep::InstallDependencies => 3,
            BuildStep::PruneToolchain => 4,
            BuildStep::CopySource => 5,
            BuildStep::EntryPoint => 6,
        }
    }

    /// Whether a failure in this step aborts the build
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BuildStep::PruneToolchain)
    }

    /// One-line description of what the step does for a descriptor
    pub fn describe(&self, d: &ImageDescriptor) -> String {
        match self {
            BuildStep::SelectBase => format!("Select base environment {}", d.base_image),
            BuildStep::Workdir => format!("Set working directory {}", d.workdir),
            BuildStep::InstallDependencies => format!(
                "Install dependencies from {} plus system packages: {}",
                d.manifest,
                d.system_packages.join(", ")
            ),
            BuildStep::PruneToolchain => {
                let prune = d.effective_prune_packages();
                if prune.is_empty() {
                    "Clear package caches".to_string()
                } else {
                    format!("Remove {} and clear package caches", prune.join(", "))
                }
            }
            BuildStep::CopySource => format!("Copy {}/ into {}", d.source_dir, d.workdir),
            BuildStep::EntryPoint => format!("Run `{}` on start", d.entrypoint),
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStep::SelectBase => "select-base",
            BuildStep::Workdir => "workdir",
            BuildStep::InstallDependencies => "install-dependencies",
            BuildStep::PruneToolchain => "prune-toolchain",
            BuildStep::CopySource => "copy-source",
            BuildStep::EntryPoint => "entrypoint",
        };
        f.pad(name)
    }
}

/// A build step as it will run for a particular descriptor
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub number: usize,
    pub step: BuildStep,
    pub description: String,
}

/// The ordered steps for `descriptor`, without touching any build context
pub fn plan_steps(descriptor: &ImageDescriptor) -> Vec<PlannedStep> {
    BuildStep::ALL
        .iter()
        .map(|step| PlannedStep {
            number: step.number(),
            step: *step,
            description: step.describe(descriptor),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum StepStatus {
    Done,
    Failed(String),
    NotReached,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: BuildStep,
    pub status: StepStatus,
    /// Cache key of the layer this step produces
    pub layer: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum BuildOutcome {
    Built,
    Aborted { step: BuildStep, reason: String },
}

/// Result of checking a descriptor against a build context
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub context: PathBuf,
    pub base_image: String,
    pub steps: Vec<StepReport>,
    pub outcome: BuildOutcome,
    /// Resolved dependency set, sorted
    pub dependencies: Vec<String>,
    pub source_files: usize,
    pub source_bytes: u64,
    pub checked_at: DateTime<Utc>,
}

impl BuildReport {
    pub fn is_built(&self) -> bool {
        self.outcome == BuildOutcome::Built
    }

    pub fn step(&self, step: BuildStep) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == step)
    }

    pub fn layer(&self, step: BuildStep) -> Option<&str> {
        self.step(step).and_then(|s| s.layer.as_deref())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &String> {
        self.steps.iter().flat_map(|s| s.warnings.iter())
    }
}

/// What a successful step hands to the next one
struct StepOutput {
    layer: String,
    warnings: Vec<String>,
}

/// Stateful walk over the steps; owns the running layer key
struct PlanRun<'a> {
    descriptor: &'a ImageDescriptor,
    context: &'a Path,
    previous_layer: String,
    dependencies: Vec<String>,
    source_files: usize,
    source_bytes: u64,
}

/// Check a descriptor against a build context directory
pub fn check_build(descriptor: &ImageDescriptor, context: &Path) -> BuildReport {
    info!(context = %context.display(), base = %descriptor.base_image, "Checking image build");

    let mut run = PlanRun {
        descriptor,
        context,
        previous_layer: String::new(),
        dependencies: Vec::new(),
        source_files: 0,
        source_bytes: 0,
    };
    let mut steps = Vec::with_capacity(BuildStep::ALL.len());
    let mut outcome = BuildOutcome::Built;

    for step in BuildStep::ALL {
        if outcome != BuildOutcome::Built {
            steps.push(StepReport {
                step,
                status: StepStatus::NotReached,
                layer: None,
                warnings: Vec::new(),
            });
            continue;
        }

        match run.execute(step) {
            Ok(output) => {
                for w in &output.warnings {
                    warn!(step = %step, "{}", w);
                }
                debug!(step = %step, layer = %output.layer, "Step complete");
                run.previous_layer = output.layer.clone();
                steps.push(StepReport {
                    step,
                    status: StepStatus::Done,
                    layer: Some(output.layer),
                    warnings: output.warnings,
                });
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(step = %step, "Build aborted: {}", reason);
                steps.push(StepReport {
                    step,
                    status: StepStatus::Failed(reason.clone()),
                    layer: None,
                    warnings: Vec::new(),
                });
                outcome = BuildOutcome::Aborted { step, reason };
            }
        }
    }

    BuildReport {
        context: context.to_path_buf(),
        base_image: descriptor.base_image.clone(),
        steps,
        outcome,
        dependencies: run.dependencies,
        source_files: run.source_files,
        source_bytes: run.source_bytes,
        checked_at: Utc::now(),
    }
}

impl PlanRun<'_> {
    fn execute(&mut self, step: BuildStep) -> Result<StepOutput> {
        match step {
            BuildStep::SelectBase => self.select_base(),
            BuildStep::Workdir => self.workdir(),
            BuildStep::InstallDependencies => self.install_dependencies(),
            BuildStep::PruneToolchain => Ok(self.prune_toolchain()),
            BuildStep::CopySource => self.copy_source(),
            BuildStep::EntryPoint => self.entrypoint(),
        }
    }

    fn select_base(&mut self) -> Result<StepOutput> {
        let image = BaseImage::resolve(&self.descriptor.base_image)?;
        Ok(StepOutput {
            layer: layer_key(&["base".as_bytes(), image.reference.as_bytes()]),
            warnings: Vec::new(),
        })
    }

    fn workdir(&mut self) -> Result<StepOutput> {
        let workdir = &self.descriptor.workdir;
        if !workdir.starts_with('/') {
            return Err(BenchError::InvalidDescriptor(format!(
                "working directory '{}' must be absolute",
                workdir
            )));
        }
        Ok(StepOutput {
            layer: layer_key(&[self.previous_layer.as_bytes(), workdir.as_bytes()]),
            warnings: Vec::new(),
        })
    }

    fn install_dependencies(&mut self) -> Result<StepOutput> {
        let d = self.descriptor;
        let manifest_path = self.context.join(&d.manifest);
        let manifest = load_manifest(&manifest_path)?;
        if manifest.is_empty() {
            return Err(BenchError::InvalidDescriptor(format!(
                "manifest {} declares no dependencies",
                d.manifest
            )));
        }
        let install_command = d.effective_install_command();
        if install_command.trim().is_empty() {
            return Err(BenchError::InvalidDescriptor(
                "install command is empty".to_string(),
            ));
        }
        if !install_command.contains(d.manifest.as_str()) {
            return Err(BenchError::InvalidDescriptor(format!(
                "install command '{}' does not reference manifest {}",
                install_command, d.manifest
            )));
        }
        if !d.installs_dictionary() {
            return Err(BenchError::InvalidDescriptor(format!(
                "system packages must include {} for the word list",
                DICTIONARY_PACKAGE
            )));
        }

        let mut warnings = Vec::new();
        let unpinned: Vec<String> = manifest.unpinned().iter().map(|s| s.canonical_name()).collect();
        if !unpinned.is_empty() {
            warnings.push(format!(
                "dependencies without an exact version: {}",
                unpinned.join(", ")
            ));
        }

        // Hashing the manifest bytes rather than the parsed set keeps the
        // key sensitive to anything the installer might read.
        let manifest_bytes = fs::read(&manifest_path)?;
        let layer = layer_key(&[
            self.previous_layer.as_bytes(),
            manifest_bytes.as_slice(),
            install_command.as_bytes(),
            d.system_packages.join(" ").as_bytes(),
            d.effective_prune_packages().join(" ").as_bytes(),
        ]);

        info!(count = manifest.len(), "Resolved manifest dependencies");
        self.dependencies = manifest.resolved_set();
        Ok(StepOutput { layer, warnings })
    }

    /// Runs in the install layer; never fails
    fn prune_toolchain(&mut self) -> StepOutput {
        let d = self.descriptor;
        let mut warnings = Vec::new();

        if d.prune_packages.iter().any(|p| p == DICTIONARY_PACKAGE) {
            warnings.push(format!(
                "{} is required at runtime and will not be pruned",
                DICTIONARY_PACKAGE
            ));
        }
        for pkg in d.effective_prune_packages() {
            if !d.system_packages.iter().any(|p| p == pkg) {
                warnings.push(format!("{} is not installed; nothing to prune", pkg));
            }
        }
        let leftover: Vec<&str> = d
            .system_packages
            .iter()
            .map(|p| p.as_str())
            .filter(|p| *p != DICTIONARY_PACKAGE && !d.prune_packages.iter().any(|q| q == p))
            .collect();
        if !leftover.is_empty() {
            warnings.push(format!(
                "build-only packages remain in the final image: {}",
                leftover.join(", ")
            ));
        }

        StepOutput {
            layer: self.previous_layer.clone(),
            warnings,
        }
    }

    fn copy_source(&mut self) -> Result<StepOutput> {
        let source = self.context.join(&self.descriptor.source_dir);
        if !source.is_dir() {
            return Err(BenchError::PathNotFound(source.display().to_string()));
        }

        let tree = TreeDigest::compute(&source)?;
        let mut warnings = Vec::new();
        if tree.files == 0 {
            warnings.push(format!("{} is empty", self.descriptor.source_dir));
        }

        self.source_files = tree.files;
        self.source_bytes = tree.bytes;
        Ok(StepOutput {
            layer: layer_key(&[self.previous_layer.as_bytes(), tree.digest.as_bytes()]),
            warnings,
        })
    }

    fn entrypoint(&mut self) -> Result<StepOutput> {
        let entry = &self.descriptor.entrypoint;
        if entry.interpreter.trim().is_empty() || entry.script.trim().is_empty() {
            return Err(BenchError::InvalidDescriptor(
                "entry point needs an interpreter and a script".to_string(),
            ));
        }
        if entry.script.split_whitespace().count() != 1 {
            return Err(BenchError::InvalidDescriptor(format!(
                "entry point script '{}' must be a single path with no arguments",
                entry.script
            )));
        }

        let mut warnings = Vec::new();
        let script = self
            .context
            .join(&self.descriptor.source_dir)
            .join(&entry.script);
        if !script.is_file() {
            warnings.push(format!(
                "{} not found in {}/",
                entry.script, self.descriptor.source_dir
            ));
        }

        let argv = entry.argv().join("\0");
        Ok(StepOutput {
            layer: layer_key(&[self.previous_layer.as_bytes(), argv.as_bytes()]),
            warnings,
        })
    }
}

/// Chain parts into a `sha256:` key. Each part is length-prefixed so that
/// moving bytes between parts changes the key.
fn layer_key(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    format!("sha256:{:x}", hasher.finalize())
}

/// Content digest of a directory tree, independent of walk order
struct TreeDigest {
    digest: String,
    files: usize,
    bytes: u64,
}

impl TreeDigest {
    fn compute(root: &Path) -> Result<Self> {
        let mut files = Vec::new();
        collect_files(root, root, &mut files)?;
        files.sort();

        let mut hasher = Sha256::new();
        let mut bytes = 0u64;
        for rel in &files {
            let content = fs::read(root.join(rel))?;
            bytes += content.len() as u64;
            let rel = rel.to_string_lossy();
            hasher.update((rel.len() as u64).to_le_bytes());
            hasher.update(rel.as_bytes());
            hasher.update((content.len() as u64).to_le_bytes());
            hasher.update(&content);
        }

        Ok(Self {
            digest: format!("sha256:{:x}", hasher.finalize()),
            files: files.len(),
            bytes,
        })
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else if path.is_file() {
            if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
        }
    }
    Ok(())
}
