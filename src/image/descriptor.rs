//! Image descriptor: the inputs of the build-and-launch contract

use std::fmt;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

pub const DEFAULT_BASE_IMAGE: &str = "python:3.11-slim";
pub const DEFAULT_WORKDIR: &str = "/app";
pub const DEFAULT_MANIFEST: &str = "requirements.txt";
pub const DEFAULT_SOURCE_DIR: &str = "app";

/// Native compiler toolchain needed only while dependencies build
pub const TOOLCHAIN_PACKAGE: &str = "build-essential";
/// Package that provides [`DICTIONARY_PATH`]
pub const DICTIONARY_PACKAGE: &str = "wamerican";
pub const DICTIONARY_PATH: &str = "/usr/share/dict/words";

const IMAGE_REFERENCE: &str = r"^(?:(?P<registry>[A-Za-z0-9.-]+(?::[0-9]+)?)/)?(?P<name>[a-z0-9]+(?:[._/-][a-z0-9]+)*)(?::(?P<tag>[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}))?(?:@(?P<digest>sha256:[a-f0-9]{64}))?$";

/// Process launched when the built image is instantiated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub interpreter: String,
    pub script: String,
}

impl EntryPoint {
    /// Exec-form argument vector: the interpreter and one script, nothing else
    pub fn argv(&self) -> Vec<String> {
        vec![self.interpreter.clone(), self.script.clone()]
    }
}

impl Default for EntryPoint {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            script: "run_experiments.py".to_string(),
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interpreter, self.script)
    }
}

/// Everything needed to build and launch the experiment image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageDescriptor {
    pub base_image: String,
    pub workdir: String,
    /// Manifest path, relative to the build context
    pub manifest: String,
    /// Custom installer invocation; must reference the manifest. When
    /// absent the command is derived from `manifest`.
    pub install_command: Option<String>,
    pub system_packages: Vec<String>,
    pub prune_packages: Vec<String>,
    /// Application tree, relative to the build context
    pub source_dir: String,
    pub entrypoint: EntryPoint,
}

impl Default for ImageDescriptor {
    fn default() -> Self {
        Self {
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            workdir: DEFAULT_WORKDIR.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
            install_command: None,
            system_packages: vec![TOOLCHAIN_PACKAGE.to_string(), DICTIONARY_PACKAGE.to_string()],
            prune_packages: vec![TOOLCHAIN_PACKAGE.to_string()],
            source_dir: DEFAULT_SOURCE_DIR.to_string(),
            entrypoint: EntryPoint::default(),
        }
    }
}

impl ImageDescriptor {
    /// Load a descriptor from JSON; absent fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BenchError::PathNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Prune list with the dictionary package removed; the word list must
    /// survive the cleanup step
    pub fn effective_prune_packages(&self) -> Vec<&str> {
        self.prune_packages
            .iter()
            .map(|p| p.as_str())
            .filter(|p| *p != DICTIONARY_PACKAGE)
            .collect()
    }

    pub fn effective_install_command(&self) -> String {
        match &self.install_command {
            Some(cmd) => cmd.clone(),
            None => format!("pip install --no-cache-dir -r {}", self.manifest),
        }
    }

    pub fn installs_dictionary(&self) -> bool {
        self.system_packages.iter().any(|p| p == DICTIONARY_PACKAGE)
    }
}

/// A parsed base image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseImage {
    pub reference: String,
    pub registry: Option<String>,
    pub name: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl BaseImage {
    pub fn parse(reference: &str) -> Result<Self> {
        let re = Regex::new(IMAGE_REFERENCE)
            .map_err(|e| BenchError::InvalidDescriptor(e.to_string()))?;
        let caps = re.captures(reference.trim()).ok_or_else(|| {
            BenchError::InvalidDescriptor(format!("malformed base image reference '{}'", reference))
        })?;

        Ok(Self {
            reference: reference.trim().to_string(),
            registry: caps.name("registry").map(|m| m.as_str().to_string()),
            name: caps["name"].to_string(),
            tag: caps.name("tag").map(|m| m.as_str().to_string()),
            digest: caps.name("digest").map(|m| m.as_str().to_string()),
        })
    }

    /// A reference is pinned when it names a digest, or a tag that carries
    /// a version number and is not `latest`
    pub fn is_pinned(&self) -> bool {
        if self.digest.is_some() {
            return true;
        }
        match self.tag {
            Some(ref tag) => tag != "latest" && tag.chars().any(|c| c.is_ascii_digit()),
            None => false,
        }
    }

    /// Parse and require a pinned reference
    pub fn resolve(reference: &str) -> Result<Self> {
        let image = Self::parse(reference)?;
        if !image.is_pinned() {
            return Err(BenchError::InvalidDescriptor(format!(
                "base image '{}' is not pinned to a version",
                reference
            )));
        }
        Ok(image)
    }
}
