//! Dependency manifest parsing
//!
//! A manifest lists one requirement specifier per logical line. Blank lines
//! and `#` comments are ignored, and a trailing `\` joins a line with the
//! next one.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

#[derive(Parser)]
#[grammar = "../grammar/manifest.pest"]
struct ManifestParser;

/// A single version constraint such as `>=2.31`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionConstraint {
    pub op: String,
    pub version: String,
}

/// One dependency declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    pub extras: Vec<String>,
    pub constraints: Vec<VersionConstraint>,
    pub url: Option<String>,
    pub marker: Option<String>,
    /// Line on which the specifier starts
    pub line: usize,
}

impl DependencySpec {
    /// Normalized package name: lowercase, with runs of `-`, `_` and `.` collapsed to `-`
    pub fn canonical_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut last_sep = false;
        for c in self.name.chars() {
            if matches!(c, '-' | '_' | '.') {
                if !last_sep {
                    out.push('-');
                }
                last_sep = true;
            } else {
                out.push(c.to_ascii_lowercase());
                last_sep = false;
            }
        }
        out
    }

    /// Whether the version is fixed exactly (`==` or `===` without wildcard)
    pub fn is_pinned(&self) -> bool {
        self.url.is_some()
            || self
                .constraints
                .iter()
                .any(|c| (c.op == "==" || c.op == "===") && !c.version.contains('*'))
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(ref url) = self.url {
            write!(f, " @ {}", url)?;
        } else {
            let parts: Vec<String> = self
                .constraints
                .iter()
                .map(|c| format!("{}{}", c.op, c.version))
                .collect();
            write!(f, "{}", parts.join(","))?;
        }
        if let Some(ref marker) = self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

/// Parsed dependency manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyManifest {
    pub dependencies: Vec<DependencySpec>,
    /// Installer options such as `--extra-index-url`
    pub options: Vec<String>,
}

impl DependencyManifest {
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// The dependency set the manifest resolves to, sorted so that two
    /// parses of the same manifest always compare equal
    pub fn resolved_set(&self) -> Vec<String> {
        let mut set: Vec<String> = self.dependencies.iter().map(|d| d.to_string()).collect();
        set.sort();
        set
    }

    /// Dependencies that do not pin an exact version
    pub fn unpinned(&self) -> Vec<&DependencySpec> {
        self.dependencies.iter().filter(|d| !d.is_pinned()).collect()
    }
}

/// Read and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<DependencyManifest> {
    if !path.is_file() {
        return Err(BenchError::PathNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    parse_manifest(&content)
}

/// Parse manifest text
pub fn parse_manifest(input: &str) -> Result<DependencyManifest> {
    let mut manifest = DependencyManifest::default();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (line, text) in logical_lines(input) {
        let pairs = ManifestParser::parse(Rule::entry, &text).map_err(|e| {
            BenchError::ManifestParse {
                line,
                message: e.variant.message().to_string(),
            }
        })?;

        let Some(entry) = pairs.into_iter().next() else {
            continue;
        };

        for inner in entry.into_inner() {
            match inner.as_rule() {
                Rule::option => manifest.options.push(inner.as_str().trim().to_string()),
                Rule::requirement => {
                    let spec = parse_requirement(inner, line)?;
                    let key = spec.canonical_name();
                    if let Some(first) = seen.get(&key) {
                        return Err(BenchError::ManifestParse {
                            line,
                            message: format!(
                                "duplicate dependency '{}' (first declared on line {})",
                                key, first
                            ),
                        });
                    }
                    seen.insert(key, line);
                    manifest.dependencies.push(spec);
                }
                _ => {}
            }
        }
    }

    Ok(manifest)
}

/// Join `\` continuations, keeping the line number each logical line starts on
fn logical_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (i, raw) in input.lines().enumerate() {
        let raw = raw.trim_end_matches('\r');
        let (start, mut buf) = pending.take().unwrap_or((i + 1, String::new()));
        match raw.strip_suffix('\\') {
            Some(head) => {
                buf.push_str(head);
                buf.push(' ');
                pending = Some((start, buf));
            }
            None => {
                buf.push_str(raw);
                lines.push((start, buf));
            }
        }
    }
    if let Some(last) = pending {
        lines.push(last);
    }

    lines
}

fn parse_requirement(pair: pest::iterators::Pair<Rule>, line: usize) -> Result<DependencySpec> {
    let mut spec = DependencySpec {
        name: String::new(),
        extras: Vec::new(),
        constraints: Vec::new(),
        url: None,
        marker: None,
        line,
    };

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::name => spec.name = inner.as_str().to_string(),
            Rule::extras => {
                spec.extras = inner.into_inner().map(|e| e.as_str().to_string()).collect();
            }
            Rule::constraints => {
                for c in inner.into_inner() {
                    let mut parts = c.into_inner();
                    let op = parts.next().map(|p| p.as_str().to_string());
                    let version = parts.next().map(|p| p.as_str().to_string());
                    match (op, version) {
                        (Some(op), Some(version)) => {
                            spec.constraints.push(VersionConstraint { op, version })
                        }
                        _ => {
                            return Err(BenchError::ManifestParse {
                                line,
                                message: "incomplete version constraint".to_string(),
                            })
                        }
                    }
                }
            }
            Rule::url_ref => {
                spec.url = inner.into_inner().next().map(|u| u.as_str().to_string());
            }
            Rule::marker => {
                spec.marker = inner
                    .into_inner()
                    .next()
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|m| !m.is_empty());
            }
            _ => {}
        }
    }

    Ok(spec)
}
