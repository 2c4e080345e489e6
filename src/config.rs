// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration loading - `.lankrc` discovery, normalization, validation

use crate::types::{manifest_name, manifest_path, Project, ProjectSet};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base name of the configuration file
pub const RC_NAME: &str = ".lankrc";

/// Tags given either as a single string or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(tag) => vec![tag],
            Self::Many(tags) => tags,
        }
    }
}

/// Per-module details in the keyed object shape
#[derive(Debug, Default, Deserialize)]
struct RawDetails {
    #[serde(default)]
    tags: OneOrMany,
}

/// One entry in the array shape: a bare module name or a full descriptor
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Name(String),
    Full {
        module: String,
        #[serde(default)]
        tags: OneOrMany,
    },
}

/// The accepted `.lankrc` document shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawConfig {
    Entries(Vec<RawEntry>),
    Keyed(BTreeMap<String, RawDetails>),
}

impl RawConfig {
    /// Convert to the canonical `{module, tags}` list
    fn normalize(self) -> Result<Vec<Project>> {
        let projects: Vec<Project> = match self {
            Self::Entries(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    RawEntry::Name(module) => Project::new(module.trim()),
                    RawEntry::Full { module, tags } => Project {
                        module: module.trim().to_string(),
                        tags: tags.into_vec(),
                    },
                })
                .collect(),
            Self::Keyed(map) => map
                .into_iter()
                .map(|(module, details)| Project {
                    module: module.trim().to_string(),
                    tags: details.tags.into_vec(),
                })
                .collect(),
        };

        if projects.is_empty() {
            bail!("Configuration data is empty");
        }
        if projects.iter().any(|p| p.module.is_empty()) {
            bail!("Configuration contains an empty module name");
        }

        Ok(projects)
    }
}

/// Candidate rc files, nearest first: the invocation directory, then its
/// parent (the sibling root for unscoped projects).
fn candidates(root: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for dir in [root.to_path_buf(), root.join("..")] {
        paths.push(dir.join(RC_NAME));
        paths.push(dir.join(format!("{RC_NAME}.json")));
        paths.push(dir.join(format!("{RC_NAME}.toml")));
    }
    paths
}

/// Parse a single rc file according to its extension
fn parse(path: &Path, content: &str) -> Result<RawConfig> {
    let is_toml = path.extension().and_then(|ext| ext.to_str()) == Some("toml");
    if is_toml {
        toml::from_str(content).with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Load and normalize configuration from the first rc file found
pub fn load(root: &Path) -> Result<Vec<Project>> {
    for path in candidates(root) {
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("Loading configuration from {}", path.display());
                return parse(&path, &content)?.normalize();
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", path.display()))
            }
        }
    }
    bail!("Unable to find configuration data ({RC_NAME})")
}

/// Read the controlling project name from `package.json` in `root`
fn controlling_name(root: &Path) -> Result<String> {
    let path = manifest_path(root);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let manifest: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    manifest_name(&manifest)
        .map(String::from)
        .with_context(|| format!("No name field in {}", path.display()))
}

/// Validate the project list against the local manifest and the sibling
/// directory layout, producing the resolved set.
///
/// The controlling-project check runs before any directory check so a bad
/// local manifest fails with the clearer error.
pub fn resolve(root: &Path, projects: Vec<Project>) -> Result<ProjectSet> {
    let controlling = controlling_name(root)?;
    if !projects.iter().any(|p| p.module == controlling) {
        bail!("Controlling project '{controlling}' is not in configuration");
    }

    let set = ProjectSet {
        projects,
        controlling,
        root: root.to_path_buf(),
    };

    let sibling_root = set.sibling_root();
    for project in &set.projects {
        let dir = sibling_root.join(&project.module);
        match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => bail!("Linked directory {} is not a directory", dir.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                bail!("Linked directory {} not found", dir.display())
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to stat {}", dir.display()))
            }
        }
    }

    Ok(set)
}

/// Load, validate, and filter configuration for one invocation
pub fn get_config(root: &Path, tags: &[String], modules: &[String]) -> Result<ProjectSet> {
    let projects = load(root)?;
    let mut set = resolve(root, projects)?;

    set.projects.retain(|p| {
        (tags.is_empty() || p.tags.iter().any(|t| tags.contains(t)))
            && (modules.is_empty() || modules.contains(&p.module))
    });

    if set.projects.is_empty() {
        let tags_msg = format!("Tags: '{}'.", tags.join("', '"));
        let mods_msg = format!("Modules: '{}'.", modules.join("', '"));
        bail!("Found no matching projects. {tags_msg} {mods_msg}");
    }

    Ok(set)
}
