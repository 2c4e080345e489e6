// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Lank library - workflow tool for linked sibling projects
//!
//! This crate provides the core functionality for managing a set of
//! sibling projects developed together: running shell commands across
//! them, deleting stray `node_modules` link directories, and harmonizing
//! shared dependency versions.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod fmt;
pub mod harmonize;
pub mod linker;
pub mod runner;

/// Core data types for project configuration
pub mod types {
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};

    /// A single linked project from `.lankrc`
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Project {
        /// Sibling directory name, possibly scoped (`@org/name`)
        pub module: String,
        /// Free-form labels used to filter which actions apply
        #[serde(default)]
        pub tags: Vec<String>,
    }

    impl Project {
        /// Create a project with no tags
        #[must_use]
        pub fn new(module: impl Into<String>) -> Self {
            Self {
                module: module.into(),
                tags: Vec::new(),
            }
        }

        /// Whether the module name is scope-qualified (`@org/name`)
        #[must_use]
        pub fn is_scoped(&self) -> bool {
            self.module.starts_with('@')
        }
    }

    /// A validated, filtered set of projects for one invocation
    #[derive(Debug, Clone)]
    pub struct ProjectSet {
        /// Projects selected after tag/module filtering
        pub projects: Vec<Project>,
        /// Name of the controlling project (from the local `package.json`)
        pub controlling: String,
        /// Directory the tool was invoked from
        pub root: PathBuf,
    }

    impl ProjectSet {
        /// Relative offset from the invocation directory to the directory
        /// holding sibling projects. Scoped controlling projects live one
        /// level deeper (`@org/name`), so siblings sit at `../..`.
        #[must_use]
        pub fn sibling_offset(&self) -> &'static str {
            if self.controlling.starts_with('@') {
                "../.."
            } else {
                ".."
            }
        }

        /// Absolute directory holding all sibling projects
        #[must_use]
        pub fn sibling_root(&self) -> PathBuf {
            self.root.join(self.sibling_offset())
        }

        /// Directory for a given module. The controlling project maps to
        /// the invocation directory itself.
        #[must_use]
        pub fn project_dir(&self, module: &str) -> PathBuf {
            if module == self.controlling {
                self.root.clone()
            } else {
                self.sibling_root().join(module)
            }
        }

        /// Longest module name among selected projects, for log padding
        #[must_use]
        pub fn max_module_len(&self) -> usize {
            self.projects
                .iter()
                .map(|p| p.module.len())
                .max()
                .unwrap_or(0)
        }
    }

    /// Read the `name` field from a parsed `package.json` value
    #[must_use]
    pub fn manifest_name(manifest: &serde_json::Value) -> Option<&str> {
        manifest.get("name").and_then(serde_json::Value::as_str)
    }

    /// Path to the `package.json` of a project directory
    #[must_use]
    pub fn manifest_path(project_dir: &Path) -> PathBuf {
        project_dir.join("package.json")
    }

    #[cfg(test)]
    mod tests {
        use super::{Project, ProjectSet};
        use std::path::PathBuf;

        fn set(controlling: &str, modules: &[&str]) -> ProjectSet {
            ProjectSet {
                projects: modules.iter().map(|m| Project::new(*m)).collect(),
                controlling: controlling.into(),
                root: PathBuf::from("/work/one"),
            }
        }

        #[test]
        fn sibling_offset_is_parent_for_plain_names() {
            assert_eq!(set("one", &["one", "two"]).sibling_offset(), "..");
        }

        #[test]
        fn sibling_offset_is_grandparent_for_scoped_names() {
            assert_eq!(
                set("@org/red", &["@org/red", "two"]).sibling_offset(),
                "../.."
            );
        }

        #[test]
        fn controlling_project_dir_is_invocation_root() {
            let s = set("one", &["one", "two"]);
            assert_eq!(s.project_dir("one"), PathBuf::from("/work/one"));
            assert_eq!(s.project_dir("two"), PathBuf::from("/work/one/../two"));
        }

        #[test]
        fn max_module_len_tracks_longest_name() {
            assert_eq!(set("one", &["one", "fourteen"]).max_module_len(), 8);
        }
    }
}
