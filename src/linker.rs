// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Recursive search for linked-project directories in `node_modules` trees

use crate::types::Project;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Directory name dependency managers install into
pub const MODULES_DIR: &str = "node_modules";

/// Build the lookup set of configured module names. Scoped modules keep
/// their composite `@scope/name` form.
#[must_use]
pub fn module_lookup(projects: &[Project]) -> HashSet<String> {
    projects.iter().map(|p| p.module.clone()).collect()
}

/// File name of a path as UTF-8, lossily
fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List entry names of a directory, tolerating benign absences.
///
/// `node_modules` trees contain symlinks whose targets may be gone, and
/// plain files like `node_modules/README.md` reached through recursion.
/// Both cases yield an empty listing; other I/O errors are fatal.
fn list_dir(dir: &Path) -> Result<Option<Vec<String>>> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => return Ok(None),
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to stat {}", dir.display()))
        }
    }

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(Some(names))
}

/// Recursively find directories under `dir` whose (scope-qualified) name
/// matches a known module.
///
/// Matches are only recognized as direct children of a `node_modules`
/// node or of an `@scope` directory below one; a directory named like a
/// module anywhere else in an ordinary source tree is never a match.
pub fn find_links(lookup: &HashSet<String>, dir: &Path) -> Result<Vec<PathBuf>> {
    let Some(names) = list_dir(dir)? else {
        return Ok(Vec::new());
    };

    let parent_name = dir.parent().map(base_name).unwrap_or_default();
    let current = base_name(dir);

    let at_modules = current == MODULES_DIR;
    let at_scope = parent_name == MODULES_DIR && current.starts_with('@');

    // Qualify names with the scope when inside an `@scope` directory so
    // the lookup sees the composite `@scope/name` key.
    let is_match = |name: &str| {
        if at_scope {
            lookup.contains(&format!("{current}/{name}"))
        } else {
            lookup.contains(name)
        }
    };

    if at_modules || at_scope {
        let mut found = Vec::new();
        for name in &names {
            if name.starts_with('.') {
                continue;
            }
            let path = dir.join(name);
            if is_match(name) {
                // Follow symlinks: an npm-linked entry points at a live
                // directory. A stray plain file or dangling symlink with
                // a module name is not a link candidate.
                match fs::metadata(&path) {
                    Ok(meta) if meta.is_dir() => {
                        trace!("Link match: {}", path.display());
                        found.push(path);
                    }
                    Ok(_) => {}
                    Err(err) if err.kind() == ErrorKind::NotFound => {}
                    Err(err) => {
                        return Err(err)
                            .with_context(|| format!("Failed to stat {}", path.display()))
                    }
                }
            } else {
                found.extend(find_links(lookup, &path)?);
            }
        }
        return Ok(found);
    }

    // Outside a dependency root: only a nested `node_modules` child can
    // lead to further matches.
    if names.iter().any(|n| n == MODULES_DIR) {
        return find_links(lookup, &dir.join(MODULES_DIR));
    }

    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::{find_links, module_lookup, MODULES_DIR};
    use crate::types::Project;
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn mkdirs(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    fn lookup(modules: &[&str]) -> HashSet<String> {
        module_lookup(
            &modules
                .iter()
                .map(|m| Project::new(*m))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn finds_direct_child_of_node_modules() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["node_modules/two", "node_modules/other"]);

        let found =
            find_links(&lookup(&["two"]), &tmp.path().join(MODULES_DIR)).unwrap();
        assert_eq!(found, vec![tmp.path().join("node_modules/two")]);
    }

    #[test]
    fn finds_scoped_and_nested_matches() {
        let tmp = TempDir::new().unwrap();
        mkdirs(
            tmp.path(),
            &[
                "node_modules/@scope/two",
                "node_modules/@scope/other/node_modules/three",
                "node_modules/out-of-scope",
            ],
        );

        let mut found =
            find_links(&lookup(&["@scope/two", "three"]), &tmp.path().join(MODULES_DIR))
                .unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![
                tmp.path().join("node_modules/@scope/other/node_modules/three"),
                tmp.path().join("node_modules/@scope/two"),
            ]
        );
    }

    #[test]
    fn ignores_module_named_directory_outside_node_modules() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["src/two", "two"]);

        let found = find_links(&lookup(&["two"]), tmp.path()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn skips_dot_entries() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["node_modules/.bin", "node_modules/two"]);

        let found =
            find_links(&lookup(&["two", ".bin"]), &tmp.path().join(MODULES_DIR)).unwrap();
        assert_eq!(found, vec![tmp.path().join("node_modules/two")]);
    }

    #[test]
    fn missing_start_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let found =
            find_links(&lookup(&["two"]), &tmp.path().join(MODULES_DIR)).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn plain_file_in_node_modules_is_empty_branch() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["node_modules"]);
        fs::write(tmp.path().join("node_modules/README.md"), "docs").unwrap();

        let found =
            find_links(&lookup(&["two"]), &tmp.path().join(MODULES_DIR)).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn stray_file_with_module_name_is_not_matched() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["node_modules"]);
        fs::write(tmp.path().join("node_modules/two"), "not a directory").unwrap();

        let found =
            find_links(&lookup(&["two"]), &tmp.path().join(MODULES_DIR)).unwrap();
        assert!(found.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_module_directory_is_matched() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["two", "node_modules"]);
        std::os::unix::fs::symlink(
            tmp.path().join("two"),
            tmp.path().join("node_modules/two"),
        )
        .unwrap();

        let found =
            find_links(&lookup(&["two"]), &tmp.path().join(MODULES_DIR)).unwrap();
        assert_eq!(found, vec![tmp.path().join("node_modules/two")]);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_not_matched() {
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["node_modules"]);
        std::os::unix::fs::symlink(
            tmp.path().join("gone"),
            tmp.path().join("node_modules/two"),
        )
        .unwrap();

        let found =
            find_links(&lookup(&["two"]), &tmp.path().join(MODULES_DIR)).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn unscoped_name_does_not_match_inside_scope_dir() {
        // `two` is configured unscoped; `@scope/two` on disk must not match.
        let tmp = TempDir::new().unwrap();
        mkdirs(tmp.path(), &["node_modules/@scope/two"]);

        let found =
            find_links(&lookup(&["two"]), &tmp.path().join(MODULES_DIR)).unwrap();
        assert!(found.is_empty());
    }
}
