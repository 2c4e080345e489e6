// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Deps action - harmonize dependency versions across project manifests

use crate::fmt::Reporter;
use crate::harmonize::{apply, collect};
use crate::types::{manifest_path, ProjectSet};
use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use std::fs;
use tracing::info;

/// Run the deps action: collect conflicting dependency versions across
/// the selected projects and rewrite every `package.json` to the winner.
pub fn run(set: &ProjectSet, dry_run: bool, reporter: &Reporter) -> Result<()> {
    let mut manifests = Vec::with_capacity(set.projects.len());
    for project in &set.projects {
        let path = manifest_path(&set.project_dir(&project.module));
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let manifest: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        manifests.push((project.module.clone(), manifest));
    }

    let plan = collect(&manifests);
    reporter.log("deps", &format!("Found {} dependencies to harmonize:", plan.len()));
    for entry in &plan {
        reporter.log(
            "deps",
            &format!(
                "- {}: {} ({})",
                entry.name.if_supports_color(Stream::Stdout, |t| t.cyan()),
                entry.winner.if_supports_color(Stream::Stdout, |t| t.red()),
                entry.versions.join(", ")
            ),
        );
    }

    if dry_run {
        reporter.warn("deps", "Dry run - skipping package.json updates");
        return Ok(());
    }

    reporter.warn("deps", "Updating package.json files");
    for (module, mut manifest) in manifests {
        if !apply(&mut manifest, &plan) {
            continue;
        }
        let path = manifest_path(&set.project_dir(&module));
        let content = serde_json::to_string_pretty(&manifest)
            .with_context(|| format!("Failed to serialize manifest for {module}"))?;
        info!("Rewriting {}", path.display());
        fs::write(&path, content + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::fmt::Reporter;
    use crate::types::{Project, ProjectSet};
    use std::fs;
    use tempfile::TempDir;

    fn scaffold(tmp: &TempDir) -> ProjectSet {
        fs::create_dir_all(tmp.path().join("one")).unwrap();
        fs::create_dir_all(tmp.path().join("two")).unwrap();
        fs::write(
            tmp.path().join("one/package.json"),
            r#"{"name": "one", "dependencies": {"x": "^1.0.0"}, "scripts": {"test": "mocha"}}"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join("two/package.json"),
            r#"{"name": "two", "dependencies": {"x": "~1.2.0"}}"#,
        )
        .unwrap();
        ProjectSet {
            projects: vec![Project::new("one"), Project::new("two")],
            controlling: "one".into(),
            root: tmp.path().join("one"),
        }
    }

    fn read_manifest(tmp: &TempDir, module: &str) -> serde_json::Value {
        let content =
            fs::read_to_string(tmp.path().join(module).join("package.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn rewrites_conflicting_versions_preserving_other_fields() {
        let tmp = TempDir::new().unwrap();
        let set = scaffold(&tmp);
        let reporter = Reporter::new(&set, true);

        run(&set, false, &reporter).unwrap();

        let one = read_manifest(&tmp, "one");
        assert_eq!(one["dependencies"]["x"], "~1.2.0");
        assert_eq!(one["scripts"]["test"], "mocha");
        let two = read_manifest(&tmp, "two");
        assert_eq!(two["dependencies"]["x"], "~1.2.0");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let set = scaffold(&tmp);
        let reporter = Reporter::new(&set, true);

        run(&set, true, &reporter).unwrap();

        let one = read_manifest(&tmp, "one");
        assert_eq!(one["dependencies"]["x"], "^1.0.0");
    }
}
