// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Link action - delete controlled projects from `node_modules` trees

use crate::fmt::Reporter;
use crate::linker::{find_links, module_lookup, MODULES_DIR};
use crate::types::ProjectSet;
use anyhow::{Context, Result};
use std::fs;
use tracing::info;

/// Run the link action: find every `node_modules` entry shadowing a
/// configured module and delete it (unless `dry_run`).
pub fn run(set: &ProjectSet, dry_run: bool, reporter: &Reporter) -> Result<()> {
    let lookup = module_lookup(&set.projects);

    let mut found = Vec::new();
    for project in &set.projects {
        let start = set.project_dir(&project.module).join(MODULES_DIR);
        found.extend(find_links(&lookup, &start)?);
    }

    let listing: String = found
        .iter()
        .map(|path| format!("\n- {}", path.display()))
        .collect();
    reporter.log(
        "link",
        &format!("Found {} directories to delete:{listing}", found.len()),
    );

    if dry_run {
        reporter.warn("link", "Dry run - skipping deletes");
        return Ok(());
    }

    reporter.warn("link", "Deleting linked dependencies");
    for path in &found {
        info!("Removing {}", path.display());
        // Matches can be real directories or npm-link symlinks; remove
        // the link itself, never its target.
        let meta = fs::symlink_metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        if meta.file_type().is_dir() {
            fs::remove_dir_all(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        } else {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }

    Ok(())
}
