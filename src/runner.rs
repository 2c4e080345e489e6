// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Shell-command execution across the selected projects

use crate::fmt::Reporter;
use crate::types::{Project, ProjectSet};
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Behavior flags for a run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Report what would run without spawning anything
    pub dry_run: bool,
    /// Run projects one after another instead of in parallel
    pub series: bool,
    /// Pass child stdio through untouched, no lank framing
    pub quiet: bool,
    /// Stream child stdio directly instead of buffering per project
    pub unbuffered: bool,
}

/// `NODE_PATH` for children: the sibling root prepended to any existing
/// value, so deleted links resolve to the live sibling sources.
fn node_path(set: &ProjectSet) -> Result<OsString> {
    let mut paths = vec![set.sibling_root()];
    if let Some(existing) = env::var_os("NODE_PATH") {
        paths.extend(env::split_paths(&existing));
    }
    env::join_paths(paths).context("Failed to build NODE_PATH")
}

/// Run `cmd` through the system shell in one project directory
fn run_one(
    set: &ProjectSet,
    project: &Project,
    cmd: &str,
    opts: RunOptions,
    reporter: &Reporter,
) -> Result<()> {
    let dir = set.project_dir(&project.module);
    reporter.log(&project.module, &format!("Running: {cmd}"));

    if opts.dry_run {
        reporter.warn(&project.module, "Dry run - skipping exec");
        return Ok(());
    }

    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(cmd)
        .current_dir(&dir)
        .env("NODE_PATH", node_path(set)?);

    debug!("Spawning in {}: {cmd}", dir.display());

    let code = if opts.quiet || opts.unbuffered {
        let status = command
            .stdin(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to spawn '{cmd}' in {}", dir.display()))?;
        status.code()
    } else {
        let output = command
            .output()
            .with_context(|| format!("Failed to spawn '{cmd}' in {}", dir.display()))?;
        if !output.stdout.is_empty() {
            reporter.log(&project.module, "stdout:");
            std::io::stdout()
                .write_all(&output.stdout)
                .context("Failed to write captured stdout")?;
        }
        if !output.stderr.is_empty() {
            reporter.log(&project.module, "stderr:");
            std::io::stderr()
                .write_all(&output.stderr)
                .context("Failed to write captured stderr")?;
        }
        output.status.code()
    };

    match code {
        Some(0) => Ok(()),
        Some(code) => bail!("Command failed in '{}' with exit code {code}", project.module),
        None => bail!("Command terminated by signal in '{}'", project.module),
    }
}

/// Run `cmd` in every selected project.
///
/// Parallel by default with one worker per project, joined at the end;
/// a failing project does not cancel siblings already in flight, and the
/// first failure is the one reported. `--series` degrades to a plain
/// ordered loop that stops at the first failure.
pub fn run_all(
    set: &ProjectSet,
    cmd: &str,
    opts: RunOptions,
    reporter: &Reporter,
) -> Result<()> {
    if opts.series {
        for project in &set.projects {
            run_one(set, project, cmd, opts, reporter)?;
        }
        return Ok(());
    }

    let results: Vec<Result<()>> = thread::scope(|scope| {
        let handles: Vec<_> = set
            .projects
            .iter()
            .map(|project| scope.spawn(move || run_one(set, project, cmd, opts, reporter)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("exec worker panicked")))
            })
            .collect()
    });

    for result in results {
        result?;
    }
    Ok(())
}
