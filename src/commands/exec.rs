// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Exec action - run a shell command in all/tagged projects

use crate::fmt::Reporter;
use crate::runner::{self, RunOptions};
use crate::types::ProjectSet;
use anyhow::{bail, Result};
use tracing::info;

/// Run the exec action. `extra` holds everything after the `--` separator.
pub fn run(
    set: &ProjectSet,
    extra: &[String],
    opts: RunOptions,
    reporter: &Reporter,
) -> Result<()> {
    let cmd = extra.join(" ").trim().to_string();
    if cmd.is_empty() {
        bail!("A shell command must be provided like: 'lank exec -- pwd'");
    }

    info!("Executing across {} projects: {cmd}", set.projects.len());
    runner::run_all(set, &cmd, opts, reporter)
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::fmt::Reporter;
    use crate::runner::RunOptions;
    use crate::types::{Project, ProjectSet};
    use std::path::PathBuf;

    #[test]
    fn rejects_empty_shell_command() {
        let set = ProjectSet {
            projects: vec![Project::new("one")],
            controlling: "one".into(),
            root: PathBuf::from("."),
        };
        let reporter = Reporter::new(&set, true);

        let err = run(&set, &[], RunOptions::default(), &reporter).unwrap_err();
        assert!(err.to_string().contains("shell command must be provided"));

        let blank = vec![" ".to_string()];
        let err = run(&set, &blank, RunOptions::default(), &reporter).unwrap_err();
        assert!(err.to_string().contains("shell command must be provided"));
    }
}
