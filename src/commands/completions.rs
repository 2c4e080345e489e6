// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Completions command - generate shell completion scripts

use anyhow::Result;
use clap_complete::Shell;
use std::io;

/// Generate completions for `shell` to stdout
pub fn run(shell: Shell, cli: &mut clap::Command) -> Result<()> {
    clap_complete::generate(shell, cli, "lank", &mut io::stdout());
    Ok(())
}
