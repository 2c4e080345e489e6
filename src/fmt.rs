// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! User-facing output formatting with per-project prefixes

use crate::types::ProjectSet;
use owo_colors::{OwoColorize, Stream};

/// Writes `[lank:<key>]`-prefixed lines for action output.
///
/// Built once per invocation from the resolved project set. Padding is
/// fixed to the longest module name so columns line up across projects.
/// Passed explicitly through call parameters rather than held as
/// process-wide state.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    pad: usize,
    quiet: bool,
}

impl Reporter {
    /// Build a reporter sized to the selected projects
    #[must_use]
    pub fn new(set: &ProjectSet, quiet: bool) -> Self {
        Self {
            pad: set.max_module_len().max("link".len()),
            quiet,
        }
    }

    fn prefix(self, key: &str) -> String {
        let tag = format!("[lank:{key:<pad$}]", pad = self.pad);
        tag.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    /// Plain informational line
    pub fn log(&self, key: &str, msg: &str) {
        if self.quiet {
            return;
        }
        println!("{} {msg}", self.prefix(key));
    }

    /// Highlighted line for mutating or skipped-mutation steps
    pub fn warn(&self, key: &str, msg: &str) {
        if self.quiet {
            return;
        }
        println!(
            "{} {}",
            self.prefix(key),
            msg.if_supports_color(Stream::Stdout, |t| t.yellow())
        );
    }
}
