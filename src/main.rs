// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Lank CLI - workflow tool for linked sibling projects

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use lank::fmt::Reporter;
use lank::runner::RunOptions;
use lank::{commands, config};
use owo_colors::{OwoColorize, Stream};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lank")]
#[command(author, version, about = "Manage linked sibling projects", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Comma-delimited tags to filter commands to
    #[arg(short, long, global = true, value_delimiter = ',')]
    tags: Vec<String>,

    /// Comma-delimited modules to filter commands to
    #[arg(short, long, global = true, value_delimiter = ',')]
    modules: Vec<String>,

    /// Display actions without performing them
    #[arg(short, long, global = true)]
    dry_run: bool,

    /// Run actions sequentially, not in parallel
    #[arg(short, long, global = true)]
    series: bool,

    /// No additional lank output, pass through existing stdout/stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Don't buffer and replay output, display it immediately
    #[arg(short, long, global = true)]
    unbuffered: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand)]
enum Action {
    /// Execute a shell command in all/tagged projects
    Exec {
        /// Shell command to run, given after `--`
        #[arg(last = true)]
        extra: Vec<String>,
    },

    /// Delete ('link') controlled projects from node_modules
    Link,

    /// Harmonize dependencies in all project package.json files
    Deps,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn run(cli: Cli) -> Result<()> {
    // No action invokes help, as a successful run.
    let Some(action) = &cli.action else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Action::Completions { shell } = action {
        return commands::completions::run(*shell, &mut Cli::command());
    }

    let root = std::env::current_dir()?;
    let set = config::get_config(&root, &cli.tags, &cli.modules)?;
    let reporter = Reporter::new(&set, cli.quiet);

    match action {
        Action::Exec { extra } => {
            let opts = RunOptions {
                dry_run: cli.dry_run,
                series: cli.series,
                quiet: cli.quiet,
                unbuffered: cli.unbuffered,
            };
            commands::exec::run(&set, extra, opts, &reporter)?;
        }
        Action::Link => commands::link::run(&set, cli.dry_run, &reporter)?,
        Action::Deps => commands::deps::run(&set, cli.dry_run, &reporter)?,
        Action::Completions { .. } => unreachable!("handled above"),
    }

    reporter.log("main", "Done.");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let argv: Vec<String> = std::env::args().skip(1).collect();
            let invocation = format!("lank {}", argv.join(" "));
            eprintln!(
                "Command failed: {}",
                invocation.if_supports_color(Stream::Stderr, |t| t.dimmed())
            );
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, Cli};
    use clap::Parser;

    #[test]
    fn parses_exec_with_trailing_command() {
        let cli = Cli::parse_from(["lank", "exec", "--", "pwd", "-P"]);
        match cli.action {
            Some(Action::Exec { extra }) => assert_eq!(extra, vec!["pwd", "-P"]),
            _ => panic!("expected exec"),
        }
    }

    #[test]
    fn parses_comma_delimited_filters() {
        let cli = Cli::parse_from(["lank", "-t", "foo,bar", "-m", "one", "link"]);
        assert_eq!(cli.tags, vec!["foo", "bar"]);
        assert_eq!(cli.modules, vec!["one"]);
        assert!(matches!(cli.action, Some(Action::Link)));
    }

    #[test]
    fn rejects_unknown_action() {
        assert!(Cli::try_parse_from(["lank", "bogus"]).is_err());
    }

    #[test]
    fn rejects_stacked_actions() {
        assert!(Cli::try_parse_from(["lank", "exec", "link"]).is_err());
    }

    #[test]
    fn missing_action_parses_as_none() {
        let cli = Cli::try_parse_from(["lank", "--dry-run"]).unwrap();
        assert!(cli.action.is_none());
        assert!(cli.dry_run);
    }
}
