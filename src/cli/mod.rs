//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::{Config, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// DFA State Visualizer CLI
#[derive(Parser, Debug)]
#[command(name = "dfa-state-viz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (overrides config)
    #[arg(long, global = true, env = "DFA_STATE_VIZ_LOG")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Which machine to load
#[derive(Args, Debug, Clone, Default)]
pub struct MachineArgs {
    /// Built-in machine key (see `list`)
    #[arg(short, long, conflicts_with = "file")]
    pub machine: Option<String>,

    /// Declaration file (.toml or .json)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in machines
    List,

    /// Classify words
    Check {
        #[command(flatten)]
        machine: MachineArgs,

        /// Words to classify (every char is one symbol)
        #[arg(required = true)]
        words: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: ReportFormat,
    },

    /// Show every step taken while reading a word
    Trace {
        #[command(flatten)]
        machine: MachineArgs,

        /// Word to trace; empty traces the start state only
        #[arg(default_value = "")]
        word: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: ReportFormat,
    },

    /// Show the structure of a machine
    Show {
        #[command(flatten)]
        machine: MachineArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "tui")]
        output: OutputFormat,

        /// Pre-filled input for the visualizer
        #[arg(long)]
        input: Option<String>,
    },

    /// Visualize a declaration file, reloading it when it changes
    Watch {
        /// Declaration file (.toml or .json)
        file: PathBuf,

        /// Polling interval in seconds (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Validate a declaration file
    Validate {
        /// Declaration file (.toml or .json)
        file: PathBuf,
    },
}

impl Commands {
    /// Whether the command takes over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            Commands::Show {
                output: OutputFormat::Tui,
                ..
            } | Commands::Watch { .. }
        )
    }
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// DOT format (Graphviz)
    Dot,
    /// Interactive TUI
    Tui,
    /// Plain text table
    Table,
}

/// Output formats for non-graphical reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// JSON output
    Json,
    /// Plain text table
    Table,
}

/// Execute the CLI command
pub async fn execute(args: Cli, config: Config) -> Result<()> {
    let mut out = std::io::stdout();
    match args.command {
        Commands::List => commands::list::execute(&mut out),
        Commands::Check {
            machine,
            words,
            output,
        } => commands::check::execute(&mut out, &machine, &words, output, &config),
        Commands::Trace {
            machine,
            word,
            output,
        } => commands::trace::execute(&mut out, &machine, &word, output, &config),
        Commands::Show {
            machine,
            output,
            input,
        } => commands::show::execute(&mut out, &machine, output, input, &config),
        Commands::Watch { file, interval } => {
            commands::watch::execute(file, interval, config).await
        }
        Commands::Validate { file } => commands::validate::execute(&mut out, &file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "dfa-state-viz",
            "check",
            "--machine",
            "bb-suffix",
            "abb",
            "ab",
        ]);
        assert!(cli.is_ok());

        let Commands::Check { machine, words, output } = cli.unwrap().command else {
            panic!("expected check command");
        };
        assert_eq!(machine.machine.as_deref(), Some("bb-suffix"));
        assert_eq!(words, vec!["abb", "ab"]);
        assert_eq!(output, ReportFormat::Table);
    }

    #[test]
    fn test_machine_and_file_conflict() {
        let cli = Cli::try_parse_from([
            "dfa-state-viz",
            "show",
            "--machine",
            "bb-suffix",
            "--file",
            "m.toml",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_interactive_commands() {
        let show = Cli::try_parse_from(["dfa-state-viz", "show"]).unwrap();
        assert!(show.command.is_interactive());

        let dot = Cli::try_parse_from(["dfa-state-viz", "show", "-o", "dot"]).unwrap();
        assert!(!dot.command.is_interactive());

        let watch = Cli::try_parse_from(["dfa-state-viz", "watch", "m.toml"]).unwrap();
        assert!(watch.command.is_interactive());
    }
}
