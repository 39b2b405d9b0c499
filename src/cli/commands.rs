//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::{
    Config, Result,
    cli::MachineArgs,
    source::{MachineSource, create_source},
    state_machine::Automaton,
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Resolve the machine arguments to a source and build it
fn load_machine(args: &MachineArgs, config: &Config) -> Result<(String, Automaton)> {
    let source = create_source(args.machine.as_deref(), args.file.clone(), config)?;
    let label = source.label();
    tracing::info!("Loading machine: {}", label);

    let automaton = source.build()?;
    tracing::debug!(
        "Built {} with {} states, start {}",
        label,
        automaton.graph().len(),
        automaton.start()
    );
    Ok((label, automaton))
}

/// List command implementation
pub mod list {
    use super::*;

    /// Execute the list command
    pub fn execute(out: &mut impl Write) -> Result<()> {
        crate::cli::output::output_list(out, crate::source::registry())
    }
}

/// Check command implementation
pub mod check {
    use super::*;
    use crate::cli::{
        ReportFormat,
        output::{Verdict, output_check_json, output_check_table},
    };

    /// Execute the check command
    pub fn execute(
        out: &mut impl Write,
        machine: &MachineArgs,
        words: &[String],
        format: ReportFormat,
        config: &Config,
    ) -> Result<()> {
        let (label, automaton) = load_machine(machine, config)?;

        tracing::info!("Checking {} words", words.len());
        let verdicts: Vec<Verdict> = words
            .iter()
            .map(|word| {
                let last = automaton.run(word.chars());
                Verdict {
                    word: word.clone(),
                    final_state: last.name().to_string(),
                    accepted: last.classify(),
                }
            })
            .collect();

        match format {
            ReportFormat::Json => output_check_json(out, &label, &verdicts),
            ReportFormat::Table => output_check_table(out, &label, &verdicts),
        }
    }
}

/// Trace command implementation
pub mod trace {
    use super::*;
    use crate::cli::{
        ReportFormat,
        output::{output_trace_json, output_trace_table},
    };

    /// Execute the trace command
    pub fn execute(
        out: &mut impl Write,
        machine: &MachineArgs,
        word: &str,
        format: ReportFormat,
        config: &Config,
    ) -> Result<()> {
        let (label, automaton) = load_machine(machine, config)?;

        let trace = automaton.trace(word);
        tracing::info!(
            "Traced {} symbols, final state {}",
            trace.steps().len(),
            trace.final_state()
        );

        match format {
            ReportFormat::Json => output_trace_json(out, &label, word, &trace),
            ReportFormat::Table => output_trace_table(out, &label, word, &trace),
        }
    }
}

/// Show command implementation
pub mod show {
    use super::*;
    use crate::cli::{
        OutputFormat,
        output::{output_structure_json, output_structure_table},
    };
    use crate::state_machine::{analyzer::analyze, compute_layout};
    use crate::tui::{self, app::App};

    /// Execute the show command
    pub fn execute(
        out: &mut impl Write,
        machine: &MachineArgs,
        format: OutputFormat,
        input: Option<String>,
        config: &Config,
    ) -> Result<()> {
        let (label, automaton) = load_machine(machine, config)?;

        match format {
            OutputFormat::Json | OutputFormat::Table => {
                let layout = compute_layout(
                    automaton.start(),
                    config.layout.horizontal_gap,
                    config.layout.vertical_gap,
                );
                let report = analyze(&automaton);
                if format == OutputFormat::Json {
                    output_structure_json(out, &label, &automaton, &layout, &report)
                } else {
                    output_structure_table(out, &label, &automaton, &layout, &report)
                }
            }
            OutputFormat::Dot => {
                writeln!(out, "{}", automaton.graph().to_dot())?;
                Ok(())
            }
            OutputFormat::Tui => {
                tracing::info!("Launching TUI...");
                let mut app = App::new(automaton, label, config);
                if let Some(input) = input {
                    app.set_input(input);
                }
                tui::run(app, None, config.tui.tick_rate())
            }
        }
    }
}

/// Watch command implementation
pub mod watch {
    use super::*;
    use crate::source::FileMachine;
    use crate::tui::{self, WatchUpdate, app::App};
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Rebuild from freshly read contents, or `None` when nothing changed
    pub(crate) fn reload(
        source: &FileMachine,
        label: &str,
        previous: &str,
        contents: &str,
    ) -> Option<WatchUpdate> {
        if contents == previous {
            return None;
        }

        tracing::info!("{} changed, rebuilding", label);
        let update = match source.build_from(contents) {
            Ok(automaton) => WatchUpdate::Reloaded(automaton, label.to_string()),
            Err(e) => {
                tracing::warn!("Rebuild of {} failed: {}", label, e);
                WatchUpdate::Failed(e.to_string())
            }
        };
        Some(update)
    }

    /// Execute the watch command
    pub async fn execute(file: PathBuf, interval: Option<u64>, config: Config) -> Result<()> {
        let interval = interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.watch.interval());
        crate::ensure!(!interval.is_zero(), "watch interval must be at least 1 second");

        // Initial load must succeed, there is nothing to fall back to yet
        let source = FileMachine::new(file);
        let label = source.label();
        let task_label = label.clone();
        let mut last_contents = source.read_contents()?;
        let automaton = source.build_from(&last_contents)?;

        // Setup channel
        let (tx_sender, rx_receiver) = mpsc::channel(1);

        let watcher = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // First tick is immediate and the file was just loaded
            loop {
                ticker.tick().await;

                let update = match tokio::fs::read_to_string(&source.path).await {
                    Ok(contents) => {
                        let update = reload(&source, &task_label, &last_contents, &contents);
                        last_contents = contents;
                        match update {
                            Some(update) => update,
                            None => continue,
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read {:?}: {}", source.path, e);
                        WatchUpdate::Failed(format!("read failed: {}", e))
                    }
                };
                if tx_sender.send(update).await.is_err() {
                    break; // Receiver closed
                }
            }
        });

        tracing::info!("Launching TUI in watch mode...");
        let app = App::new(automaton, label, &config);
        let result = tui::run(app, Some(rx_receiver), config.tui.tick_rate());
        watcher.abort();
        result
    }
}

/// Validate command implementation
pub mod validate {
    use super::*;
    use crate::source::FileMachine;
    use crate::state_machine::analyzer::analyze;

    /// Execute the validate command
    pub fn execute(out: &mut impl Write, path: &Path) -> Result<()> {
        tracing::info!("Validating declaration file: {:?}", path);

        let source = FileMachine::new(path);
        let declarations = match source.declarations() {
            Ok(declarations) => declarations,
            Err(e) => {
                writeln!(out, "❌ Failed to load declarations: {}", e)?;
                return Err(e);
            }
        };

        writeln!(out, "📋 Declaration Validation Report")?;
        writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(out, "File: {:?}", path)?;
        writeln!(out)?;
        writeln!(out, "States: {}", declarations.len())?;
        for declaration in &declarations {
            let marker = if declaration.is_accepting {
                " (accepting)"
            } else {
                ""
            };
            let fallback = if declaration.fallback.is_some() {
                " + else"
            } else {
                ""
            };
            writeln!(
                out,
                "    - {}{}: {} transition(s){}",
                declaration.name,
                marker,
                declaration.transitions.len(),
                fallback
            )?;
        }
        writeln!(out)?;

        let automaton = match Automaton::from_declarations(&declarations) {
            Ok(automaton) => automaton,
            Err(e) => {
                let kind = if e.is_construction_error() {
                    "wiring"
                } else {
                    "input"
                };
                writeln!(out, "❌ Errors:")?;
                writeln!(out, "   {} ({})", e, kind)?;
                writeln!(out)?;
                writeln!(out, "❌ Declaration validation failed")?;
                return Err(e);
            }
        };

        let report = analyze(&automaton);
        let stats = automaton.graph().stats();
        writeln!(
            out,
            "Wired: {} transitions, {} accepting, {} sink(s)",
            stats.total_transitions, stats.accepting_states, stats.sink_states
        )?;
        writeln!(out)?;
        if !report.unreachable.is_empty() {
            writeln!(out, "⚠️  Warnings:")?;
            for name in &report.unreachable {
                writeln!(
                    out,
                    "   State {} is not reachable from {}",
                    name,
                    automaton.start()
                )?;
            }
            writeln!(out)?;
        }
        if report.accepting.is_empty() {
            writeln!(out, "⚠️  No reachable accepting state: every word is rejected")?;
            writeln!(out)?;
        }

        writeln!(
            out,
            "✅ Declarations are valid! ({}, start {})",
            report.shape.display_name(),
            automaton.start()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputFormat, ReportFormat};

    fn builtin(key: &str) -> MachineArgs {
        MachineArgs {
            machine: Some(key.to_string()),
            file: None,
        }
    }

    fn declaration_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_list_command() {
        let mut out = Vec::new();
        list::execute(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("three-in-a-row"));
    }

    #[test]
    fn test_check_command() {
        let mut out = Vec::new();
        let words = vec!["abb".to_string(), "ba".to_string()];
        check::execute(
            &mut out,
            &builtin("bb-suffix"),
            &words,
            ReportFormat::Json,
            &Config::default(),
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["words"][0]["accepted"], true);
        assert_eq!(value["words"][1]["accepted"], false);
    }

    #[test]
    fn test_check_unknown_machine() {
        let mut out = Vec::new();
        let result = check::execute(
            &mut out,
            &builtin("nope"),
            &["a".to_string()],
            ReportFormat::Table,
            &Config::default(),
        );
        assert!(matches!(result, Err(crate::Error::UnknownMachine(_))));
    }

    #[test]
    fn test_trace_command() {
        let mut out = Vec::new();
        trace::execute(
            &mut out,
            &builtin("bb-suffix"),
            "abb",
            ReportFormat::Table,
            &Config::default(),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Final state Z2 -> accepted"));
    }

    #[test]
    fn test_show_dot_from_file() {
        let file = declaration_file(
            r#"
[[state]]
name = "S"
else = "T"

[[state]]
name = "T"
accepting = true
"#,
        );
        let args = MachineArgs {
            machine: None,
            file: Some(file.path().to_path_buf()),
        };

        let mut out = Vec::new();
        show::execute(&mut out, &args, OutputFormat::Dot, None, &Config::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("digraph"));
        assert!(text.contains("doublecircle"));
    }

    #[test]
    fn test_validate_reports_unreachable() {
        let file = declaration_file(
            r#"
[[state]]
name = "A"
accepting = true

[[state]]
name = "B"
transitions = { x = "A" }
"#,
        );

        let mut out = Vec::new();
        validate::execute(&mut out, file.path()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("State B is not reachable from A"));
        assert!(text.contains("✅"));
    }

    #[test]
    fn test_validate_rejects_unresolved() {
        let file = declaration_file(
            r#"
[[state]]
name = "A"
else = "Missing"
"#,
        );

        let mut out = Vec::new();
        let result = validate::execute(&mut out, file.path());
        assert!(matches!(
            result,
            Err(crate::Error::UnresolvedReference { .. })
        ));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("❌ Declaration validation failed"));
    }

    const WATCHED: &str = r#"
[[state]]
name = "A"
transitions = { x = "B" }

[[state]]
name = "B"
accepting = true
"#;

    #[test]
    fn test_watch_reload_skips_unchanged() {
        let source = crate::source::FileMachine::new("watched.toml");
        assert!(watch::reload(&source, "watched.toml", WATCHED, WATCHED).is_none());
    }

    #[test]
    fn test_watch_reload_rebuilds_changed() {
        let source = crate::source::FileMachine::new("watched.toml");
        let changed = WATCHED.replace("accepting = true", "accepting = false");

        match watch::reload(&source, "watched.toml", WATCHED, &changed) {
            Some(crate::tui::WatchUpdate::Reloaded(automaton, label)) => {
                assert_eq!(label, "watched.toml");
                assert!(!automaton.accepts("x"));
            }
            _ => panic!("expected a reloaded machine"),
        }
    }

    #[test]
    fn test_watch_reload_reports_broken_changes() {
        let source = crate::source::FileMachine::new("watched.toml");
        let broken = WATCHED.replace("x = \"B\"", "x = \"C\"");

        match watch::reload(&source, "watched.toml", WATCHED, &broken) {
            Some(crate::tui::WatchUpdate::Failed(message)) => {
                assert!(message.contains("Unresolved state reference: C"));
            }
            _ => panic!("expected a failed update"),
        }
    }
}
