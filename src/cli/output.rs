//! Output formatting module
//!
//! This module handles formatting verdicts, traces and machine structure for
//! the non-interactive output formats.

use crate::{
    Result,
    source::BuiltinMachine,
    state_machine::{Automaton, Bfs, GraphLayout, Trace, analyzer::MachineReport},
};
use serde_json::json;

/// Verdict for a single word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub word: String,
    pub final_state: String,
    pub accepted: bool,
}

fn verdict_text(accepted: bool) -> &'static str {
    if accepted { "accepted" } else { "rejected" }
}

/// Render `word` for a table cell, making the empty word visible
fn display_word(word: &str) -> String {
    if word.is_empty() {
        "ε".to_string()
    } else {
        word.to_string()
    }
}

/// Pretty-print `value` with a trailing newline. Writer failures stay IO errors.
fn write_json(w: &mut impl std::io::Write, value: &serde_json::Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, value).map_err(std::io::Error::from)?;
    writeln!(w)?;
    Ok(())
}

/// Output the built-in registry as a text table
pub fn output_list(w: &mut impl std::io::Write, machines: &[BuiltinMachine]) -> Result<()> {
    writeln!(w, "{:<16} {:<36} Description", "Key", "Title")?;
    writeln!(w, "{:-<100}", "")?;
    for machine in machines {
        writeln!(
            w,
            "{:<16} {:<36} {}",
            machine.key, machine.title, machine.description
        )?;
    }
    Ok(())
}

/// Output verdicts as JSON
pub fn output_check_json(
    w: &mut impl std::io::Write,
    machine: &str,
    verdicts: &[Verdict],
) -> Result<()> {
    let output = json!({
        "machine": machine,
        "summary": {
            "total": verdicts.len(),
            "accepted": verdicts.iter().filter(|v| v.accepted).count(),
        },
        "words": verdicts.iter().map(|v| {
            json!({
                "word": v.word,
                "accepted": v.accepted,
                "final_state": v.final_state,
            })
        }).collect::<Vec<_>>(),
    });

    write_json(w, &output)
}

/// Output verdicts as text table
pub fn output_check_table(
    w: &mut impl std::io::Write,
    machine: &str,
    verdicts: &[Verdict],
) -> Result<()> {
    writeln!(w, "Machine: {}", machine)?;
    writeln!(w, "{:-<60}", "")?;
    writeln!(w, "{:<30} {:<16} {:>10}", "Word", "Final State", "Verdict")?;
    writeln!(w, "{:-<60}", "")?;

    for verdict in verdicts {
        let word = display_word(&verdict.word);
        let word = if word.chars().count() > 28 {
            format!("{}...", word.chars().take(25).collect::<String>())
        } else {
            word
        };
        writeln!(
            w,
            "{:<30} {:<16} {:>10}",
            word,
            verdict.final_state,
            verdict_text(verdict.accepted)
        )?;
    }

    let accepted = verdicts.iter().filter(|v| v.accepted).count();
    writeln!(w)?;
    writeln!(w, "{} of {} accepted", accepted, verdicts.len())?;
    Ok(())
}

/// Output a trace as JSON
pub fn output_trace_json(
    w: &mut impl std::io::Write,
    machine: &str,
    word: &str,
    trace: &Trace<'_>,
) -> Result<()> {
    let output = json!({
        "machine": machine,
        "word": word,
        "start": trace.start().name(),
        "steps": trace.steps().iter().map(|step| {
            json!({
                "symbol": step.symbol.to_string(),
                "from": step.from.name(),
                "to": step.to.name(),
                "via": step.resolution,
            })
        }).collect::<Vec<_>>(),
        "final_state": trace.final_state().name(),
        "accepted": trace.accepted(),
    });

    write_json(w, &output)
}

/// Output a trace as text table
pub fn output_trace_table(
    w: &mut impl std::io::Write,
    machine: &str,
    word: &str,
    trace: &Trace<'_>,
) -> Result<()> {
    writeln!(w, "Machine: {}", machine)?;
    writeln!(w, "Word:    {}", display_word(word))?;
    writeln!(w, "Start:   {}", trace.start())?;
    writeln!(w, "{:-<60}", "")?;
    writeln!(
        w,
        "{:>4}  {:<6} {:<16} {:<16} {:<8}",
        "#", "Symbol", "From", "To", "Via"
    )?;
    writeln!(w, "{:-<60}", "")?;

    for (i, step) in trace.steps().iter().enumerate() {
        writeln!(
            w,
            "{:>4}  {:<6} {:<16} {:<16} {:<8}",
            i + 1,
            format!("'{}'", step.symbol),
            step.from.name(),
            step.to.name(),
            step.resolution.name()
        )?;
    }

    writeln!(w)?;
    writeln!(
        w,
        "Final state {} -> {}",
        trace.final_state(),
        verdict_text(trace.accepted())
    )?;
    Ok(())
}

/// Output machine structure as JSON: states in BFS order with their layout
pub fn output_structure_json(
    w: &mut impl std::io::Write,
    machine: &str,
    automaton: &Automaton,
    layout: &GraphLayout,
    report: &MachineReport,
) -> Result<()> {
    let states: Vec<_> = Bfs::new(automaton.start())
        .map(|visit| {
            let position = layout.get(visit.state);
            json!({
                "name": visit.state.name(),
                "accepting": visit.state.is_accepting(),
                "depth": visit.depth,
                "slot": position.map(|p| p.slot),
                "x": position.map(|p| p.position.x),
                "y": position.map(|p| p.position.y),
                "transitions": visit.transitions.iter()
                    .map(|(symbol, target)| (symbol.to_string(), json!(target.name())))
                    .collect::<serde_json::Map<_, _>>(),
                "else": visit.fallback.map(|f| f.name()),
            })
        })
        .collect();

    let output = json!({
        "machine": machine,
        "start": automaton.start().name(),
        "states": states,
        "report": report,
    });

    write_json(w, &output)
}

/// Output machine structure as text: one block per reachable state, then the report
pub fn output_structure_table(
    w: &mut impl std::io::Write,
    machine: &str,
    automaton: &Automaton,
    layout: &GraphLayout,
    report: &MachineReport,
) -> Result<()> {
    writeln!(w, "Machine: {}", machine)?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w)?;

    for visit in Bfs::new(automaton.start()) {
        let state = visit.state;
        let (x, y) = layout
            .get(state)
            .map(|p| (p.position.x, p.position.y))
            .unwrap_or_default();
        writeln!(
            w,
            "State {} (accepting={}) depth={} at ({:.1}, {:.1})",
            state,
            state.is_accepting(),
            visit.depth,
            x,
            y
        )?;
        for (symbol, target) in &visit.transitions {
            writeln!(w, "  '{}' -> {}", symbol, target)?;
        }
        if let Some(target) = visit.fallback {
            writeln!(w, "  else -> {}", target)?;
        }
    }

    writeln!(w)?;
    writeln!(w, "Summary:")?;
    writeln!(w, "  Shape:            {}", report.shape.display_name())?;
    writeln!(
        w,
        "  States:           {} reachable / {} declared",
        report.reachable_states, report.declared_states
    )?;
    writeln!(w, "  Accepting:        {}", join_or_none(&report.accepting))?;
    writeln!(w, "  Sinks:            {}", join_or_none(&report.sinks))?;
    writeln!(w, "  Unreachable:      {}", join_or_none(&report.unreachable))?;
    writeln!(
        w,
        "  Alphabet:         {}",
        report.alphabet.iter().collect::<String>()
    )?;
    writeln!(w, "  Max depth:        {}", report.max_depth)?;
    writeln!(w, "  Has cycles:       {}", report.has_cycles)?;
    Ok(())
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}
