//! Machine structure analyzer
//!
//! Summarizes a wired automaton: what is reachable, what accepts, which states
//! trap the input, and the overall shape of the graph.

use super::{Automaton, Bfs, StateName, Symbol};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MachineShape {
    /// Every reachable state has at most one distinct successor besides itself
    Linear,

    /// Some state fans out, but no path ever returns to an earlier state
    Branching,

    /// Some path leads back to a state it already visited
    Cyclic,
}

impl MachineShape {
    pub fn display_name(&self) -> &'static str {
        match self {
            MachineShape::Linear => "Linear",
            MachineShape::Branching => "Branching",
            MachineShape::Cyclic => "Cyclic",
        }
    }
}

/// Analysis report containing structure and metrics
#[derive(Debug, Clone, Serialize)]
pub struct MachineReport {
    pub shape: MachineShape,
    pub declared_states: usize,
    pub reachable_states: usize,
    /// Reachable accepting states, in visit order
    pub accepting: Vec<StateName>,
    /// Reachable states no symbol can leave, in visit order
    pub sinks: Vec<StateName>,
    /// Declared but not reachable from the start, in declaration order
    pub unreachable: Vec<StateName>,
    /// Symbols with an explicit transition anywhere in the graph
    pub alphabet: BTreeSet<Symbol>,
    pub max_depth: usize,
    /// Any cycle through mirror edges, self-loops excluded
    pub has_cycles: bool,
}

/// Analyze the structure reachable from the machine's start state
pub fn analyze(automaton: &Automaton) -> MachineReport {
    let graph = automaton.graph();

    let mut reached: HashSet<&str> = HashSet::new();
    let mut accepting = Vec::new();
    let mut sinks = Vec::new();
    let mut alphabet = BTreeSet::new();
    let mut max_depth = 0;
    let mut fans_out = false;

    for visit in Bfs::new(automaton.start()) {
        let state = visit.state;
        reached.insert(state.name());
        max_depth = max_depth.max(visit.depth);

        if state.is_accepting() {
            accepting.push(state.name().to_string());
        }
        if state.is_sink() {
            sinks.push(state.name().to_string());
        }
        alphabet.extend(visit.transitions.iter().map(|(symbol, _)| *symbol));

        let distinct: HashSet<&str> = state
            .successors()
            .filter(|next| *next != state)
            .map(|next| next.name())
            .collect();
        fans_out |= distinct.len() > 1;
    }

    let unreachable = graph
        .states()
        .filter(|state| !reached.contains(state.name()))
        .map(|state| state.name().to_string())
        .collect();

    // Self-loops are how a DFA traps input; they do not make its shape cyclic
    let inner = graph.inner();
    let without_self_loops = inner.filter_map(
        |_, state| Some(state.name()),
        |edge, transition| {
            let (source, target) = inner.edge_endpoints(edge)?;
            (source != target).then_some(*transition)
        },
    );
    let has_cycles = petgraph::algo::is_cyclic_directed(&without_self_loops);

    let shape = if has_cycles {
        MachineShape::Cyclic
    } else if fans_out {
        MachineShape::Branching
    } else {
        MachineShape::Linear
    };

    MachineReport {
        shape,
        declared_states: graph.len(),
        reachable_states: reached.len(),
        accepting,
        sinks,
        unreachable,
        alphabet,
        max_depth,
        has_cycles,
    }
}
