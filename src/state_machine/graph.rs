use crate::state_machine::{State, StateName, StateRef, Transition};
use petgraph::Direction;
use petgraph::prelude::EdgeRef;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use std::collections::HashMap;

/// A fully wired deterministic automaton graph.
///
/// Built only by [`StateFactory`](crate::state_machine::StateFactory); once a
/// `StateGraph` exists its states and transitions never change.
#[derive(Debug, Clone)]
pub struct StateGraph {
    /// The underlying graph structure.
    /// Node weights carry the authoritative transition tables, edges mirror them
    /// so graph algorithms and renderers can walk the structure directly.
    graph: StableGraph<State, Transition>,

    /// A lookup table mapping state names to their internal graph indices.
    ///
    /// Names are unique within one construction batch, so this is also the
    /// identity used by traversal.
    state_index: HashMap<StateName, NodeIndex>,

    /// Node of the first declaration
    start: NodeIndex,
}

impl StateGraph {
    pub(crate) fn from_parts(
        graph: StableGraph<State, Transition>,
        state_index: HashMap<StateName, NodeIndex>,
        start: NodeIndex,
    ) -> Self {
        Self {
            graph,
            state_index,
            start,
        }
    }

    pub(crate) fn node(&self, index: NodeIndex) -> &State {
        &self.graph[index]
    }

    /// Read access to the underlying petgraph structure
    pub fn inner(&self) -> &StableGraph<State, Transition> {
        &self.graph
    }

    /// The canonical start state
    pub fn start(&self) -> StateRef<'_> {
        StateRef::new(self, self.start)
    }

    /// Get a state by its name
    pub fn state(&self, name: &str) -> Option<StateRef<'_>> {
        self.state_index
            .get(name)
            .map(|&index| StateRef::new(self, index))
    }

    /// Get a state by node index
    pub fn get(&self, index: NodeIndex) -> Option<StateRef<'_>> {
        self.graph
            .contains_node(index)
            .then(|| StateRef::new(self, index))
    }

    /// All declared states in declaration order, reachable or not
    pub fn states(&self) -> impl Iterator<Item = StateRef<'_>> {
        self.graph
            .node_indices()
            .map(move |index| StateRef::new(self, index))
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get incoming transitions to a state, ordered by source declaration then label
    pub fn incoming_transitions(&self, state: StateRef<'_>) -> Vec<(StateRef<'_>, Transition)> {
        let mut incoming: Vec<(StateRef<'_>, Transition)> = self
            .graph
            .edges_directed(state.index(), Direction::Incoming)
            .map(|edge| (StateRef::new(self, edge.source()), *edge.weight()))
            .collect();
        incoming.sort_by_key(|(source, transition)| (source.index(), *transition));
        incoming
    }

    /// Find all terminal states (nothing leads out of them)
    pub fn find_sink_states(&self) -> Vec<StateRef<'_>> {
        self.states().filter(|state| state.is_sink()).collect()
    }

    /// Export to DOT format for Graphviz
    pub fn to_dot(&self) -> String {
        let mut dot = "digraph StateGraph {\n".to_string();
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=circle];\n");
        dot.push_str("  __start [shape=point, style=invis];\n\n");

        // Add nodes
        for state in self.states() {
            let shape = if state.is_accepting() {
                "doublecircle"
            } else {
                "circle"
            };
            dot.push_str(&format!(
                "  \"{}\" [shape={}];\n",
                escape(state.name()),
                shape
            ));
        }

        dot.push('\n');
        dot.push_str(&format!(
            "  __start -> \"{}\";\n",
            escape(self.start().name())
        ));

        // Add edges, in the same order the transition tables resolve them
        for state in self.states() {
            let from = escape(state.name());
            for (symbol, target) in state.transitions() {
                dot.push_str(&format!(
                    "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    from,
                    escape(target.name()),
                    escape(&symbol.to_string())
                ));
            }
            if let Some(target) = state.fallback() {
                dot.push_str(&format!(
                    "  \"{}\" -> \"{}\" [label=\"else\", style=dashed];\n",
                    from,
                    escape(target.name())
                ));
            }
        }

        dot.push_str("}\n");
        dot
    }

    /// Get graph statistics
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_states: self.graph.node_count(),
            total_transitions: self.graph.edge_count(),
            accepting_states: self.states().filter(|s| s.is_accepting()).count(),
            sink_states: self.find_sink_states().len(),
        }
    }
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Clone)]
pub struct GraphStats {
    pub total_states: usize,
    pub total_transitions: usize,
    pub accepting_states: usize,
    pub sink_states: usize,
}
