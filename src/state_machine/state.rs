//! State representation

use crate::state_machine::StateGraph;
use petgraph::stable_graph::NodeIndex;
use std::collections::BTreeMap;
use std::fmt;

pub type StateName = String;

/// Input symbol consumed by a single step
pub type Symbol = char;

/// A node of a wired state graph.
///
/// States are allocated by the factory with only a name and an accepting flag,
/// then wired exactly once. After the graph is handed out, callers only ever see
/// shared references, so the transition table cannot change.
#[derive(Debug, Clone)]
pub struct State {
    name: StateName,
    is_accepting: bool,
    transitions: BTreeMap<Symbol, NodeIndex>,
    fallback: Option<NodeIndex>,
}

impl State {
    pub(crate) fn new(name: StateName, is_accepting: bool) -> Self {
        Self {
            name,
            is_accepting,
            transitions: BTreeMap::new(),
            fallback: None,
        }
    }

    /// Attach the resolved transition table. Only the factory calls this, once per state.
    pub(crate) fn wire(
        &mut self,
        transitions: BTreeMap<Symbol, NodeIndex>,
        fallback: Option<NodeIndex>,
    ) {
        debug_assert!(
            self.transitions.is_empty() && self.fallback.is_none(),
            "state {} wired twice",
            self.name
        );
        self.transitions = transitions;
        self.fallback = fallback;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_accepting(&self) -> bool {
        self.is_accepting
    }

    pub fn transitions(&self) -> &BTreeMap<Symbol, NodeIndex> {
        &self.transitions
    }

    pub fn fallback(&self) -> Option<NodeIndex> {
        self.fallback
    }
}

/// Which rule picked the next state for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The symbol has an explicit entry in the transition table
    Explicit,
    /// No entry, the fallback target was used
    Fallback,
    /// No entry and no fallback: the state keeps itself
    SelfLoop,
}

impl Resolution {
    pub fn name(&self) -> &'static str {
        match self {
            Resolution::Explicit => "explicit",
            Resolution::Fallback => "else",
            Resolution::SelfLoop => "self",
        }
    }
}

/// Borrowed handle to a state inside a [`StateGraph`].
///
/// Two handles are equal when they point at the same node of the same graph.
#[derive(Clone, Copy)]
pub struct StateRef<'g> {
    graph: &'g StateGraph,
    index: NodeIndex,
}

impl<'g> StateRef<'g> {
    pub(crate) fn new(graph: &'g StateGraph, index: NodeIndex) -> Self {
        Self { graph, index }
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn graph(&self) -> &'g StateGraph {
        self.graph
    }

    /// The underlying node weight
    pub fn state(&self) -> &'g State {
        self.graph.node(self.index)
    }

    pub fn name(&self) -> &'g str {
        self.state().name()
    }

    /// Accepting flag fixed at construction
    pub fn classify(&self) -> bool {
        self.state().is_accepting()
    }

    pub fn is_accepting(&self) -> bool {
        self.classify()
    }

    /// Next state for `symbol`: exact match, then fallback, then this state.
    pub fn step(&self, symbol: Symbol) -> StateRef<'g> {
        self.resolve(symbol).0
    }

    /// Like [`StateRef::step`], also reporting which rule fired.
    pub fn resolve(&self, symbol: Symbol) -> (StateRef<'g>, Resolution) {
        let state = self.state();
        if let Some(&target) = state.transitions.get(&symbol) {
            (self.at(target), Resolution::Explicit)
        } else if let Some(target) = state.fallback {
            (self.at(target), Resolution::Fallback)
        } else {
            (*self, Resolution::SelfLoop)
        }
    }

    /// Resolved transition table, in ascending symbol order
    pub fn transitions(&self) -> Vec<(Symbol, StateRef<'g>)> {
        self.state()
            .transitions
            .iter()
            .map(|(&symbol, &target)| (symbol, self.at(target)))
            .collect()
    }

    pub fn fallback(&self) -> Option<StateRef<'g>> {
        self.state().fallback.map(|target| self.at(target))
    }

    /// Transition targets in table order, followed by the fallback target
    pub fn successors(&self) -> impl Iterator<Item = StateRef<'g>> + 'g {
        let graph = self.graph;
        let state = self.state();
        state
            .transitions
            .values()
            .chain(state.fallback.iter())
            .map(move |&target| StateRef::new(graph, target))
    }

    /// True when no symbol can ever leave this state
    pub fn is_sink(&self) -> bool {
        self.successors().all(|next| next == *self)
    }

    fn at(&self, index: NodeIndex) -> StateRef<'g> {
        StateRef::new(self.graph, index)
    }
}

impl PartialEq for StateRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.index == other.index
    }
}

impl Eq for StateRef<'_> {}

impl fmt::Debug for StateRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRef")
            .field("name", &self.name())
            .field("index", &self.index.index())
            .finish()
    }
}

impl fmt::Display for StateRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
