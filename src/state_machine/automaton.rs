//! Running input through a wired graph

use crate::Result;
use crate::state_machine::{
    Resolution, StateDeclaration, StateFactory, StateGraph, StateRef, Symbol,
};

/// A deterministic automaton rooted at its graph's start state
#[derive(Debug, Clone)]
pub struct Automaton {
    graph: StateGraph,
}

impl Automaton {
    pub fn new(graph: StateGraph) -> Self {
        Self { graph }
    }

    /// Build the graph and wrap it; the first declaration is the start state
    pub fn from_declarations(declarations: &[StateDeclaration]) -> Result<Self> {
        StateFactory::from_list(declarations).map(Self::new)
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    pub fn start(&self) -> StateRef<'_> {
        self.graph.start()
    }

    /// Fold `symbols` through the graph and return the state reached
    pub fn run<I>(&self, symbols: I) -> StateRef<'_>
    where
        I: IntoIterator<Item = Symbol>,
    {
        symbols
            .into_iter()
            .fold(self.start(), |state, symbol| state.step(symbol))
    }

    pub fn accepts_symbols<I>(&self, symbols: I) -> bool
    where
        I: IntoIterator<Item = Symbol>,
    {
        self.run(symbols).classify()
    }

    /// Whether the final state after consuming every char of `word` is accepting
    pub fn accepts(&self, word: &str) -> bool {
        self.accepts_symbols(word.chars())
    }

    /// Record every step taken while consuming `word`
    pub fn trace(&self, word: &str) -> Trace<'_> {
        let mut steps = Vec::with_capacity(word.len());
        let mut current = self.start();
        for symbol in word.chars() {
            let (next, resolution) = current.resolve(symbol);
            steps.push(Step {
                symbol,
                from: current,
                to: next,
                resolution,
            });
            current = next;
        }
        Trace {
            start: self.start(),
            steps,
            last: current,
        }
    }
}

/// One resolved step of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<'g> {
    pub symbol: Symbol,
    pub from: StateRef<'g>,
    pub to: StateRef<'g>,
    pub resolution: Resolution,
}

/// The full path of a run
#[derive(Debug, Clone)]
pub struct Trace<'g> {
    start: StateRef<'g>,
    steps: Vec<Step<'g>>,
    last: StateRef<'g>,
}

impl<'g> Trace<'g> {
    pub fn start(&self) -> StateRef<'g> {
        self.start
    }

    /// Steps in input order, one per consumed symbol
    pub fn steps(&self) -> &[Step<'g>] {
        &self.steps
    }

    pub fn final_state(&self) -> StateRef<'g> {
        self.last
    }

    pub fn accepted(&self) -> bool {
        self.last.classify()
    }
}
