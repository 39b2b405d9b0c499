//! State machine module - Build, run and introspect deterministic automata

use crate::Result;

pub mod analyzer;
pub mod automaton;
pub mod declaration;
pub mod factory;
pub mod graph;
pub mod layout;
pub mod state;
pub mod transition;
pub mod traversal;

// Re-export key types
pub use automaton::{Automaton, Step, Trace};
pub use declaration::StateDeclaration;
pub use factory::StateFactory;
pub use graph::{GraphStats, StateGraph};
pub use layout::{Bounds, EdgeSegment, GraphLayout, Point, PositionedState, compute_layout};
pub use state::{Resolution, State, StateName, StateRef, Symbol};
pub use transition::Transition;
pub use traversal::{Bfs, Visit, reachable, traverse};

/// Build an automaton from declarations
pub fn build_automaton(declarations: &[StateDeclaration]) -> Result<Automaton> {
    Automaton::from_declarations(declarations)
}
