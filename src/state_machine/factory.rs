//! Two-phase construction of wired state graphs from declarations

use crate::state_machine::{State, StateDeclaration, StateGraph, StateName, Symbol, Transition};
use crate::{Error, Result};
use petgraph::stable_graph::{NodeIndex, StableGraph};
use std::collections::{BTreeMap, HashMap};

/// Builds [`StateGraph`]s from declaration batches.
///
/// Phase 1 allocates one node per declaration, phase 2 resolves every target
/// name against the allocated nodes and wires them. Splitting the work this way
/// is what lets declarations reference states that appear later in the list,
/// themselves, or each other in a cycle.
pub struct StateFactory;

/// Resolved wiring for one declaration, applied only once the whole batch resolved
struct Wiring {
    node: NodeIndex,
    transitions: BTreeMap<Symbol, NodeIndex>,
    fallback: Option<NodeIndex>,
}

impl StateFactory {
    /// Build a graph whose start state is the first declaration.
    ///
    /// Fails on an empty list, a repeated name, or a reference to a name that is not
    /// declared in the same batch. On failure nothing is returned, so a partially
    /// wired graph is never observable.
    pub fn from_list(declarations: &[StateDeclaration]) -> Result<StateGraph> {
        let first = declarations.first().ok_or(Error::EmptyMachine)?;

        // Phase 1: allocate
        let mut graph: StableGraph<State, Transition> =
            StableGraph::with_capacity(declarations.len(), 0);
        let mut state_index: HashMap<StateName, NodeIndex> =
            HashMap::with_capacity(declarations.len());

        for decl in declarations {
            if state_index.contains_key(&decl.name) {
                return Err(Error::DuplicateName(decl.name.clone()));
            }
            let node = graph.add_node(State::new(decl.name.clone(), decl.is_accepting));
            state_index.insert(decl.name.clone(), node);
        }
        tracing::debug!("Allocated {} states", state_index.len());

        // Phase 2: resolve everything before any node is touched
        let wirings = declarations
            .iter()
            .map(|decl| Self::resolve(decl, &state_index))
            .collect::<Result<Vec<_>>>()?;

        for wiring in wirings {
            for (&symbol, &target) in &wiring.transitions {
                graph.add_edge(wiring.node, target, Transition::On(symbol));
            }
            if let Some(target) = wiring.fallback {
                graph.add_edge(wiring.node, target, Transition::Fallback);
            }
            graph[wiring.node].wire(wiring.transitions, wiring.fallback);
        }

        let start = state_index[&first.name];
        tracing::debug!(
            "Wired {} transitions, start state {}",
            graph.edge_count(),
            first.name
        );

        Ok(StateGraph::from_parts(graph, state_index, start))
    }

    fn resolve(decl: &StateDeclaration, index: &HashMap<StateName, NodeIndex>) -> Result<Wiring> {
        let lookup = |target: &StateName| {
            index
                .get(target)
                .copied()
                .ok_or_else(|| Error::UnresolvedReference {
                    name: target.clone(),
                    referenced_by: decl.name.clone(),
                })
        };

        let transitions = decl
            .transitions
            .iter()
            .map(|(&symbol, target)| lookup(target).map(|node| (symbol, node)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        let fallback = decl.fallback.as_ref().map(lookup).transpose()?;

        Ok(Wiring {
            node: index[&decl.name],
            transitions,
            fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab_star() -> Vec<StateDeclaration> {
        vec![
            StateDeclaration::new("Q0")
                .on('a', "Q1")
                .otherwise("Q2")
                .accepting(),
            StateDeclaration::new("Q1").on('b', "Q0").otherwise("Q2"),
            StateDeclaration::new("Q2"),
        ]
    }

    #[test]
    fn test_first_declaration_is_start() {
        let graph = StateFactory::from_list(&ab_star()).unwrap();
        assert_eq!(graph.start().name(), "Q0");
        assert!(graph.start().classify());
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_forward_and_circular_references() {
        let graph = StateFactory::from_list(&ab_star()).unwrap();
        let q0 = graph.start();

        let q1 = q0.step('a');
        assert_eq!(q1.name(), "Q1");
        assert_eq!(q1.step('b'), q0);
        assert_eq!(q1.step('a').name(), "Q2");
    }

    #[test]
    fn test_self_reference() {
        let graph = StateFactory::from_list(&[StateDeclaration::new("Loop")
            .on('x', "Loop")
            .accepting()])
        .unwrap();

        let state = graph.start();
        assert_eq!(state.step('x'), state);
        assert_eq!(state.step('y'), state);
    }

    #[test]
    fn test_trap_state_returns_itself() {
        let graph = StateFactory::from_list(&ab_star()).unwrap();
        let q2 = graph.state("Q2").unwrap();
        assert_eq!(q2.step('x'), q2);
        assert!(q2.fallback().is_none());
        assert!(q2.transitions().is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = StateFactory::from_list(&[
            StateDeclaration::new("A").on('a', "B"),
            StateDeclaration::new("B"),
            StateDeclaration::new("A"),
        ]);
        assert!(matches!(result, Err(Error::DuplicateName(name)) if name == "A"));
    }

    #[test]
    fn test_unresolved_transition_rejected() {
        let result = StateFactory::from_list(&[
            StateDeclaration::new("A").on('a', "B"),
            StateDeclaration::new("B").on('b', "C"),
        ]);
        match result {
            Err(Error::UnresolvedReference {
                name,
                referenced_by,
            }) => {
                assert_eq!(name, "C");
                assert_eq!(referenced_by, "B");
            }
            other => panic!("expected unresolved reference, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_unresolved_fallback_rejected() {
        let result = StateFactory::from_list(&[StateDeclaration::new("A").otherwise("Nowhere")]);
        assert!(
            matches!(result, Err(Error::UnresolvedReference { name, .. }) if name == "Nowhere")
        );
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(
            StateFactory::from_list(&[]),
            Err(Error::EmptyMachine)
        ));
    }

    #[test]
    fn test_unreachable_declarations_are_still_wired() {
        let graph = StateFactory::from_list(&[
            StateDeclaration::new("Start").on('a', "Start"),
            StateDeclaration::new("Island").on('a', "Start"),
        ])
        .unwrap();

        assert_eq!(graph.len(), 2);
        let island = graph.state("Island").unwrap();
        assert_eq!(island.step('a'), graph.start());
    }

    #[test]
    fn test_mirror_edges() {
        let graph = StateFactory::from_list(&ab_star()).unwrap();
        // Q0: 'a' + else, Q1: 'b' + else, Q2: none
        assert_eq!(graph.edge_count(), 4);
    }
}
