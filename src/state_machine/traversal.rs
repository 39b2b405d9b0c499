//! Breadth-first introspection of a state graph

use crate::state_machine::{StateRef, Symbol};
use std::collections::{HashSet, VecDeque};

/// One expanded state, with its resolved outgoing wiring
#[derive(Debug, Clone)]
pub struct Visit<'g> {
    pub state: StateRef<'g>,
    /// Edge count of the shortest path from the root
    pub depth: usize,
    pub transitions: Vec<(Symbol, StateRef<'g>)>,
    pub fallback: Option<StateRef<'g>>,
}

/// Breadth-first walk from a root, deduplicated by state name.
///
/// A name is recorded when it is first enqueued, so the queue never holds a
/// state twice and every reachable state is yielded exactly once. Successors
/// are discovered in transition-table order, then the fallback target, which
/// makes the visit order reproducible for a given graph and root.
pub struct Bfs<'g> {
    queue: VecDeque<(StateRef<'g>, usize)>,
    discovered: HashSet<&'g str>,
}

impl<'g> Bfs<'g> {
    pub fn new(root: StateRef<'g>) -> Self {
        let mut discovered = HashSet::new();
        discovered.insert(root.name());
        Self {
            queue: VecDeque::from([(root, 0)]),
            discovered,
        }
    }
}

impl<'g> Iterator for Bfs<'g> {
    type Item = Visit<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let (state, depth) = self.queue.pop_front()?;
        let transitions = state.transitions();
        let fallback = state.fallback();

        for next in transitions.iter().map(|(_, target)| *target).chain(fallback) {
            if self.discovered.insert(next.name()) {
                self.queue.push_back((next, depth + 1));
            }
        }

        Some(Visit {
            state,
            depth,
            transitions,
            fallback,
        })
    }
}

/// Visit every state reachable from `root` once, in BFS order
pub fn traverse<'g, F>(root: StateRef<'g>, mut visit: F)
where
    F: FnMut(StateRef<'g>, &[(Symbol, StateRef<'g>)], Option<StateRef<'g>>),
{
    for step in Bfs::new(root) {
        visit(step.state, &step.transitions, step.fallback);
    }
}

/// States reachable from `root`, in visit order
pub fn reachable(root: StateRef<'_>) -> Vec<StateRef<'_>> {
    Bfs::new(root).map(|visit| visit.state).collect()
}
