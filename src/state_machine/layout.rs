//! Layered layout of a state graph
//!
//! Every state reachable from a root gets a row (its BFS depth) and a slot
//! within that row. Rows are centered around `x = 0`, so identical inputs always
//! produce identical coordinates.

use crate::state_machine::{Bfs, StateGraph, StateName, StateRef, Transition};
use petgraph::stable_graph::NodeIndex;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A reachable state annotated with its place in the layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedState {
    #[serde(skip)]
    pub index: NodeIndex,
    pub name: StateName,
    pub depth: usize,
    pub slot: usize,
    pub position: Point,
}

/// Axis-aligned box around every positioned state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }
}

/// Renderable edge between two positioned states
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSegment {
    pub from: Point,
    pub to: Point,
    pub transition: Transition,
    pub is_self_loop: bool,
}

/// Positions for every state reachable from a root
#[derive(Debug, Clone, Default)]
pub struct GraphLayout {
    positions: Vec<PositionedState>,
    by_index: HashMap<NodeIndex, usize>,
}

impl GraphLayout {
    /// Lay out the graph reachable from `root`.
    ///
    /// The i-th state (discovery order) of a row holding `n` states at depth `d`
    /// is placed at `x = i*h - (n-1)*h/2`, `y = d*v`.
    pub fn compute(root: StateRef<'_>, horizontal_gap: f64, vertical_gap: f64) -> Self {
        let mut rows: Vec<Vec<StateRef<'_>>> = Vec::new();
        for visit in Bfs::new(root) {
            if rows.len() <= visit.depth {
                rows.resize_with(visit.depth + 1, Vec::new);
            }
            rows[visit.depth].push(visit.state);
        }

        let mut positions = Vec::new();
        for (depth, row) in rows.iter().enumerate() {
            let half_width = (row.len() - 1) as f64 * horizontal_gap / 2.0;
            for (slot, state) in row.iter().enumerate() {
                positions.push(PositionedState {
                    index: state.index(),
                    name: state.name().to_string(),
                    depth,
                    slot,
                    position: Point {
                        x: slot as f64 * horizontal_gap - half_width,
                        y: depth as f64 * vertical_gap,
                    },
                });
            }
        }

        let by_index = positions
            .iter()
            .enumerate()
            .map(|(i, positioned)| (positioned.index, i))
            .collect();

        tracing::debug!(
            "Laid out {} states over {} levels",
            positions.len(),
            rows.len()
        );

        Self {
            positions,
            by_index,
        }
    }

    pub fn get(&self, state: StateRef<'_>) -> Option<&PositionedState> {
        self.by_index
            .get(&state.index())
            .map(|&i| &self.positions[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&PositionedState> {
        self.positions.iter().find(|p| p.name == name)
    }

    /// Positioned states, rows top to bottom, each row left to right
    pub fn iter(&self) -> impl Iterator<Item = &PositionedState> {
        self.positions.iter()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of rows
    pub fn levels(&self) -> usize {
        self.positions.last().map_or(0, |p| p.depth + 1)
    }

    pub fn bounds(&self) -> Bounds {
        let mut points = self.positions.iter().map(|p| p.position);
        let Some(first) = points.next() else {
            return Bounds::default();
        };
        points.fold(
            Bounds {
                min_x: first.x,
                max_x: first.x,
                min_y: first.y,
                max_y: first.y,
            },
            |b, p| Bounds {
                min_x: b.min_x.min(p.x),
                max_x: b.max_x.max(p.x),
                min_y: b.min_y.min(p.y),
                max_y: b.max_y.max(p.y),
            },
        )
    }

    /// Every wired edge whose endpoints are both laid out
    pub fn edges(&self, graph: &StateGraph) -> Vec<EdgeSegment> {
        let mut segments = Vec::new();
        for positioned in &self.positions {
            let Some(state) = graph.get(positioned.index) else {
                continue;
            };
            let outgoing = state
                .transitions()
                .into_iter()
                .map(|(symbol, target)| (Transition::On(symbol), target))
                .chain(state.fallback().map(|target| (Transition::Fallback, target)));

            for (transition, target) in outgoing {
                if let Some(end) = self.get(target) {
                    segments.push(EdgeSegment {
                        from: positioned.position,
                        to: end.position,
                        transition,
                        is_self_loop: target == state,
                    });
                }
            }
        }
        segments
    }
}

/// Free-function form of [`GraphLayout::compute`]
pub fn compute_layout(root: StateRef<'_>, horizontal_gap: f64, vertical_gap: f64) -> GraphLayout {
    GraphLayout::compute(root, horizontal_gap, vertical_gap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::{StateDeclaration, StateFactory};

    fn fork() -> StateGraph {
        StateFactory::from_list(&[
            StateDeclaration::new("Root").on('a', "Left").on('b', "Right"),
            StateDeclaration::new("Left"),
            StateDeclaration::new("Right"),
        ])
        .unwrap()
    }

    #[test]
    fn test_two_level_layout() {
        let graph = fork();
        let layout = compute_layout(graph.start(), 100.0, 80.0);

        let root = layout.by_name("Root").unwrap();
        assert_eq!(root.position, Point { x: 0.0, y: 0.0 });

        let left = layout.by_name("Left").unwrap();
        let right = layout.by_name("Right").unwrap();
        assert_eq!(left.position, Point { x: -50.0, y: 80.0 });
        assert_eq!(right.position, Point { x: 50.0, y: 80.0 });
        assert_eq!((left.depth, left.slot), (1, 0));
        assert_eq!((right.depth, right.slot), (1, 1));
        assert_eq!(layout.levels(), 2);
    }

    #[test]
    fn test_depth_is_first_discovery() {
        // C is reachable at depth 1 (A's fallback) and depth 2 (via B)
        let graph = StateFactory::from_list(&[
            StateDeclaration::new("A").on('a', "B").otherwise("C"),
            StateDeclaration::new("B").on('b', "C").on('c', "D"),
            StateDeclaration::new("C").otherwise("A"),
            StateDeclaration::new("D"),
        ])
        .unwrap();

        let layout = compute_layout(graph.start(), 10.0, 10.0);
        assert_eq!(layout.by_name("C").unwrap().depth, 1);
        assert_eq!(layout.by_name("D").unwrap().depth, 2);
        assert_eq!(layout.by_name("D").unwrap().position.x, 0.0);
        assert_eq!(layout.len(), 4);
    }

    #[test]
    fn test_three_wide_row_is_centered() {
        let graph = StateFactory::from_list(&[
            StateDeclaration::new("R")
                .on('a', "X")
                .on('b', "Y")
                .otherwise("Z"),
            StateDeclaration::new("X"),
            StateDeclaration::new("Y"),
            StateDeclaration::new("Z"),
        ])
        .unwrap();

        let layout = compute_layout(graph.start(), 30.0, 1.0);
        let xs: Vec<f64> = layout
            .iter()
            .filter(|p| p.depth == 1)
            .map(|p| p.position.x)
            .collect();
        assert_eq!(xs, vec![-30.0, 0.0, 30.0]);
    }

    #[test]
    fn test_layout_is_idempotent() {
        let graph = fork();
        let first = compute_layout(graph.start(), 123.4, 56.7);
        let second = compute_layout(graph.start(), 123.4, 56.7);
        let a: Vec<_> = first.iter().cloned().collect();
        let b: Vec<_> = second.iter().cloned().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bounds() {
        let graph = fork();
        let bounds = compute_layout(graph.start(), 100.0, 80.0).bounds();
        assert_eq!(bounds.min_x, -50.0);
        assert_eq!(bounds.max_x, 50.0);
        assert_eq!(bounds.min_y, 0.0);
        assert_eq!(bounds.max_y, 80.0);
        assert_eq!(bounds.center(), Point { x: 0.0, y: 40.0 });
    }

    #[test]
    fn test_edges_resolve_endpoints() {
        let graph = StateFactory::from_list(&[
            StateDeclaration::new("A").on('a', "B").otherwise("A"),
            StateDeclaration::new("B"),
        ])
        .unwrap();

        let layout = compute_layout(graph.start(), 100.0, 100.0);
        let edges = layout.edges(&graph);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].transition, Transition::On('a'));
        assert_eq!(edges[0].to, Point { x: 0.0, y: 100.0 });
        assert!(!edges[0].is_self_loop);
        assert_eq!(edges[1].transition, Transition::Fallback);
        assert!(edges[1].is_self_loop);
    }
}
