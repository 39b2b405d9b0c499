//! TUI application state

use crate::config::{Config, LayoutConfig};
use crate::state_machine::{
    Automaton, GraphLayout, Point, Resolution, StateRef,
    analyzer::{MachineReport, analyze},
    compute_layout,
};
use crate::{Error, Result};
use chrono::{DateTime, Local};
use petgraph::stable_graph::NodeIndex;
use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// TUI application state
pub struct App {
    pub automaton: Automaton,
    pub label: String,
    pub layout: GraphLayout,
    pub report: MachineReport,
    pub layout_config: LayoutConfig,
    pub view_mode: ViewMode,
    pub should_quit: bool,
    pub selected_state_index: usize,
    pub state_list_state: ListState,
    /// Camera offset in canvas units
    pub offset: Point,
    pub zoom: f64,
    pub status: String,
    pub last_reload: Option<DateTime<Local>>,
    input: String,
    /// Number of input symbols consumed so far
    position: usize,
    current: NodeIndex,
    last_resolution: Option<Resolution>,
    /// Verdict, known once the whole input has been consumed
    result: Option<bool>,
    pan_step: f64,
    zoom_step: f64,
    states_list: Vec<NodeIndex>,
    view_stack: Vec<ViewMode>,
}

/// View modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Graph,
    /// Keystrokes edit the input word
    Input,
    StateDetail,
    Help,
}

impl App {
    pub fn new(automaton: Automaton, label: String, config: &Config) -> Self {
        let layout = compute_layout(
            automaton.start(),
            config.layout.horizontal_gap,
            config.layout.vertical_gap,
        );
        let report = analyze(&automaton);
        let states_list: Vec<NodeIndex> = layout.iter().map(|p| p.index).collect();
        let current = automaton.start().index();

        let mut state_list_state = ListState::default();
        if !states_list.is_empty() {
            state_list_state.select(Some(0));
        }

        Self {
            automaton,
            status: format!("Loaded {}", label),
            label,
            layout,
            report,
            layout_config: config.layout,
            view_mode: ViewMode::Graph,
            should_quit: false,
            selected_state_index: 0,
            state_list_state,
            offset: Point::default(),
            zoom: 1.0,
            last_reload: None,
            input: String::new(),
            position: 0,
            current,
            last_resolution: None,
            result: None,
            pan_step: config.tui.pan_step,
            zoom_step: config.tui.zoom_step,
            states_list,
            view_stack: Vec::new(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            self.view_stack.push(self.view_mode);
            self.view_mode = mode;
        }
    }

    pub fn pop_view_mode(&mut self) {
        self.view_mode = self.view_stack.pop().unwrap_or(ViewMode::Graph);
    }

    pub fn select_next(&mut self) {
        if !self.states_list.is_empty() {
            self.selected_state_index = (self.selected_state_index + 1) % self.states_list.len();
            self.state_list_state
                .select(Some(self.selected_state_index));
        }
    }

    pub fn select_previous(&mut self) {
        if !self.states_list.is_empty() {
            if self.selected_state_index == 0 {
                self.selected_state_index = self.states_list.len() - 1;
            } else {
                self.selected_state_index -= 1;
            }
            self.state_list_state
                .select(Some(self.selected_state_index));
        }
    }

    pub fn selected_state(&self) -> Option<StateRef<'_>> {
        self.states_list
            .get(self.selected_state_index)
            .and_then(|&index| self.automaton.graph().get(index))
    }

    /// Reachable states in BFS order
    pub fn states_list(&self) -> &[NodeIndex] {
        &self.states_list
    }

    pub fn current_state(&self) -> StateRef<'_> {
        self.automaton
            .graph()
            .get(self.current)
            .unwrap_or_else(|| self.automaton.start())
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn result(&self) -> Option<bool> {
        self.result
    }

    pub fn last_resolution(&self) -> Option<Resolution> {
        self.last_resolution
    }

    /// Replace the input word and rewind the run
    pub fn set_input(&mut self, input: String) {
        self.input = input;
        self.reset_run();
    }

    pub fn push_symbol(&mut self, symbol: char) {
        self.input.push(symbol);
        self.reset_run();
    }

    pub fn pop_symbol(&mut self) {
        if self.input.pop().is_some() {
            self.reset_run();
        }
    }

    /// Back to the start state with nothing consumed
    pub fn reset_run(&mut self) {
        self.current = self.automaton.start().index();
        self.position = 0;
        self.last_resolution = None;
        self.result = None;
    }

    /// Consume one input symbol
    pub fn step(&mut self) {
        if self.result.is_some() {
            self.status = "End of input, press r to reset".to_string();
            return;
        }

        let next = self.input.chars().nth(self.position);
        let (index, resolution, label) = {
            let current = self.current_state();
            match next {
                Some(symbol) => {
                    let (to, resolution) = current.resolve(symbol);
                    (
                        to.index(),
                        Some(resolution),
                        format!("{} --'{}'/{}--> {}", current, symbol, resolution.name(), to),
                    )
                }
                None => (current.index(), None, String::new()),
            }
        };

        if next.is_some() {
            self.current = index;
            self.last_resolution = resolution;
            self.position += 1;
            self.status = label;
        }
        if self.position >= self.input.chars().count() {
            self.result = Some(self.current_state().classify());
        }
    }

    /// Run the whole input from the start state
    pub fn evaluate(&mut self) {
        let (index, accepted) = {
            let last = self.automaton.run(self.input.chars());
            (last.index(), last.classify())
        };
        self.current = index;
        self.position = self.input.chars().count();
        self.last_resolution = None;
        self.result = Some(accepted);
        self.status = format!(
            "{:?} {}",
            self.input,
            if accepted { "accepted" } else { "rejected" }
        );
    }

    /// Move the camera by whole pan steps
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset.x += dx * self.pan_step / self.zoom;
        self.offset.y += dy * self.pan_step / self.zoom;
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * self.zoom_step).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / self.zoom_step).max(MIN_ZOOM);
    }

    pub fn reset_camera(&mut self) {
        self.offset = Point::default();
        self.zoom = 1.0;
    }

    /// Canvas x and y bounds. Layout depth grows downwards, so layout y is negated.
    pub fn viewport(&self) -> ([f64; 2], [f64; 2]) {
        let bounds = self.layout.bounds();
        let center = bounds.center();
        let padding = self.layout_config.node_radius * 2.0;
        let half_width = (bounds.width() / 2.0 + padding) / self.zoom;
        let half_height = (bounds.height() / 2.0 + padding) / self.zoom;

        let cx = center.x + self.offset.x;
        let cy = -center.y + self.offset.y;
        (
            [cx - half_width, cx + half_width],
            [cy - half_height, cy + half_height],
        )
    }

    /// Swap in a rebuilt machine, keeping the input and the selected state when it still exists
    pub fn update_machine(&mut self, automaton: Automaton, label: String) {
        let selected_name = self.selected_state().map(|s| s.name().to_string());

        self.layout = compute_layout(
            automaton.start(),
            self.layout_config.horizontal_gap,
            self.layout_config.vertical_gap,
        );
        self.report = analyze(&automaton);
        self.states_list = self.layout.iter().map(|p| p.index).collect();
        self.automaton = automaton;
        self.label = label;
        self.reset_run();

        let position = selected_name
            .and_then(|name| self.layout.by_name(&name).map(|p| p.index))
            .and_then(|index| self.states_list.iter().position(|&i| i == index));
        self.selected_state_index = position.unwrap_or(0);
        self.state_list_state.select(if self.states_list.is_empty() {
            None
        } else {
            Some(self.selected_state_index)
        });

        let now = Local::now();
        self.status = format!("Reloaded {} at {}", self.label, now.format("%H:%M:%S"));
        self.last_reload = Some(now);
    }

    /// Keep the current machine and surface why the reload failed
    pub fn reload_failed(&mut self, message: &str) {
        self.status = format!("Reload failed, keeping previous machine: {}", message);
    }

    /// Write the machine as Graphviz DOT into `dir`, named after the label and the current time
    pub fn export_dot(&mut self, dir: &Path) -> Result<PathBuf> {
        let stem: String = self
            .label
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let path = dir.join(format!(
            "{}-{}.dot",
            stem,
            Local::now().format("%Y%m%d-%H%M%S")
        ));

        std::fs::write(&path, self.automaton.graph().to_dot())
            .map_err(|e| Error::tui(format!("Failed to export {:?}: {}", path, e)))?;
        self.status = format!("Exported {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MachineSource, builtin};
    use crate::state_machine::StateDeclaration;

    fn create_test_app() -> App {
        let automaton = Automaton::from_declarations(&[
            StateDeclaration::new("Q0")
                .on('a', "Q1")
                .otherwise("Q2")
                .accepting(),
            StateDeclaration::new("Q1").on('b', "Q0").otherwise("Q2"),
            StateDeclaration::new("Q2"),
        ])
        .unwrap();
        App::new(automaton, "ab-star".to_string(), &Config::default())
    }

    #[test]
    fn test_app_creation() {
        let app = create_test_app();

        assert_eq!(app.selected_state_index, 0);
        assert_eq!(app.view_mode, ViewMode::Graph);
        assert!(!app.should_quit);
        assert_eq!(app.states_list().len(), 3);
        assert_eq!(app.current_state().name(), "Q0");
        assert_eq!(app.result(), None);
    }

    #[test]
    fn test_app_navigation() {
        let mut app = create_test_app();

        app.select_next();
        assert_eq!(app.selected_state().unwrap().name(), "Q1");
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_state_index, 0); // Wrapped

        app.select_previous();
        assert_eq!(app.selected_state().unwrap().name(), "Q2");
    }

    #[test]
    fn test_app_view_modes() {
        let mut app = create_test_app();

        app.set_view_mode(ViewMode::StateDetail);
        app.set_view_mode(ViewMode::Help);
        assert_eq!(app.view_mode, ViewMode::Help);

        app.pop_view_mode();
        assert_eq!(app.view_mode, ViewMode::StateDetail);
        app.pop_view_mode();
        assert_eq!(app.view_mode, ViewMode::Graph);
        app.pop_view_mode();
        assert_eq!(app.view_mode, ViewMode::Graph);
    }

    #[test]
    fn test_app_stepping() {
        let mut app = create_test_app();
        app.set_input("ab".to_string());

        app.step();
        assert_eq!(app.current_state().name(), "Q1");
        assert_eq!(app.last_resolution(), Some(Resolution::Explicit));
        assert_eq!(app.result(), None);

        app.step();
        assert_eq!(app.current_state().name(), "Q0");
        assert_eq!(app.position(), 2);
        assert_eq!(app.result(), Some(true));

        // Further steps leave the finished run alone
        app.step();
        assert_eq!(app.current_state().name(), "Q0");
        assert_eq!(app.position(), 2);
    }

    #[test]
    fn test_app_step_empty_input() {
        let mut app = create_test_app();
        app.step();
        assert_eq!(app.current_state().name(), "Q0");
        assert_eq!(app.result(), Some(true));
    }

    #[test]
    fn test_app_evaluate_and_edit() {
        let mut app = create_test_app();
        for symbol in "abx".chars() {
            app.push_symbol(symbol);
        }
        app.evaluate();
        assert_eq!(app.current_state().name(), "Q2");
        assert_eq!(app.result(), Some(false));

        // Editing rewinds the run
        app.pop_symbol();
        assert_eq!(app.input(), "ab");
        assert_eq!(app.current_state().name(), "Q0");
        assert_eq!(app.result(), None);
    }

    #[test]
    fn test_app_camera() {
        let mut app = create_test_app();
        let (x_before, _) = app.viewport();

        app.pan(1.0, 0.0);
        let (x_after, _) = app.viewport();
        assert!(x_after[0] > x_before[0]);

        app.zoom_in();
        assert!(app.zoom > 1.0);
        for _ in 0..200 {
            app.zoom_out();
        }
        assert_eq!(app.zoom, MIN_ZOOM);

        app.reset_camera();
        assert_eq!(app.viewport().0, x_before);
    }

    #[test]
    fn test_app_viewport_covers_layout() {
        let app = create_test_app();
        let (x, y) = app.viewport();
        for positioned in app.layout.iter() {
            assert!(positioned.position.x > x[0] && positioned.position.x < x[1]);
            assert!(-positioned.position.y > y[0] && -positioned.position.y < y[1]);
        }
    }

    #[test]
    fn test_app_update_machine_keeps_selection() {
        let mut app = create_test_app();
        app.select_next(); // Q1
        app.set_input("a".to_string());
        app.evaluate();

        let replacement = builtin::find("a-then-b").unwrap().build().unwrap();
        let start = replacement.start().name().to_string();
        app.update_machine(replacement, "a-then-b".to_string());

        assert_eq!(app.label, "a-then-b");
        assert_eq!(app.input(), "a");
        assert_eq!(app.current_state().name(), start);
        assert_eq!(app.result(), None);
        assert!(app.last_reload.is_some());
        assert!(app.selected_state().is_some());
    }

    #[test]
    fn test_app_reload_failed_keeps_machine() {
        let mut app = create_test_app();
        app.reload_failed("Duplicate state name: Q0");
        assert_eq!(app.label, "ab-star");
        assert!(app.status.contains("Duplicate state name"));
    }

    #[test]
    fn test_app_export_dot() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = create_test_app();

        let path = app.export_dot(dir.path()).unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("ab-star-"));
        assert!(file_name.ends_with(".dot"));
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("digraph"));
    }

    #[test]
    fn test_app_quit() {
        let mut app = create_test_app();
        assert!(!app.should_quit);
        app.quit();
        assert!(app.should_quit);
    }
}
