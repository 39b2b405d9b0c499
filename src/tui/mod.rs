//! TUI module - Terminal UI for interactive visualization

use crate::{Result, state_machine::Automaton};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

pub mod app;
pub mod ui;

use app::{App, ViewMode};

/// Message from a file watcher
#[derive(Debug)]
pub enum WatchUpdate {
    /// The file changed and rebuilt cleanly
    Reloaded(Automaton, String),
    /// The file changed but could not be read or built
    Failed(String),
}

/// Run the TUI application
pub fn run(
    app: App,
    update_receiver: Option<mpsc::Receiver<WatchUpdate>>,
    tick_rate: Duration,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode().map_err(crate::Error::tui)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(crate::Error::tui)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(crate::Error::tui)?;

    let res = run_app(&mut terminal, app, update_receiver, tick_rate);

    // Restore terminal
    disable_raw_mode().map_err(crate::Error::tui)?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .map_err(crate::Error::tui)?;
    terminal.show_cursor().map_err(crate::Error::tui)?;

    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut update_receiver: Option<mpsc::Receiver<WatchUpdate>>,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        // Check for updates
        if let Some(rx) = &mut update_receiver
            && let Ok(update) = rx.try_recv()
        {
            match update {
                WatchUpdate::Reloaded(automaton, label) => app.update_machine(automaton, label),
                WatchUpdate::Failed(message) => app.reload_failed(&message),
            }
        }

        terminal
            .draw(|f| ui::draw(f, &mut app))
            .map_err(crate::Error::tui)?;

        if event::poll(tick_rate).map_err(crate::Error::tui)?
            && let Event::Key(key) = event::read().map_err(crate::Error::tui)?
            && key.kind == KeyEventKind::Press
        {
            if app.view_mode == ViewMode::Input {
                handle_input_key(&mut app, key.code);
            } else {
                handle_key(&mut app, key.code);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Keys while editing the input word
fn handle_input_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => {
            app.evaluate();
            app.pop_view_mode();
        }
        KeyCode::Esc => app.pop_view_mode(),
        KeyCode::Backspace => app.pop_symbol(),
        KeyCode::Char(symbol) => app.push_symbol(symbol),
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('h') | KeyCode::Char('?') => app.set_view_mode(ViewMode::Help),
        KeyCode::Char('i') => app.set_view_mode(ViewMode::Input),
        KeyCode::Char('d') | KeyCode::Enter => app.set_view_mode(ViewMode::StateDetail),
        KeyCode::Char('e') => app.evaluate(),
        KeyCode::Char('s') | KeyCode::Char(' ') => app.step(),
        KeyCode::Char('r') => app.reset_run(),
        KeyCode::Char('j') | KeyCode::Down if app.view_mode != ViewMode::Graph => {
            app.select_next()
        }
        KeyCode::Char('k') | KeyCode::Up if app.view_mode != ViewMode::Graph => {
            app.select_previous()
        }
        KeyCode::Char('j') => app.select_next(),
        KeyCode::Char('k') => app.select_previous(),
        // Arrows pan the canvas in the graph view
        KeyCode::Left => app.pan(-1.0, 0.0),
        KeyCode::Right => app.pan(1.0, 0.0),
        KeyCode::Up => app.pan(0.0, 1.0),
        KeyCode::Down => app.pan(0.0, -1.0),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') => app.zoom_out(),
        KeyCode::Char('0') => app.reset_camera(),
        KeyCode::Char('x') => {
            if let Err(e) = app.export_dot(std::path::Path::new(".")) {
                tracing::warn!("DOT export failed: {}", e);
                app.status = e.to_string();
            }
        }
        KeyCode::Esc => app.pop_view_mode(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::source::{MachineSource, builtin};

    fn create_test_app() -> App {
        let automaton = builtin::find("bb-suffix").unwrap().build().unwrap();
        App::new(automaton, "bb-suffix".to_string(), &Config::default())
    }

    #[test]
    fn test_input_mode_keys() {
        let mut app = create_test_app();
        handle_key(&mut app, KeyCode::Char('i'));
        assert_eq!(app.view_mode, ViewMode::Input);

        // 'q' is a symbol while editing, not quit
        for symbol in ['a', 'q', 'b', 'b'] {
            handle_input_key(&mut app, KeyCode::Char(symbol));
        }
        handle_input_key(&mut app, KeyCode::Backspace);
        assert_eq!(app.input(), "aqb");
        assert!(!app.should_quit);

        handle_input_key(&mut app, KeyCode::Char('b'));
        handle_input_key(&mut app, KeyCode::Enter);
        assert_eq!(app.view_mode, ViewMode::Graph);
        assert_eq!(app.result(), Some(true));
    }

    #[test]
    fn test_step_and_reset_keys() {
        let mut app = create_test_app();
        app.set_input("bb".to_string());

        handle_key(&mut app, KeyCode::Char(' '));
        handle_key(&mut app, KeyCode::Char('s'));
        assert_eq!(app.current_state().name(), "Z2");

        handle_key(&mut app, KeyCode::Char('r'));
        assert_eq!(app.current_state().name(), "Z0");
        assert_eq!(app.position(), 0);
    }

    #[test]
    fn test_arrows_pan_in_graph_and_select_in_detail() {
        let mut app = create_test_app();
        handle_key(&mut app, KeyCode::Down);
        assert!(app.offset.y < 0.0);
        assert_eq!(app.selected_state_index, 0);

        handle_key(&mut app, KeyCode::Char('d'));
        handle_key(&mut app, KeyCode::Down);
        assert_eq!(app.selected_state_index, 1);

        handle_key(&mut app, KeyCode::Esc);
        assert_eq!(app.view_mode, ViewMode::Graph);
    }

    #[test]
    fn test_watch_updates_apply() {
        let mut app = create_test_app();
        app.reload_failed("read failed");
        assert!(app.status.contains("read failed"));

        let replacement = builtin::find("a-then-b").unwrap().build().unwrap();
        app.update_machine(replacement, "a-then-b".to_string());
        assert_eq!(app.label, "a-then-b");
    }

    #[test]
    fn test_quit_key() {
        let mut app = create_test_app();
        handle_key(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
