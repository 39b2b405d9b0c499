//! TUI UI rendering

use super::app::{App, ViewMode};
use crate::state_machine::{EdgeSegment, Point, StateRef, Transition};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Wrap,
        canvas::{Canvas, Circle, Line as CanvasLine},
    },
};

/// Draw the UI based on current app state
pub fn draw(f: &mut Frame, app: &mut App) {
    match app.view_mode {
        ViewMode::Graph | ViewMode::Input => draw_graph(f, app),
        ViewMode::StateDetail => draw_state_detail(f, app),
        ViewMode::Help => draw_help(f),
    }
}

fn state_color(state: StateRef<'_>) -> Color {
    if state.is_accepting() {
        Color::Green
    } else {
        Color::Red
    }
}

fn draw_graph(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Panels
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(chunks[0]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Run info
            Constraint::Min(0),     // State list
        ])
        .split(panels[0]);

    draw_run_info(f, app, left[0]);
    draw_canvas(f, app, panels[1]);

    let items: Vec<ListItem> = app
        .states_list()
        .iter()
        .enumerate()
        .filter_map(|(idx, &index)| {
            let state = app.automaton.graph().get(index)?;
            let positioned = app.layout.get(state)?;
            let is_selected = idx == app.selected_state_index;
            let marker = if state == app.current_state() { "● " } else { "  " };
            let text = format!(
                "{}{} | depth {} | ({:.0}, {:.0})",
                marker,
                state.name(),
                positioned.depth,
                positioned.position.x,
                positioned.position.y
            );

            let style = if is_selected {
                Style::default()
                    .fg(state_color(state))
                    .add_modifier(Modifier::BOLD)
                    .bg(Color::DarkGray)
            } else {
                Style::default().fg(state_color(state))
            };
            Some(ListItem::new(text).style(style))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("States (BFS)"))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, left[1], &mut app.state_list_state);

    let footer_text = if app.view_mode == ViewMode::Input {
        "Editing input | type symbols | [Backspace] Delete | [Enter] Evaluate | [Esc] Done".to_string()
    } else {
        format!(
            "[i] Input | [e] Evaluate | [s/Space] Step | [r] Reset | [←↑↓→] Pan | [+/-] Zoom {:.1}x | [0] Recenter | [d] Detail | [x] Export | [h/?] Help | [q] Quit",
            app.zoom
        )
    };
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[1]);
}

fn draw_run_info(f: &mut Frame, app: &App, area: Rect) {
    let current = app.current_state();
    let consumed: String = app.input().chars().take(app.position()).collect();
    let remaining: String = app.input().chars().skip(app.position()).collect();

    let mut input_spans = vec![
        Span::raw("Input:   "),
        Span::styled(consumed, Style::default().fg(Color::DarkGray)),
        Span::styled(remaining, Style::default().fg(Color::White)),
    ];
    if app.view_mode == ViewMode::Input {
        input_spans.push(Span::styled(
            "_",
            Style::default().add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    let result = match app.result() {
        Some(true) => Span::styled(
            "ACCEPTED",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Some(false) => Span::styled(
            "REJECTED",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        None => Span::raw("-"),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Machine: "),
            Span::styled(
                app.label.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" ({})", app.report.shape.display_name())),
        ]),
        Line::from(input_spans),
        Line::from(vec![
            Span::raw("Current: "),
            Span::styled(
                current.name().to_string(),
                Style::default().fg(state_color(current)),
            ),
        ]),
        Line::from(format!(
            "Via:     {}",
            app.last_resolution().map_or("-", |r| r.name())
        )),
        Line::from(vec![Span::raw("Result:  "), result]),
        Line::from(format!("Status:  {}", app.status)),
    ];
    if let Some(reloaded) = app.last_reload {
        lines.push(Line::from(format!(
            "Reload:  {}",
            reloaded.format("%Y-%m-%d %H:%M:%S")
        )));
    }

    let info = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Run"))
        .wrap(Wrap { trim: false });
    f.render_widget(info, area);
}

/// Screen position of a layout point: depth grows downwards
fn to_canvas(point: Point) -> (f64, f64) {
    (point.x, -point.y)
}

/// Edges between the same pair of states share one line and one label
fn group_edges(edges: &[EdgeSegment]) -> Vec<(EdgeSegment, String)> {
    let mut grouped: Vec<(EdgeSegment, String)> = Vec::new();
    for edge in edges {
        let label = match edge.transition {
            Transition::On(symbol) => symbol.to_string(),
            Transition::Fallback => "else".to_string(),
        };
        match grouped
            .iter_mut()
            .find(|(seen, _)| seen.from == edge.from && seen.to == edge.to)
        {
            Some((_, labels)) => {
                labels.push(',');
                labels.push_str(&label);
            }
            None => grouped.push((*edge, label)),
        }
    }
    grouped
}

fn draw_canvas(f: &mut Frame, app: &App, area: Rect) {
    let (x_bounds, y_bounds) = app.viewport();
    let radius = app.layout_config.node_radius;
    let edges = group_edges(&app.layout.edges(app.automaton.graph()));
    let current = app.current_state().index();
    let selected = app.selected_state().map(|s| s.index());

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    "{} | {} states on {} levels",
                    app.label,
                    app.layout.len(),
                    app.layout.levels()
                )),
        )
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            for (edge, label) in &edges {
                let (x1, y1) = to_canvas(edge.from);
                let color = if edge.transition.is_fallback() {
                    Color::DarkGray
                } else {
                    Color::White
                };

                if edge.is_self_loop {
                    ctx.draw(&Circle {
                        x: x1,
                        y: y1 + radius * 1.3,
                        radius: radius * 0.5,
                        color,
                    });
                    ctx.print(x1 - radius * 0.3, y1 + radius * 2.0, label.clone());
                } else {
                    let (x2, y2) = to_canvas(edge.to);
                    ctx.draw(&CanvasLine {
                        x1,
                        y1,
                        x2,
                        y2,
                        color,
                    });
                    ctx.print((x1 + x2) / 2.0, (y1 + y2) / 2.0, label.clone());
                }
            }

            ctx.layer();

            for positioned in app.layout.iter() {
                let (x, y) = to_canvas(positioned.position);
                let Some(state) = app.automaton.graph().get(positioned.index) else {
                    continue;
                };

                let color = if positioned.index == current {
                    Color::Yellow
                } else if Some(positioned.index) == selected {
                    Color::Magenta
                } else {
                    state_color(state)
                };
                ctx.draw(&Circle {
                    x,
                    y,
                    radius,
                    color,
                });
                if state.is_accepting() {
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: radius * 0.8,
                        color,
                    });
                }
                ctx.print(
                    x - radius * 0.5,
                    y,
                    Span::styled(
                        positioned.name.clone(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    f.render_widget(canvas, area);
}

/// Draw detailed view of selected state
fn draw_state_detail(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Details
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    let header = Paragraph::new("State Detail View")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    if let Some(state) = app.selected_state() {
        let detail_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30), // State info
                Constraint::Percentage(35), // Outgoing transitions
                Constraint::Percentage(35), // Incoming transitions
            ])
            .split(chunks[1]);

        let state_widget = Paragraph::new(format_state_info(app, state))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("State Information"),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(state_widget, detail_chunks[0]);

        let mut outgoing: Vec<String> = state
            .transitions()
            .iter()
            .map(|(symbol, target)| format!("'{}' → {}", symbol, target))
            .collect();
        match state.fallback() {
            Some(target) => outgoing.push(format!("else → {}", target)),
            None => outgoing.push(format!("anything else → {} (stays)", state)),
        }
        let outgoing_widget = Paragraph::new(outgoing.join("\n"))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Outgoing Transitions"),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(outgoing_widget, detail_chunks[1]);

        let incoming = app.automaton.graph().incoming_transitions(state);
        let incoming_text = if incoming.is_empty() {
            "No incoming transitions".to_string()
        } else {
            incoming
                .iter()
                .map(|(from, transition)| format!("{} ← {}", transition.display_label(), from))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let incoming_widget = Paragraph::new(incoming_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Incoming Transitions"),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(incoming_widget, detail_chunks[2]);
    } else {
        let no_selection =
            Paragraph::new("No state selected").block(Block::default().borders(Borders::ALL));
        f.render_widget(no_selection, chunks[1]);
    }

    let footer = Paragraph::new("[j/k/↑/↓] Navigate | [Esc] Back | [h/?] Help | [q] Quit")
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

/// Draw help view
fn draw_help(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Help content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    let header = Paragraph::new("Help")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(vec![Span::styled("Running", bold)]),
        Line::from("  i            - Edit the input word (Enter evaluates, Esc leaves)"),
        Line::from("  e            - Evaluate the whole input"),
        Line::from("  s or Space   - Consume one symbol"),
        Line::from("  r            - Back to the start state"),
        Line::from(""),
        Line::from(vec![Span::styled("Canvas", bold)]),
        Line::from("  ← ↑ ↓ →      - Pan"),
        Line::from("  + / -        - Zoom in / out"),
        Line::from("  0            - Reset pan and zoom"),
        Line::from(""),
        Line::from(vec![Span::styled("States", bold)]),
        Line::from("  j / k        - Select next / previous state"),
        Line::from("  d or Enter   - State detail view"),
        Line::from("  x            - Export the machine as a timestamped .dot file"),
        Line::from(""),
        Line::from(vec![Span::styled("General", bold)]),
        Line::from("  h or ?       - This help screen"),
        Line::from("  Esc          - Back"),
        Line::from("  q            - Quit application"),
        Line::from(""),
        Line::from(vec![Span::styled("Colors", bold)]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("■", Style::default().fg(Color::Green)),
            Span::raw(" Accepting state (drawn with a double ring)"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("■", Style::default().fg(Color::Red)),
            Span::raw(" Rejecting state"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("■", Style::default().fg(Color::Yellow)),
            Span::raw(" Current state of the run"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("■", Style::default().fg(Color::DarkGray)),
            Span::raw(" else edge"),
        ]),
    ];

    let help_widget = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Keyboard Shortcuts & Legend"),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(help_widget, chunks[1]);

    let footer = Paragraph::new("[Esc] Back | [q] Quit")
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

/// Format state information for detail view
fn format_state_info(app: &App, state: StateRef<'_>) -> String {
    let mut info = String::new();

    info.push_str(&format!("Name: {}\n", state.name()));
    info.push_str(&format!("Accepting: {}\n", state.is_accepting()));
    if let Some(positioned) = app.layout.get(state) {
        info.push_str(&format!(
            "Depth: {} (slot {})\n",
            positioned.depth, positioned.slot
        ));
        info.push_str(&format!(
            "Position: ({:.1}, {:.1})\n",
            positioned.position.x, positioned.position.y
        ));
    }
    if state.is_sink() {
        info.push_str("Sink: no symbol leaves this state\n");
    }
    if state == app.automaton.start() {
        info.push_str("Start state\n");
    }

    info
}
