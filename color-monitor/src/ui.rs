use std::io::Stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::{App, UiMessage};

/// How long one UI tick waits on the update channel before redrawing.
const TICK: Duration = Duration::from_millis(100);

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    updates: &mut UnboundedReceiver<UiMessage>,
) -> Result<()> {
    loop {
        dispatch_updates(app, updates).await;
        render_ui(terminal, app)?;

        handle_input(app)?;
        if app.should_quit {
            return Ok(());
        }
    }
}

/// Dispatch step: block on the channel for at most one tick, then drain the
/// backlog. Updates are applied strictly in the order they were posted.
async fn dispatch_updates(app: &mut App, updates: &mut UnboundedReceiver<UiMessage>) {
    match tokio::time::timeout(TICK, updates.recv()).await {
        Ok(Some(msg)) => {
            app.apply(msg);
            while let Ok(msg) = updates.try_recv() {
                app.apply(msg);
            }
        }
        // Worker gone: keep ticking so the frozen UI stays interactive.
        Ok(None) => tokio::time::sleep(TICK).await,
        Err(_) => {}
    }
}

fn handle_input(app: &mut App) -> Result<()> {
    // Non-blocking: the dispatch step above already paced this tick.
    if !event::poll(Duration::ZERO)? {
        return Ok(());
    }

    if let Event::Key(key) = event::read()? {
        handle_key(app, key);
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.interrupted = true;
            app.should_quit = true;
        }
        _ => {}
    }
}

fn render_ui(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &App) -> Result<()> {
    terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Color panel
                Constraint::Length(3), // Status
            ])
            .split(f.area());

        // Header
        let mode_text = if app.simulation_mode {
            "SIMULATION MODE"
        } else {
            "HARDWARE MODE"
        };
        let header = Paragraph::new(format!("=== Color Sensor Monitor - {} ===", mode_text))
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::BOTTOM));
        f.render_widget(header, chunks[0]);

        // Color panel: the class name centered on the resolved background.
        let panel = chunks[1];
        let mut lines: Vec<Line> = Vec::new();
        for _ in 0..panel.height.saturating_sub(1) / 2 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            app.color_name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )));
        let display = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().bg(app.background.into()));
        f.render_widget(display, panel);

        // Status bar: key hints, reading count, latest status line.
        let status_style = if app.status_is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let status_lines = vec![
            Line::from(vec![
                Span::raw("Keys: "),
                Span::styled("[Q]", Style::default().fg(Color::Yellow)),
                Span::raw("uit | Readings: "),
                Span::raw(app.readings.to_string()),
            ]),
            Line::from(Span::styled(app.status.clone(), status_style)),
        ];
        let status = Paragraph::new(status_lines).block(Block::default().borders(Borders::TOP));
        f.render_widget(status, chunks[2]);
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn q_requests_a_normal_quit() {
        let mut app = App::new(false);
        handle_key(&mut app, key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_quit);
        assert!(!app.interrupted);
    }

    #[test]
    fn ctrl_c_marks_the_session_interrupted() {
        let mut app = App::new(false);
        handle_key(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert!(app.interrupted);
    }

    #[test]
    fn plain_c_is_ignored() {
        let mut app = App::new(false);
        handle_key(&mut app, key(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!app.should_quit);
    }
}
