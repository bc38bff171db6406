//! # TUI UI Components
//!
//! Ratatui-based UI rendering for each screen.

mod chat;
mod help;
mod persona;

pub use chat::render_chat;
pub use help::render_help;
pub use persona::render_persona;

use crate::tui::{App, InputMode, Screen};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

/// Main render function - dispatches to screen-specific renderers
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);

    match app.current_screen {
        Screen::Chat => render_chat(frame, app, chunks[1]),
        Screen::Persona => render_persona(frame, app, chunks[1]),
        Screen::Help => render_help(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .map(|s| {
            let style = if *s == app.current_screen {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(format!("[{}] {}", s.key(), s.title())).style(style)
        })
        .collect();

    let title = format!(" SOUL · {} ", app.session.persona().effective_name());
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(Screen::all().iter().position(|s| *s == app.current_screen).unwrap_or(0))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow));

    frame.render_widget(tabs, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let activity = if app.is_busy() {
        Span::styled(
            format!("{} replying", app.spinner()),
            Style::default().fg(Color::Yellow),
        )
    } else if app.saving {
        Span::styled(format!("{} saving", app.spinner()), Style::default().fg(Color::Yellow))
    } else {
        Span::styled("● Idle", Style::default().fg(Color::Green))
    };

    let model = Span::styled(
        format!(" {}:{} ", app.provider_label, app.session.model()),
        Style::default().fg(Color::Cyan),
    );

    let mode_status = match app.input_mode {
        InputMode::Normal => Span::raw(""),
        InputMode::Editing => Span::styled(
            " [EDITING] ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    };

    let message = if let Some(err) = &app.error_message {
        Span::styled(format!(" Error: {} ", err), Style::default().fg(Color::Red))
    } else if let Some(status) = &app.status_message {
        Span::styled(format!(" {} ", status), Style::default().fg(Color::Green))
    } else {
        Span::raw("")
    };

    let help_hint = Span::styled(" q:Quit ?:Help ", Style::default().fg(Color::Gray));

    let status_line = Line::from(vec![
        activity,
        Span::raw(" |"),
        model,
        mode_status,
        message,
        Span::raw(" "),
        help_hint,
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray)),
        area,
    );
}

/// Helper to create a block with title
pub fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
}

/// Helper to truncate text on a character boundary
pub fn truncate_text(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
