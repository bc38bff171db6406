//! # Chat UI
//!
//! Transcript view plus the input line.

use crate::features::chat::Role;
use crate::tui::ui::titled_block;
use crate::tui::{App, InputMode};
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

pub fn render_chat(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    render_transcript(frame, app, chunks[0]);
    render_input(frame, app, chunks[1]);
}

fn render_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let persona_name = app.session.persona().effective_name();
    let mut lines: Vec<Line> = Vec::new();

    if app.session.transcript().is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Say something to {persona_name}. Press i to type."),
            Style::default().fg(Color::DarkGray),
        )));
    }

    for turn in app.session.transcript().turns() {
        let (speaker, color) = match turn.role() {
            Role::User => ("You", Color::Cyan),
            Role::Assistant => (persona_name, Color::Magenta),
        };
        lines.push(Line::from(Span::styled(
            format!("{speaker}:"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for text_line in turn.content().lines() {
            lines.push(Line::from(format!("  {text_line}")));
        }
        lines.push(Line::from(""));
    }

    if app.is_busy() {
        lines.push(Line::from(Span::styled(
            format!("{} {persona_name} is typing...", app.spinner()),
            Style::default().fg(Color::Yellow),
        )));
    }

    if let Some(err) = &app.error_message {
        lines.push(Line::from(Span::styled(
            format!("⚠ {err}"),
            Style::default().fg(Color::Red),
        )));
    }

    // Keep the newest lines in view; wrapping may push a few more off the top
    let visible = area.height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);
    let title = format!("Conversation ({} turns)", app.session.transcript().len());

    let paragraph = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
        .block(titled_block(&title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style, title) = match app.input_mode {
        InputMode::Editing => (
            format!("{}▏", app.input_buffer),
            Style::default().fg(Color::White),
            "Message (Enter send, Esc cancel)",
        ),
        InputMode::Normal => (
            app.input_buffer.clone(),
            Style::default().fg(Color::DarkGray),
            "Message (i type, r reset, s save)",
        ),
    };

    frame.render_widget(Paragraph::new(text).style(style).block(titled_block(title)), area);
}
