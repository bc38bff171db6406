//! # Help UI
//!
//! Keybindings and what each screen is for.

use crate::features::personas::GRIEF_GUARDRAILS;
use crate::tui::ui::titled_block;
use crate::tui::App;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

/// Render the help screen
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_keybindings(frame, chunks[0]);
    render_about(frame, app, chunks[1]);
}

fn render_keybindings(frame: &mut Frame, area: Rect) {
    let keybindings = vec![
        ("General", vec![
            ("q / Ctrl+c", "Quit"),
            ("1 / 2 / ?", "Chat / Persona / Help"),
            ("Esc", "Cancel input"),
        ]),
        ("Chat", vec![
            ("i / Enter", "Type a message"),
            ("Enter", "Send (while typing)"),
            ("r", "Reset the conversation"),
            ("s", "Save the last message to the archive"),
        ]),
        ("Persona", vec![
            ("j / k", "Select field"),
            ("Enter", "Edit text field"),
            ("h / l", "Cycle relationship"),
            ("a", "Apply and start a new conversation"),
        ]),
    ];

    let mut lines = vec![];

    for (section, bindings) in keybindings {
        lines.push(Line::from(Span::styled(
            section,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        for (key, desc) in bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<15}", key), Style::default().fg(Color::Cyan)),
                Span::raw(desc),
            ]));
        }
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines)
        .block(titled_block("Keybindings"))
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn render_about(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "About SOUL",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "  You are talking with a digital memory of {}.",
            app.session.persona().effective_name()
        )),
        Line::from("  It is not a ghost or a spirit, and it will say so if asked."),
        Line::from(format!(
            "  Only the last {} turns are sent with each message.",
            app.session.history_window()
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Guardrails",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(GRIEF_GUARDRAILS.lines().map(|l| Line::from(format!("  {l}"))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("soul v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(titled_block("About"))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}
