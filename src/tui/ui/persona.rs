//! # Persona UI
//!
//! Form for the persona, with a live preview of the instruction it produces.

use crate::features::personas::build_instruction;
use crate::tui::ui::{titled_block, truncate_text};
use crate::tui::{App, InputMode, PersonaField};
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

pub fn render_persona(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_form(frame, app, chunks[0]);
    render_preview(frame, app, chunks[1]);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.persona_form;
    let width = area.width.saturating_sub(6) as usize;
    let mut lines = Vec::new();

    for field in PersonaField::all() {
        let selected = *field == form.selected;
        let marker = if selected { "▶ " } else { "  " };
        let label_style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(format!("{marker}{}", field.label()), label_style)));

        let mut value = form.value(*field);
        if *field == PersonaField::Relationship {
            value = format!("◀ {value} ▶");
        } else if selected && app.input_mode == InputMode::Editing {
            value.push('▏');
        }
        lines.push(Line::from(format!("    {}", truncate_text(&value, width))));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "j/k field · Enter edit · h/l relationship · a apply (starts a new conversation)",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(titled_block("Persona"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let instruction = build_instruction(&app.persona_form.to_persona());
    let paragraph = Paragraph::new(instruction)
        .style(Style::default().fg(Color::Gray))
        .block(titled_block("Instruction preview"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
