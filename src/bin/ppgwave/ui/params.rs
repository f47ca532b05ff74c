//! Parameter list widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::PatchState;

pub fn render_params(frame: &mut Frame, area: Rect, patch: &PatchState) {
    let block = Block::default().title(" Parameters ").borders(Borders::ALL);

    let lines: Vec<Line> = patch
        .values()
        .map(|(param, value)| {
            let selected = param == patch.selected();
            let style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let marker = if selected { "> " } else { "  " };
            Line::from(vec![
                Span::styled(format!("{}{:<12}", marker, param.name()), style),
                Span::styled(format!("{:>5}", value), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
