use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{Confirm, ConfirmAction, Prompt, PromptKind},
    ui::{components::centered_box, theme::Theme},
};

pub fn render_prompt(frame: &mut Frame<'_>, area: Rect, prompt: &Prompt) {
    let theme = Theme::default();
    let (title, help) = match prompt.kind {
        PromptKind::Search => (" search ", "empty text clears the search"),
        PromptKind::Filter => (" filter ", "key=value, key=a,b for a list, key= to drop"),
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("{}│", prompt.text),
            Style::default().fg(theme.accent),
        )),
        Line::from(Span::styled(help, Style::default().fg(theme.text_muted))),
    ];
    render_box(frame, area, title, lines, &theme);
}

pub fn render_confirm(frame: &mut Frame<'_>, area: Rect, confirm: &Confirm) {
    let theme = Theme::default();
    let question = match &confirm.action {
        ConfirmAction::Delete(id) => format!("Delete #{id}?"),
        ConfirmAction::CompleteTrip(id) => format!("Mark trip #{id} as completed?"),
        ConfirmAction::DeleteOrders(ids) if ids.len() == 1 => format!("Delete order #{}?", ids[0]),
        ConfirmAction::DeleteOrders(ids) => format!("Delete {} orders?", ids.len()),
    };
    let lines = vec![
        Line::from(Span::styled(question, Style::default().fg(theme.text))),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::styled(" yes  ", Style::default().fg(theme.text_muted)),
            Span::styled("any other key", Style::default().fg(theme.accent)),
            Span::styled(" no", Style::default().fg(theme.text_muted)),
        ]),
    ];
    render_box(frame, area, " confirm ", lines, &theme);
}

fn render_box(frame: &mut Frame<'_>, area: Rect, title: &str, lines: Vec<Line<'_>>, theme: &Theme) {
    let popup = centered_box(56, lines.len() as u16 + 2, area);
    let block = Block::default()
        .title(Span::styled(title.to_string(), Style::default().fg(theme.accent)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.panel));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
