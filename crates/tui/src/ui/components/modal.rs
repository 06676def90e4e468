use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    app::FormView,
    ui::{components::centered_box, theme::Theme},
};

/// Form popup: one line per field, its error under it, the server message
/// at the bottom.
pub fn render(frame: &mut Frame<'_>, area: Rect, form: &dyn FormView) {
    let theme = Theme::default();
    let fields = form.fields();

    let mut lines = Vec::with_capacity(fields.len() * 2 + 3);
    for (index, field) in fields.iter().enumerate() {
        let focused = index == form.focus();
        let marker = if field.required { "*" } else { " " };
        let label_style = if focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_muted)
        };

        let value = form.value(field.key);
        let shown = if value.is_empty() && !focused {
            Span::styled(field.placeholder, Style::default().fg(theme.border))
        } else {
            let cursor = if focused { "│" } else { "" };
            Span::styled(format!("{value}{cursor}"), Style::default().fg(theme.text))
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<16}", field.label), label_style),
            shown,
        ]));
        if let Some(error) = form.field_error(field.key) {
            lines.push(Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(theme.error),
            )));
        }
    }

    lines.push(Line::from(""));
    if form.submitting() {
        lines.push(Line::from(Span::styled(
            "Sending…",
            Style::default().fg(theme.warning),
        )));
    } else if let Some(error) = form.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(theme.error),
        )));
    }

    let height = lines.len() as u16 + 2;
    let popup = centered_box(64, height, area);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", form.title()),
            Style::default().fg(theme.accent),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.panel));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        popup,
    );
}
