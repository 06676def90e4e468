use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::{app::Section, ui::theme::Theme};

/// Digit keys reach the first nine sections; the rest only through `[` and `]`.
const DIGIT_TABS: usize = 9;

/// Numbered tab bar of the sections the role can open.
pub fn render_tabs(
    frame: &mut Frame<'_>,
    area: Rect,
    sections: &[Section],
    active: Section,
    theme: &Theme,
) {
    let mut spans = vec![Span::raw(" ")];

    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        if i < DIGIT_TABS {
            spans.push(Span::styled(
                format!("{} ", i + 1),
                Style::default().fg(theme.text_muted),
            ));
        }

        let label = section.label();
        if *section == active {
            spans.push(Span::styled("[", Style::default().fg(theme.accent)));
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("]", Style::default().fg(theme.accent)));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.text_muted)));
        }
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }),
        area,
    );
}

pub fn tab_shortcuts(count: usize, theme: &Theme) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!("1-{}", count.min(DIGIT_TABS)),
            Style::default().fg(theme.accent),
        ),
        Span::raw("/"),
        Span::styled("[ ]", Style::default().fg(theme.accent)),
        Span::raw(" nav"),
    ]
}
