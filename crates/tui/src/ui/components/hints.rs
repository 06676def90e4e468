use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone, Copy)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }
    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

pub mod common {
    use super::KeyHint;

    pub const TABLE: &[KeyHint] = &[
        KeyHint::new("j/k", "select"),
        KeyHint::new("n/p", "page"),
        KeyHint::new("+", "size"),
        KeyHint::new("</>", "column"),
        KeyHint::new("o", "sort"),
        KeyHint::new("h", "hide"),
        KeyHint::new("/", "search"),
        KeyHint::new("f", "filter"),
        KeyHint::new("c", "clear"),
        KeyHint::new("r", "reload"),
    ];

    pub const FORM: &[KeyHint] = &[
        KeyHint::new("Tab", "next"),
        KeyHint::new("Enter", "submit"),
        KeyHint::new("Esc", "cancel"),
    ];

    pub const PROMPT: &[KeyHint] = &[
        KeyHint::new("Enter", "apply"),
        KeyHint::new("Esc", "cancel"),
    ];

    pub const CONFIRM: &[KeyHint] = &[KeyHint::new("y", "confirm"), KeyHint::new("any", "cancel")];

    pub const TRACKING: &[KeyHint] = &[
        KeyHint::new("j/k", "trip"),
        KeyHint::new("C", "complete"),
        KeyHint::new("r", "reload"),
    ];
}
