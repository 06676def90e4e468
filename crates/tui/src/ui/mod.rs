pub mod columns;
pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use chrono::Utc;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Screen, Section, TripsView};
use components::hints::{self, KeyHint, common};
use theme::Theme;

pub use terminal::{ConsoleTerminal as Terminal, restore_terminal, setup_terminal};

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state),
        Screen::Main => render_shell(frame, area, state),
    }
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tab bar
            Constraint::Min(0),    // Section
            Constraint::Length(1), // Hints
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], state.sections(), state.section, &theme);

    match state.section {
        Section::Tracking => screens::tracking::render(frame, layout[2], state),
        Section::Assistant => screens::assistant::render(frame, layout[2], state),
        _ => screens::lists::render(frame, layout[2], state),
    }

    render_bottom_bar(frame, layout[3], state, &theme);

    if let Some(open) = &state.form {
        components::modal::render(frame, area, open.form.view());
    } else if let Some(confirm) = &state.confirm {
        components::prompt::render_confirm(frame, area, confirm);
    } else if let Some(prompt) = &state.prompt {
        components::prompt::render_prompt(frame, area, prompt);
    }
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let now = Utc::now().with_timezone(&state.tz);
    let role = match state.role {
        crate::config::Role::Admin => "admin",
        crate::config::Role::Seller => "seller",
    };
    let muted = Style::default().fg(theme.text_muted);

    let line = Line::from(vec![
        Span::styled("API", muted),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Role", muted),
        Span::raw(format!(": {role}  ")),
        Span::styled("Time", muted),
        Span::raw(format!(": {} {}", now.format("%H:%M"), state.tz.name())),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let modal: Option<&[KeyHint]> = if state.form.is_some() {
        Some(common::FORM)
    } else if state.confirm.is_some() {
        Some(common::CONFIRM)
    } else if state.prompt.is_some() {
        Some(common::PROMPT)
    } else {
        None
    };

    let parts = match modal {
        Some(keys) => hints::hints_to_spans(keys, theme),
        None => {
            let mut parts = components::tabs::tab_shortcuts(state.sections().len(), theme);
            parts.push(hints::hint_separator(theme));
            if state.section == Section::Tracking {
                parts.extend(hints::hints_to_spans(common::TRACKING, theme));
            } else {
                parts.extend(hints::hints_to_spans(common::TABLE, theme));
            }
            let actions = section_hints(state);
            if !actions.is_empty() {
                parts.push(hints::hint_separator(theme));
                parts.extend(hints::hints_to_spans(actions, theme));
            }
            parts.push(hints::hint_separator(theme));
            parts.extend(hints::hints_to_spans(
                &[KeyHint::new("L", "sign out"), KeyHint::new("q", "quit")],
                theme,
            ));
            parts
        }
    };

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

/// Write actions available in the current section.
fn section_hints(state: &AppState) -> &'static [KeyHint] {
    match state.section {
        Section::Loans => &[
            KeyHint { key: "a", action: "disburse" },
            KeyHint { key: "P", action: "repay" },
            KeyHint { key: "x", action: "delete" },
        ],
        Section::Repayments => &[KeyHint { key: "a", action: "record" }],
        Section::Payouts => &[
            KeyHint { key: "v", action: "view" },
            KeyHint { key: "e", action: "answer" },
        ],
        Section::Trips => match state.trips_view {
            TripsView::Trips => &[
                KeyHint { key: "a", action: "new" },
                KeyHint { key: "O", action: "optimize" },
                KeyHint { key: "x", action: "delete" },
                KeyHint { key: "l", action: "logs" },
            ],
            TripsView::OptimizationLogs => &[KeyHint { key: "l", action: "trips" }],
        },
        Section::Vfd => &[KeyHint { key: "a", action: "generate" }],
        Section::Wallet => &[KeyHint { key: "a", action: "top up" }],
        Section::Broadcasts => &[
            KeyHint { key: "a", action: "send" },
            KeyHint { key: "R", action: "resend" },
            KeyHint { key: "x", action: "delete" },
        ],
        Section::Assistant => &[KeyHint { key: "u", action: "credits" }],
        Section::Orders => &[
            KeyHint { key: "t", action: "tab" },
            KeyHint { key: "space", action: "mark" },
            KeyHint { key: "x", action: "delete" },
        ],
        Section::PayoutRequests => &[
            KeyHint { key: "v", action: "view" },
            KeyHint { key: "e", action: "answer" },
        ],
        Section::Products => &[KeyHint { key: "e", action: "metadata" }],
        Section::SellerLoans => &[KeyHint { key: "P", action: "repay" }],
        Section::SellerRepayments => &[KeyHint { key: "a", action: "record" }],
        Section::Tracking => &[],
    }
}
