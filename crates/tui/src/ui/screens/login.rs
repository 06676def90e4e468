use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField},
    ui::{components::centered_box, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let box_height = if state.captcha_enabled { 9 } else { 7 };
    let card_area = centered_box(56, box_height, area);
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" api token ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // server
            Constraint::Length(1),
            Constraint::Length(1), // token
            Constraint::Length(1),
            Constraint::Length(1), // captcha
        ])
        .margin(1)
        .split(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(
            state.base_url.as_str(),
            Style::default().fg(theme.text_muted),
        )),
        rows[0],
    );

    let login = &state.login;
    render_input(
        frame,
        rows[2],
        &login.token,
        true,
        login.focus == LoginField::Token,
        &theme,
    );
    if state.captcha_enabled {
        let label = Line::from(vec![
            Span::styled("captcha ", Style::default().fg(theme.text_muted)),
            input_span(
                &login.captcha,
                false,
                login.focus == LoginField::Captcha,
                &theme,
            ),
        ]);
        frame.render_widget(Paragraph::new(label), rows[4]);
    }

    if let Some(message) = &login.message {
        let error_area = Rect {
            x: card_area.x,
            y: card_area.y + card_area.height + 1,
            width: card_area.width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            error_area,
        );
    }
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    value: &str,
    secret: bool,
    focused: bool,
    theme: &Theme,
) {
    frame.render_widget(Paragraph::new(input_span(value, secret, focused, theme)), area);
}

fn input_span(value: &str, secret: bool, focused: bool, theme: &Theme) -> Span<'static> {
    let cursor = if focused { "│" } else { "" };
    let display = if secret {
        format!("{}{cursor}", mask(value))
    } else {
        format!("{value}{cursor}")
    };
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };
    Span::styled(display, style)
}

/// One bullet per character, capped so long tokens fit the box.
fn mask(secret: &str) -> String {
    "•".repeat(secret.chars().count().min(48))
}
