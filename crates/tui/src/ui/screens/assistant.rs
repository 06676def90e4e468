use api_types::assistant::TopEntry;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{
        columns::CellFormat,
        components::card::{Card, StatCard},
        screens::resource,
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(8),
            Constraint::Min(6),
        ])
        .split(area);

    render_stats(frame, layout[0], state, &theme);
    render_tops(frame, layout[1], state, &theme);

    let screen = &state.screens.assistant_logs;
    let rows: Vec<_> = screen.items().iter().collect();
    resource::render(
        frame,
        layout[2],
        "Assistant requests",
        screen,
        &rows,
        &CellFormat::new(state.tz),
    );
}

fn render_stats(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ])
        .split(area);

    let panel = &state.assistant;
    let Some(stats) = &panel.stats else {
        let message = panel.error.as_deref().unwrap_or("Loading…");
        Card::new("Statistics", theme).render_with(frame, area, Paragraph::new(message));
        return;
    };

    StatCard::new("Requests", stats.total_requests.to_string(), theme)
        .subtitle(format!("{} today", stats.today_requests))
        .render(frame, cols[0]);
    StatCard::new("Successful", stats.successful_requests.to_string(), theme).render(frame, cols[1]);
    StatCard::new("Failed", stats.failed_requests.to_string(), theme).render(frame, cols[2]);
    StatCard::new("Success rate", format!("{:.1}%", stats.success_rate()), theme)
        .render(frame, cols[3]);
}

fn render_tops(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let panel = &state.assistant;
    let types: Vec<TopEntry> = panel
        .stats
        .as_ref()
        .map(|stats| {
            stats
                .request_types
                .iter()
                .map(|kind| TopEntry {
                    name: kind.kind.clone(),
                    count: kind.count,
                })
                .collect()
        })
        .unwrap_or_default();

    render_top(frame, cols[0], "Request types", &types, theme);
    render_top(frame, cols[1], "Top filters", &panel.top_filters, theme);
    render_top(frame, cols[2], "Top exclusions", &panel.top_exclusions, theme);
}

fn render_top(frame: &mut Frame<'_>, area: Rect, title: &str, entries: &[TopEntry], theme: &Theme) {
    let lines: Vec<Line> = if entries.is_empty() {
        vec![Line::from(Span::styled("-", Style::default().fg(theme.text_muted)))]
    } else {
        entries
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>5} ", entry.count),
                        Style::default().fg(theme.accent),
                    ),
                    Span::raw(entry.name.clone()),
                ])
            })
            .collect()
    };
    Card::new(title, theme).render_with(frame, area, Paragraph::new(lines));
}
