use api_types::trip::StopStatus;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
    app::AppState,
    ui::{
        columns::CellFormat,
        components::card::Card,
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_trips(frame, layout[0], state, &theme);
    render_position(frame, layout[1], state, &theme);
}

fn render_trips(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let tracking = &state.tracking;
    let card = Card::new("Active trips", theme).focused(true);

    if tracking.trips.is_empty() {
        let message = if tracking.loading {
            Span::styled("Loading…", Style::default().fg(theme.text_muted))
        } else if let Some(error) = &tracking.error {
            Span::styled(error.clone(), Style::default().fg(theme.error))
        } else {
            Span::styled("No trip on the road.", Style::default().fg(theme.text_muted))
        };
        card.render_with(frame, area, Paragraph::new(Line::from(message)));
        return;
    }

    let items: Vec<ListItem> = tracking
        .trips
        .iter()
        .map(|trip| {
            ListItem::new(Line::from(vec![
                Span::raw(trip.label()),
                Span::styled(
                    format!("  {}", trip.status.as_str()),
                    Style::default().fg(theme.text_muted),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(card.block())
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("› ");
    let mut list_state = ListState::default().with_selected(Some(tracking.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_position(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let tracking = &state.tracking;
    let Some(trip) = tracking.selected_trip() else {
        Card::new("Driver", theme).render_with(frame, area, Paragraph::new(""));
        return;
    };
    let format = CellFormat::new(state.tz);
    let muted = Style::default().fg(theme.text_muted);
    let label = |text: &'static str| Span::styled(format!("{text:<14}"), muted);

    let mut lines = vec![
        Line::from(vec![
            label("Driver"),
            Span::raw(
                trip.driver
                    .as_ref()
                    .map(|driver| driver.display_name())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]),
        Line::from(vec![
            label("Stops"),
            Span::raw(format!(
                "{} arrived, {} pending, {} skipped",
                trip.stops_with(StopStatus::Arrived),
                trip.stops_with(StopStatus::Pending),
                trip.stops_with(StopStatus::Skipped),
            )),
        ]),
        Line::from(vec![
            label("Started"),
            Span::raw(format.datetime(trip.started_at.as_ref())),
        ]),
        Line::from(""),
    ];

    match &tracking.location {
        Some(location) => {
            lines.push(Line::from(vec![
                label("Position"),
                Span::styled(
                    format!("{:.5}, {:.5}", location.lat, location.lng),
                    Style::default().fg(theme.accent),
                ),
            ]));
            lines.push(Line::from(vec![
                label("Updated"),
                Span::raw(format.datetime(location.updated_at.as_ref())),
            ]));
        }
        None => lines.push(Line::from(Span::styled("Waiting for the first position…", muted))),
    }
    if let Some(km) = tracking.next_stop_km() {
        lines.push(Line::from(vec![
            label("Next stop"),
            Span::raw(format!("{km:.1} km as the crow flies")),
        ]));
    }
    if let Some(km) = tracking.planned_km() {
        lines.push(Line::from(vec![
            label("Planned route"),
            Span::raw(format!("{km:.1} km as the crow flies")),
        ]));
    }
    if let Some(error) = &tracking.location_error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(theme.error))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("refreshing every {} s", state.poll_interval.as_secs_f32()),
        muted,
    )));

    let title = trip.label();
    Card::new(&title, theme).render_with(frame, area, Paragraph::new(lines));
}
