//! Sections that are a single resource table, plus their summary rows.
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use engine::resources::{AwaitingAnswer, OrderTab, PayoutView, pending_total};

use crate::{
    app::{AppState, ResourceScreen, Section, TripsView},
    ui::{
        columns::{CellFormat, TableRow, amount},
        components::card::StatCard,
        screens::resource,
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let screens = &state.screens;
    match state.section {
        Section::Loans => table(frame, area, state, "Loans", &screens.loans),
        Section::Repayments => table(frame, area, state, "Repayments", &screens.repayments),
        Section::Payouts => render_queue(
            frame,
            area,
            state,
            state.payout_view,
            &screens.payouts,
            &state.visible_payouts(),
            ["Payout requests", "Payout history"],
        ),
        Section::PayoutRequests => render_queue(
            frame,
            area,
            state,
            state.payout_request_view,
            &screens.payout_requests,
            &state.visible_payout_requests(),
            ["Withdrawal requests", "Withdrawal history"],
        ),
        Section::Orders => render_orders(frame, area, state),
        Section::Products => table(frame, area, state, "AI products", &screens.products),
        Section::Trips => match state.trips_view {
            TripsView::Trips => table(frame, area, state, "Trips", &screens.trips),
            TripsView::OptimizationLogs => table(
                frame,
                area,
                state,
                "Optimization logs",
                &screens.optimization_logs,
            ),
        },
        Section::Vfd => table(frame, area, state, "VFD receipts", &screens.vfd_receipts),
        Section::Wallet => table(frame, area, state, "Wallet history", &screens.wallet),
        Section::Broadcasts => table(frame, area, state, "Broadcasts", &screens.broadcasts),
        Section::SellerLoans => render_seller_loans(frame, area, state),
        Section::SellerRepayments => table(
            frame,
            area,
            state,
            "My repayments",
            &screens.seller_repayments,
        ),
        Section::Tracking | Section::Assistant => {}
    }
}

fn table<T: TableRow>(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    title: &str,
    screen: &ResourceScreen<T>,
) {
    let rows: Vec<&T> = screen.items().iter().collect();
    resource::render(frame, area, title, screen, &rows, &CellFormat::new(state.tz));
}

/// A money queue: summary line, then pending or answered rows.
fn render_queue<T: TableRow + AwaitingAnswer>(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    view: PayoutView,
    screen: &ResourceScreen<T>,
    rows: &[&T],
    [pending_title, history_title]: [&str; 2],
) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let mut summary = vec![
        Span::styled(" view ", Style::default().fg(theme.text_muted)),
        Span::styled(view.label(), Style::default().fg(theme.accent)),
    ];
    if view == PayoutView::Pending {
        summary.push(Span::styled(
            "  pending on this page ",
            Style::default().fg(theme.text_muted),
        ));
        summary.push(Span::raw(amount(pending_total(screen.items()))));
    }
    frame.render_widget(Paragraph::new(Line::from(summary)), layout[0]);

    let title = match view {
        PayoutView::Pending => pending_title,
        PayoutView::History => history_title,
    };
    resource::render(
        frame,
        layout[1],
        title,
        screen,
        rows,
        &CellFormat::new(state.tz),
    );
}

fn render_orders(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let muted = Style::default().fg(theme.text_muted);
    let mut summary = vec![Span::styled(" tab ", muted)];
    for tab in OrderTab::all() {
        let style = if tab == state.order_tab {
            Style::default().fg(theme.accent)
        } else {
            muted
        };
        summary.push(Span::styled(format!("{} ", tab.label()), style));
    }
    if !state.marked_orders.is_empty() {
        let marked: Vec<String> = state.marked_orders.iter().map(|id| format!("#{id}")).collect();
        summary.push(Span::styled(" marked ", muted));
        summary.push(Span::styled(marked.join(" "), Style::default().fg(theme.warning)));
    }
    frame.render_widget(Paragraph::new(Line::from(summary)), layout[0]);

    table(frame, layout[1], state, "Orders", &state.screens.orders);
}

fn render_seller_loans(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let Some(stats) = &state.seller_stats else {
        table(frame, area, state, "My loans", &state.screens.seller_loans);
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(layout[0]);

    StatCard::new("Loans", stats.total_loans.to_string(), &theme)
        .subtitle(format!("{} active", stats.active_loans))
        .render(frame, cols[0]);
    StatCard::new("Borrowed", amount(stats.total_amount), &theme)
        .subtitle(format!("{} repaid", amount(stats.total_repaid)))
        .render(frame, cols[1]);
    StatCard::new("Outstanding", amount(stats.outstanding), &theme).render(frame, cols[2]);

    table(frame, layout[1], state, "My loans", &state.screens.seller_loans);
}
