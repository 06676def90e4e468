//! The table every list section is drawn with.
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::{
    app::ResourceScreen,
    ui::{
        columns::{CellFormat, TableRow},
        theme::Theme,
    },
};

/// Draw `rows` of `screen` with its visible columns and a paging footer.
pub fn render<T: TableRow>(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    screen: &ResourceScreen<T>,
    rows: &[&T],
    format: &CellFormat,
) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let list = screen.store.state();
    let sort = list.params.column.as_deref().zip(list.params.sort);
    let focused = screen.columns.focused().map(|column| column.key);
    let columns: Vec<_> = screen.columns.visible().collect();

    let header = Row::new(columns.iter().map(|column| {
        let arrow = match sort {
            Some((key, order)) if key == column.key => order.arrow(),
            _ => "",
        };
        let mut style = Style::default().fg(theme.text_muted);
        if Some(column.key) == focused {
            style = style.fg(theme.accent).add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(format!("{}{arrow}", column.title)).style(style)
    }));

    let body = rows.iter().map(|row| {
        Row::new(
            columns
                .iter()
                .map(|column| Cell::from(row.cell(column.key, format))),
        )
    });

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|column| match column.key {
            "id" => Constraint::Length(7),
            _ => Constraint::Fill(1),
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.accent),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    if rows.is_empty() {
        let message = if list.loading {
            Span::styled("Loading…", Style::default().fg(theme.text_muted))
        } else if let Some(error) = &list.error {
            Span::styled(error.clone(), Style::default().fg(theme.error))
        } else {
            Span::styled("Nothing here.", Style::default().fg(theme.text_muted))
        };
        frame.render_widget(Paragraph::new(Line::from(message)).block(block), layout[0]);
    } else {
        let table = Table::new(body, widths)
            .header(header.style(Style::default().add_modifier(Modifier::BOLD)))
            .block(block)
            .style(Style::default().fg(theme.text))
            .row_highlight_style(Style::default().bg(theme.panel).fg(theme.accent))
            .highlight_symbol("› ");
        let selected = screen.selected.min(rows.len() - 1);
        let mut table_state = TableState::default().with_selected(Some(selected));
        frame.render_stateful_widget(table, layout[0], &mut table_state);
    }

    frame.render_widget(Paragraph::new(footer(screen, &theme)), layout[1]);
}

fn footer<T>(screen: &ResourceScreen<T>, theme: &Theme) -> Line<'static> {
    let list = screen.store.state();
    let meta = list.meta;
    let muted = Style::default().fg(theme.text_muted);

    let mut spans = vec![
        Span::styled("page ", muted),
        Span::raw(format!("{}/{}", meta.current_page, meta.page_count())),
        Span::styled("  total ", muted),
        Span::raw(meta.total.to_string()),
        Span::styled("  per page ", muted),
        Span::raw(list.params.per_page.to_string()),
    ];
    if let Some(search) = &list.params.search {
        spans.push(Span::styled("  search ", muted));
        spans.push(Span::styled(
            format!("\"{search}\""),
            Style::default().fg(theme.accent),
        ));
    }
    for (key, value) in &list.params.filters {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{key}={}", value.display()),
            Style::default().fg(theme.accent),
        ));
    }
    if list.loading {
        spans.push(Span::styled("  loading…", Style::default().fg(theme.warning)));
    }
    Line::from(spans)
}
