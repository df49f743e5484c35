use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use eirflow_core::models::DensityTier;
use eirflow_core::utils::format_coordinates;

use crate::app::App;
use crate::ui::styles;

use super::{detail_line, empty_detail, render_placeholder};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    if render_placeholder(frame, &app.pedestrian, "Pedestrian", chunks[0]) {
        empty_detail(frame, "", chunks[1]);
        return;
    }

    render_point_list(frame, app, chunks[0]);
    render_point_detail(frame, app, chunks[1]);
}

fn render_point_list(frame: &mut Frame, app: &App, area: Rect) {
    let points = app.visible_pedestrian();

    let header = Row::new(vec![
        Cell::from("Street"),
        Cell::from("Count"),
        Cell::from("Time"),
        Cell::from("Density"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let style = if i == app.pedestrian_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let tier = point.tier();
            Row::new(vec![
                Cell::from(point.location.as_str()),
                Cell::from(format!("{:.0}", point.predicted_count)),
                Cell::from(point.formatted_time.as_str()),
                Cell::from(Span::styled(tier.label(), styles::density_style(tier))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(8),
    ];

    let filter = if app.pedestrian_high_traffic_only {
        "high traffic"
    } else {
        "all"
    };
    let title = format!(" Pedestrian ({}, {}) - [h] toggle ", points.len(), filter);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.pedestrian_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_point_detail(frame: &mut Frame, app: &App, area: Rect) {
    let points = app.visible_pedestrian();

    let mut lines = match points.get(app.pedestrian_selection) {
        Some(point) => {
            let tier = point.tier();
            vec![
                Line::from(Span::styled(point.location.clone(), styles::title_style())),
                Line::from(""),
                detail_line("Position:", format_coordinates(point.latitude, point.longitude)),
                detail_line("Expected:", format!("{:.0} people", point.predicted_count)),
                detail_line("Date:", point.formatted_date.clone()),
                detail_line("Time:", point.formatted_time.clone()),
                Line::from(vec![
                    Span::styled(format!("{:<10}", "Density:"), styles::muted_style()),
                    Span::styled(tier.label(), styles::density_style(tier)),
                ]),
            ]
        }
        None => vec![Line::from(Span::styled(
            "No streets match the filter",
            styles::muted_style(),
        ))],
    };

    // Legend
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Density", styles::highlight_style())));
    for (tier, range) in [
        (DensityTier::High, "over 200"),
        (DensityTier::Medium, "over 100"),
        (DensityTier::Low, "up to 100"),
    ] {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<8}", tier.label()), styles::density_style(tier)),
            Span::styled(range, styles::muted_style()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
