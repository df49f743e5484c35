use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use eirflow_core::utils::format_coordinates;

use crate::app::App;
use crate::ui::styles;

use super::{detail_line, empty_detail, render_placeholder};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    if render_placeholder(frame, &app.bikes, "Bike Stations", chunks[0]) {
        empty_detail(frame, "", chunks[1]);
        return;
    }

    render_station_list(frame, app, chunks[0]);
    render_station_detail(frame, app, chunks[1]);
}

fn render_station_list(frame: &mut Frame, app: &App, area: Rect) {
    let stations = app.visible_bikes();

    let header = Row::new(vec![
        Cell::from("Station"),
        Cell::from("Bikes"),
        Cell::from("Forecast"),
        Cell::from("Stands"),
        Cell::from("Demand"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = stations
        .iter()
        .enumerate()
        .map(|(i, station)| {
            let style = if i == app.bike_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(station.name.as_str()),
                Cell::from(format!("{:.0}", station.current_bikes)),
                Cell::from(format!("{:.0}", station.predicted_bikes)),
                Cell::from(format!("{:.0}", station.total_capacity)),
                Cell::from(Span::styled(
                    station.demand_percent(),
                    styles::demand_style(station.is_high_demand()),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(7),
        Constraint::Length(8),
    ];

    let filter = if app.bikes_high_demand_only {
        "high demand"
    } else {
        "all"
    };
    let title = format!(" Bike Stations ({}, {}) - [h] toggle ", stations.len(), filter);

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
    state.select(Some(app.bike_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_station_detail(frame: &mut Frame, app: &App, area: Rect) {
    let stations = app.visible_bikes();

    let content = match stations.get(app.bike_selection) {
        Some(station) => {
            let mut lines = vec![
                Line::from(Span::styled(station.name.clone(), styles::title_style())),
                Line::from(""),
                detail_line("Position:", format_coordinates(station.position.0, station.position.1)),
                detail_line("Bikes:", format!("{:.0}", station.current_bikes)),
                detail_line("Forecast:", format!("{:.0}", station.predicted_bikes)),
                detail_line("Stands:", format!("{:.0}", station.total_capacity)),
                Line::from(vec![
                    Span::styled(format!("{:<10}", "Demand:"), styles::muted_style()),
                    Span::styled(
                        station.demand_percent(),
                        styles::demand_style(station.is_high_demand()),
                    ),
                    Span::styled(
                        if station.is_high_demand() { "  high" } else { "" },
                        styles::error_style(),
                    ),
                ]),
            ];
            if let Some(ref status) = station.status {
                lines.push(detail_line("Status:", status.clone()));
            }
            if let Some(ref updated) = station.last_updated {
                lines.push(detail_line("Updated:", updated.clone()));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Weekly forecast", styles::highlight_style())));
            if station.weekly_predictions.is_empty() {
                lines.push(Line::from(Span::styled("  No forecast", styles::muted_style())));
            }
            for forecast in &station.weekly_predictions {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<14}", forecast.formatted_date()), styles::muted_style()),
                    Span::raw(format!(
                        "{} bikes / {} stands",
                        forecast.display_bikes(),
                        forecast.display_stands()
                    )),
                ]));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "No stations match the filter",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(content).block(block), area);
}
