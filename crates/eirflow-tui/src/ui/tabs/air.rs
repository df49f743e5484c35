use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use eirflow_core::dashboard::air;
use eirflow_core::utils::format_coordinates;

use crate::app::App;
use crate::ui::styles;

use super::{detail_line, empty_detail, render_placeholder, wrap_text};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    if render_placeholder(frame, &app.air, "Air Quality", chunks[0]) {
        empty_detail(frame, "", chunks[1]);
        return;
    }

    render_station_list(frame, app, chunks[0]);
    render_station_detail(frame, app, chunks[1]);
}

fn render_station_list(frame: &mut Frame, app: &App, area: Rect) {
    let stations = app.air.ready().map(Vec::as_slice).unwrap_or_default();

    let header = Row::new(vec![
        Cell::from("Station"),
        Cell::from("AQI"),
        Cell::from("PM1"),
        Cell::from("Category"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = stations
        .iter()
        .enumerate()
        .map(|(i, station)| {
            let style = if i == app.air_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let category = station.category();
            Row::new(vec![
                Cell::from(station.name.as_str()),
                Cell::from(station.formatted_aqi()),
                Cell::from(station.formatted_pm1()),
                Cell::from(Span::styled(category.label(), styles::aqi_style(category))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(22),
    ];

    let average = air::average_aqi(stations)
        .map(|avg| format!("avg AQI {:.1}", avg))
        .unwrap_or_else(|| "no readings".to_string());
    let title = format!(" Air Quality ({}) - {} ", stations.len(), average);

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
    state.select(Some(app.air_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_station_detail(frame: &mut Frame, app: &App, area: Rect) {
    let stations = app.air.ready().map(Vec::as_slice).unwrap_or_default();

    let mut lines = match stations.get(app.air_selection) {
        Some(station) => {
            let category = station.category();
            let mut lines = vec![
                Line::from(Span::styled(station.name.clone(), styles::title_style())),
                Line::from(""),
                detail_line("Position:", format_coordinates(station.latitude, station.longitude)),
                detail_line("AQI:", station.formatted_aqi()),
                detail_line("PM1:", station.formatted_pm1()),
                Line::from(vec![
                    Span::styled(format!("{:<10}", "Level:"), styles::muted_style()),
                    Span::styled(category.label(), styles::aqi_style(category)),
                ]),
                Line::from(""),
                Line::from(Span::styled("Health impact", styles::highlight_style())),
            ];
            for line in wrap_text(&station.health_impact, (area.width as usize).saturating_sub(4)) {
                lines.push(Line::from(line));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "No air quality stations reported",
            styles::muted_style(),
        ))],
    };

    // City-wide breakdown
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("All stations", styles::highlight_style())));
    for (category, count) in air::category_counts(stations) {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<22}", category.label()), styles::aqi_style(category)),
            Span::styled(count.to_string(), styles::muted_style()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
