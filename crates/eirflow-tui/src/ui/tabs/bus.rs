use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use eirflow_core::dashboard::bus::{self, CONGESTION_RADIUS_M, MIN_BUSES_FOR_CONGESTION};
use eirflow_core::utils::geo::{format_distance, CITY_CENTER};
use eirflow_core::utils::{format_coordinates, haversine_meters};

use crate::app::App;
use crate::ui::styles;

use super::{detail_line, empty_detail, render_placeholder};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    if render_placeholder(frame, &app.bus, "Bus Congestion", chunks[0]) {
        empty_detail(frame, "", chunks[1]);
        return;
    }

    render_zone_list(frame, app, chunks[0]);
    render_zone_detail(frame, app, chunks[1]);
}

fn render_zone_list(frame: &mut Frame, app: &App, area: Rect) {
    let zones = app.bus.ready().map(|b| b.zones.as_slice()).unwrap_or_default();

    let header = Row::new(vec![
        Cell::from("Zone"),
        Cell::from("Buses"),
        Cell::from("Intensity"),
        Cell::from("Centre"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = zones
        .iter()
        .enumerate()
        .map(|(i, zone)| {
            let style = if i == app.bus_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(format!("Zone {}", zone.id)),
                Cell::from(zone.bus_count().to_string()),
                Cell::from(format!("{:.1}", zone.total_intensity())),
                Cell::from(format_coordinates(zone.center.0, zone.center.1)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Fill(1),
    ];

    let title = format!(" Congestion Zones ({}) ", zones.len());
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
    state.select(Some(app.bus_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_zone_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(data) = app.bus.ready() else {
        return;
    };

    let mut lines = vec![];

    match data.zones.get(app.bus_selection) {
        Some(zone) => {
            lines.push(Line::from(Span::styled(zone.label(), styles::title_style())));
            lines.push(Line::from(""));
            lines.push(detail_line(
                "Centre:",
                format_coordinates(zone.center.0, zone.center.1),
            ));
            lines.push(detail_line(
                "From city:",
                format_distance(haversine_meters(CITY_CENTER, zone.center)),
            ));
            lines.push(detail_line("Buses:", zone.bus_count().to_string()));
            lines.push(detail_line("Intensity:", format!("{:.1}", zone.total_intensity())));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No congestion detected",
                styles::success_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Heatmap", styles::highlight_style())));
    lines.push(detail_line("Samples:", data.points.len().to_string()));
    lines.push(detail_line("Peak:", format!("{:.1}", bus::max_intensity(&data.points))));
    lines.push(Line::from(Span::styled(
        format!(
            "A zone is {} or more buses within {} of its centre",
            MIN_BUSES_FOR_CONGESTION,
            format_distance(CONGESTION_RADIUS_M)
        ),
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
