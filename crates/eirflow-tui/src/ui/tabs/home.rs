//! Home tab: route planner plus a city overview.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use eirflow_core::dashboard::{air, bikes, bus, events, pedestrian, Layer, RouteResult};
use eirflow_core::models::RouteKind;
use eirflow_core::utils::geo::format_distance;
use eirflow_core::utils::{format_coordinates, truncate_string};

use crate::app::{App, AppState, RouteField, ViewData};
use crate::ui::styles;

/// Overlay items listed under each enabled layer.
const LAYER_PREVIEW_ITEMS: usize = 3;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    render_planner(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_routes(frame, app, body[0]);
    if app.state == AppState::EditingRoute && !app.suggestions.is_empty() {
        render_suggestions(frame, app, body[1]);
    } else {
        render_overview(frame, app, body[1]);
    }
}

fn input_line<'a>(app: &App, field: RouteField, label: &'a str, value: &'a str) -> Line<'a> {
    let editing = app.state == AppState::EditingRoute && app.route_field == field;
    let style = if editing {
        styles::input_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if editing { "▌" } else { "" };
    Line::from(vec![
        Span::styled(format!(" {:<6}[", label), styles::muted_style()),
        Span::styled(format!("{}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_planner(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.state == AppState::EditingRoute;
    let hint = if editing {
        "[Tab] switch field  [↑/↓] pick suggestion  [Enter] search  [Esc] done"
    } else {
        "[e] edit  [Enter] search  [f] route filter  [a/h/v/b/p] toggle layers"
    };

    let lines = vec![
        input_line(app, RouteField::Source, "From", &app.route_source),
        input_line(app, RouteField::Destination, "To", &app.route_destination),
        Line::from(Span::styled(format!(" {}", hint), styles::muted_style())),
    ];

    let block = Block::default()
        .title(" Route Planner ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_routes(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.route {
        ViewData::NotLoaded => vec![Line::from(Span::styled(
            "Enter a start and a destination, then press Enter",
            styles::muted_style(),
        ))],
        ViewData::Loading => vec![Line::from(Span::styled(
            "Finding routes...",
            styles::highlight_style(),
        ))],
        ViewData::Failed(msg) => vec![Line::from(Span::styled(msg.clone(), styles::error_style()))],
        ViewData::Ready(result) => route_lines(app, result),
    };

    let title = format!(" Routes - {} ", app.route_filter.label());
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(!matches!(app.state, AppState::EditingRoute)));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn route_lines<'a>(app: &App, result: &'a RouteResult) -> Vec<Line<'a>> {
    let mut lines = vec![];

    if result.plan.is_empty() {
        lines.push(Line::from(Span::styled(
            "No route returned for these places",
            styles::muted_style(),
        )));
    }

    for kind in RouteKind::ALL {
        if !app.route_filter.shows(kind) || result.plan.route(kind).is_empty() {
            continue;
        }
        let style = match kind {
            RouteKind::Normal => styles::list_item_style(),
            RouteKind::Sustainable => styles::success_style(),
            RouteKind::Clean => styles::title_style(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<13}", kind.label()), style),
            Span::raw(format!("{:>9}", format_distance(result.plan.length_meters(kind)))),
            Span::styled(
                format!("  {} points", result.plan.route(kind).len()),
                styles::muted_style(),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Layers", styles::highlight_style())));
    for (key, layer) in ['a', 'h', 'v', 'b', 'p'].into_iter().zip(Layer::ALL) {
        let on = app.route_layers.is_on(layer);
        lines.push(Line::from(vec![
            Span::styled(format!(" [{}] ", key), styles::help_key_style()),
            Span::styled(
                if on { "● " } else { "○ " },
                if on { styles::success_style() } else { styles::muted_style() },
            ),
            Span::raw(format!("{:<12}", layer.label())),
            Span::styled(format!("{} items", result.layer_len(layer)), styles::muted_style()),
        ]));
        if on {
            for item in layer_preview(result, layer) {
                lines.push(Line::from(Span::styled(
                    format!("       {}", item),
                    styles::muted_style(),
                )));
            }
        }
    }

    lines
}

/// A few entries of an overlay, most significant first.
fn layer_preview(result: &RouteResult, layer: Layer) -> Vec<String> {
    let items: Vec<String> = match layer {
        Layer::Aqi => result
            .air
            .iter()
            .map(|s| format!("{}: AQI {} ({})", s.name, s.formatted_aqi(), s.category()))
            .collect(),
        Layer::Heatmap => bus::congestion_zones(&result.heat)
            .iter()
            .map(|z| format!("{} at {}", z.label(), format_coordinates(z.center.0, z.center.1)))
            .collect(),
        Layer::Events => result
            .events
            .iter()
            .map(|e| format!("{} ({})", truncate_string(&e.name, 30), e.formatted_start()))
            .collect(),
        Layer::BikeStands => bikes::high_demand(&result.bikes)
            .iter()
            .map(|s| format!("{}: {} demand", s.name, s.demand_percent()))
            .collect(),
        Layer::Pedestrian => pedestrian::high_traffic(&result.pedestrian)
            .iter()
            .map(|p| format!("{}: {:.0} people", p.location, p.predicted_count))
            .collect(),
    };
    items.into_iter().take(LAYER_PREVIEW_ITEMS).collect()
}

fn render_suggestions(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, place)| {
            let style = if Some(i) == app.suggestion_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Line::from(Span::styled(
                truncate_string(&place.display_name, (area.width as usize).saturating_sub(4)),
                style,
            ))
        })
        .collect();

    let block = Block::default()
        .title(" Suggestions ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_overview(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    if let Some(user) = app.user() {
        lines.push(Line::from(vec![
            Span::styled("Signed in as ", styles::muted_style()),
            Span::styled(user.display(), styles::highlight_style()),
        ]));
        lines.push(Line::from(""));
    }

    let pending = "loading...".to_string();

    let bus_line = match app.bus.ready() {
        Some(data) => format!("{} congestion zones", data.zones.len()),
        None => app.bus.error().map(str::to_string).unwrap_or_else(|| pending.clone()),
    };
    let bikes_line = match app.bikes.ready() {
        Some(stations) => format!(
            "{} of {} stations in high demand",
            bikes::high_demand(stations).len(),
            stations.len()
        ),
        None => app.bikes.error().map(str::to_string).unwrap_or_else(|| pending.clone()),
    };
    let events_line = match app.events.ready() {
        Some(list) => format!("{} in the next 7 days", events::upcoming(list, Utc::now()).len()),
        None => app.events.error().map(str::to_string).unwrap_or_else(|| pending.clone()),
    };
    let pedestrian_line = match app.pedestrian.ready() {
        Some(points) => format!("{} busy streets", pedestrian::high_traffic(points).len()),
        None => app.pedestrian.error().map(str::to_string).unwrap_or_else(|| pending.clone()),
    };
    let air_line = match app.air.ready() {
        Some(stations) => match air::average_aqi(stations) {
            Some(avg) => format!("average AQI {:.1} over {} stations", avg, stations.len()),
            None => "no stations reporting".to_string(),
        },
        None => app.air.error().map(str::to_string).unwrap_or_else(|| pending.clone()),
    };

    for (label, value) in [
        ("Bus", bus_line),
        ("Bikes", bikes_line),
        ("Events", events_line),
        ("Pedestrian", pedestrian_line),
        ("Air", air_line),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", label), styles::muted_style()),
            Span::raw(value),
        ]));
    }

    if app.inbox.has_unread() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} unread notification(s)", app.inbox.unread_count()),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Today in the city ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
