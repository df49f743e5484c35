use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use eirflow_core::utils::format_coordinates;

use crate::app::App;
use crate::ui::styles;

use super::{detail_line, empty_detail, render_placeholder, wrap_text};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    if render_placeholder(frame, &app.events, "Events", chunks[0]) {
        empty_detail(frame, "", chunks[1]);
        return;
    }

    render_event_list(frame, app, chunks[0]);
    render_event_detail(frame, app, chunks[1]);
}

fn render_event_list(frame: &mut Frame, app: &App, area: Rect) {
    let events = app.visible_events();

    let header = Row::new(vec![Cell::from("Name"), Cell::from("Date"), Cell::from("Type")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let style = if i == app.event_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(event.name.as_str()),
                Cell::from(event.formatted_start()),
                Cell::from(event.event_type.as_str()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(50),
        Constraint::Length(14),
        Constraint::Fill(1),
    ];

    let filter = if app.events_upcoming_only {
        "next 7 days"
    } else {
        "all"
    };
    let title = format!(" Events ({}, {}) - [w] toggle ", events.len(), filter);

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
    state.select(Some(app.event_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_event_detail(frame: &mut Frame, app: &App, area: Rect) {
    let events = app.visible_events();
    let width = (area.width as usize).saturating_sub(4);

    let content = match events.get(app.event_selection) {
        Some(event) => {
            let mut lines = vec![];

            for line in wrap_text(&event.name, width) {
                lines.push(Line::from(Span::styled(line, styles::title_style())));
            }
            lines.push(Line::from(""));

            lines.push(detail_line("Start:", event.formatted_start()));
            lines.push(detail_line("End:", event.formatted_end()));
            if let Some(hours) = event.first_session_hours() {
                lines.push(detail_line("Hours:", hours));
            }
            lines.push(detail_line("Type:", event.event_type.clone()));
            lines.push(detail_line(
                "Position:",
                format_coordinates(event.position.0, event.position.1),
            ));
            if let Some(ref url) = event.url {
                lines.push(detail_line("Link:", url.clone()));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Description", styles::highlight_style())));
            for line in wrap_text(&event.description, width) {
                lines.push(Line::from(line));
            }

            if event.schedule.len() > 1 {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Schedule", styles::highlight_style())));
                for session in &event.schedule {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", session.summary()),
                        styles::muted_style(),
                    )));
                }
            }

            lines
        }
        None => vec![Line::from(Span::styled(
            "No events match the filter",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(content).block(block), area);
}
