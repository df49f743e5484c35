use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use eirflow_core::models::Role;
use eirflow_core::utils::{format_date, truncate_string};

use crate::app::App;
use crate::ui::styles;

use super::{detail_line, wrap_text};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_notification_list(frame, app, chunks[0]);
    render_notification_detail(frame, app, chunks[1]);
}

fn render_notification_list(frame: &mut Frame, app: &App, area: Rect) {
    let items = app.inbox.items();

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Status"),
        Cell::from("Mode"),
        Cell::from("Manager"),
        Cell::from("Message"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = items
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let style = if i == app.notification_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let marker = if app.inbox.is_unread(&n.id) { "●" } else { "" };
            Row::new(vec![
                Cell::from(Span::styled(marker, styles::error_style())),
                Cell::from(Span::styled(
                    n.status.as_str(),
                    styles::notification_status_style(n.status),
                )),
                Cell::from(n.mode_of_transport.as_str()),
                Cell::from(n.manager_name.as_str()),
                Cell::from(truncate_string(n.message.as_deref().unwrap_or("-"), 60)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Length(9),
        Constraint::Length(11),
        Constraint::Length(14),
        Constraint::Fill(1),
    ];

    let actions = match app.user().map(|u| u.role) {
        Some(Role::Supervisor) => "[a]pprove [r]eject",
        Some(Role::Manager) => "[n]ew request",
        _ => "",
    };
    let title = format!(
        " Reroute Requests ({}, {} pending) - {} ",
        items.len(),
        app.inbox.pending_count(),
        actions
    );

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
    state.select(Some(app.notification_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_notification_detail(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.selected_notification() {
        Some(n) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    format!("Request {}", n.id),
                    styles::title_style(),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled(format!("{:<10}", "Status:"), styles::muted_style()),
                    Span::styled(n.status.as_str(), styles::notification_status_style(n.status)),
                ]),
                detail_line("Mode:", n.mode_of_transport.as_str()),
                detail_line("Manager:", n.manager_name.clone()),
            ];
            if let Some(ref location) = n.location {
                lines.push(detail_line("Location:", location.clone()));
            }
            if let Some(ref created) = n.created_at {
                lines.push(detail_line("Sent:", format_date(created)));
            }
            if let Some(ref updated) = n.updated_at {
                lines.push(detail_line("Updated:", format_date(updated)));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Message", styles::highlight_style())));
            let message = n.message.as_deref().unwrap_or("No message");
            for line in wrap_text(message, (area.width as usize).saturating_sub(4)) {
                lines.push(Line::from(line));
            }

            if app.can_review_selected() {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("[a]", styles::help_key_style()),
                    Span::styled(" approve  ", styles::muted_style()),
                    Span::styled("[r]", styles::help_key_style()),
                    Span::styled(" reject", styles::muted_style()),
                ]));
            }
            lines
        }
        None => {
            let hint = if app.user().is_some_and(|u| u.can_request_reroute()) {
                "No requests yet. Press [n] to ask for a reroute."
            } else {
                "No requests for your mode of transport"
            };
            vec![Line::from(Span::styled(hint, styles::muted_style()))]
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(content).block(block), area);
}
