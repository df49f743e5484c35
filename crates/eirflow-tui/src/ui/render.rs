use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use eirflow_core::cache::{now_millis, updated_label};

use crate::app::{App, AppState, LoginFocus, RerouteFocus, Tab};

use super::styles;
use super::tabs::{air, bikes, bus, events, home, notifications, pedestrian};

const LOGO: [&str; 3] = [
    "      ╔═╗╦╦═╗╔═╗╦  ╔═╗╦ ╦",
    "      ║╣ ║╠╦╝╠╣ ║  ║ ║║║║",
    "      ╚═╝╩╩╚═╚  ╩═╝╚═╝╚╩╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ComposingReroute => render_reroute_overlay(frame, app),
        AppState::ConfirmingQuit => render_confirm_overlay(
            frame,
            "Are you sure you want to quit?",
            " to quit, ",
        ),
        AppState::ConfirmingClearCache => render_confirm_overlay(
            frame,
            "Clear cached data and reload?",
            " to clear, ",
        ),
        AppState::ConfirmingLogout => render_confirm_overlay(
            frame,
            "Log out of this account?",
            " to log out, ",
        ),
        AppState::Normal | AppState::EditingRoute | AppState::Quitting => {}
    }
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect()
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Eirflow";
    let user = app
        .user()
        .map(|u| format!("{}  ", u.display()))
        .unwrap_or_default();
    let help_hint = "[?] Help";

    let used = title.len() + user.chars().count() + help_hint.len() + 4;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(user, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in app.visible_tabs().into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
        if tab == Tab::Notifications && app.inbox.has_unread() {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!(" {} ", app.inbox.unread_count()),
                styles::badge_style(),
            ));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Home => home::render(frame, app, area),
        Tab::AirQuality => air::render(frame, app, area),
        Tab::Bus => bus::render(frame, app, area),
        Tab::Bikes => bikes::render(frame, app, area),
        Tab::Events => events::render(frame, app, area),
        Tab::Pedestrian => pedestrian::render(frame, app, area),
        Tab::Notifications => notifications::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [c]lear cache | [L]ogout | [q]uit";

    let left_text = status_text(app.status_message.as_deref(), app.last_write, now_millis());
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let left_style = if left_text.trim_start().starts_with("Error") {
        styles::error_style()
    } else {
        styles::muted_style()
    };

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(56, 30, frame.area());
    frame.render_widget(Clear, area);

    let mut help_text = logo_lines();
    help_text.push(Line::from(Span::styled(
        format!("              version {}", env!("CARGO_PKG_VERSION")),
        styles::muted_style(),
    )));
    help_text.extend([
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-7", "Switch tabs"),
        help_line("←/→", "Previous/next tab"),
        help_line("↑/↓ j/k", "Navigate list"),
        help_line("PgUp/PgDn", "Scroll a page"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("u", "Reload this tab"),
        help_line("c", "Clear cache and reload"),
        help_line("h / w", "High demand, busy streets / this week"),
        help_line("L", "Log out"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Home", styles::highlight_style())),
        help_line("e", "Edit start and destination"),
        help_line("Enter", "Search routes"),
        help_line("f", "Cycle route filter"),
        help_line("a/h/v/b/p", "Toggle AQI/heatmap/events/bikes/people"),
        Line::from(""),
        Line::from(Span::styled(" Notifications", styles::highlight_style())),
        help_line("a / r", "Approve / reject (supervisors)"),
        help_line("n", "New reroute request (managers)"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// `label: [value▌]` with the focused field highlighted.
fn form_field<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("      "),
        Span::styled(label, styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(format!("{:<16}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("            ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(50, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    lines.push(form_field(
        "Username: ",
        app.login_username.clone(),
        app.login_focus == LoginFocus::Username,
    ));
    lines.push(form_field(
        "Password: ",
        "*".repeat(app.login_password.chars().count().min(16)),
        app.login_focus == LoginFocus::Password,
    ));

    let remember_focused = app.login_focus == LoginFocus::RememberMe;
    let checkbox = if app.login_remember { "[x]" } else { "[ ]" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled(
            format!("{} Remember me", checkbox),
            if remember_focused {
                styles::selected_style()
            } else {
                styles::muted_style()
            },
        ),
    ]));

    lines.push(Line::from(""));
    lines.push(button_line("Login", app.login_focus == LoginFocus::Button));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_reroute_overlay(frame: &mut Frame, app: &App) {
    let height = if app.reroute_error.is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(60, height, frame.area());
    frame.render_widget(Clear, area);

    let mode = app
        .user()
        .and_then(|u| u.mode)
        .map(|m| m.as_str())
        .unwrap_or("-");

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" Reroute request ({})", mode),
            styles::title_style(),
        )),
        Line::from(""),
        form_field(
            "Message:  ",
            app.reroute_message.clone(),
            app.reroute_focus == RerouteFocus::Message,
        ),
        form_field(
            "Location: ",
            app.reroute_location.clone(),
            app.reroute_focus == RerouteFocus::Location,
        ),
        Line::from(""),
        button_line("Send", app.reroute_focus == RerouteFocus::Button),
        Line::from(Span::styled("  [Esc] cancel", styles::muted_style())),
    ];

    if let Some(ref error) = app.reroute_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// Yes/no dialog shared by quit, clear cache and logout.
fn render_confirm_overlay(frame: &mut Frame, question: &str, yes_action: &str) {
    let area = centered_rect_fixed(46, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            format!("   {}", question),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(yes_action.to_string(), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Left side of the status bar. Uses the stored write time, so drawing a
/// frame never touches the cache directory.
fn status_text(message: Option<&str>, last_write: Option<i64>, now_ms: i64) -> String {
    match message {
        Some(msg) => format!(" {} ", msg),
        None => format!(" Updated {} ", updated_label(last_write, now_ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(None, None, 0), " Updated never ");
        assert_eq!(status_text(None, Some(0), 4 * 60_000), " Updated 4m ago ");
        assert_eq!(
            status_text(Some("Cleared 3 cached responses"), Some(0), 0),
            " Cleared 3 cached responses "
        );
    }

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect_fixed(46, 10, outer);
        assert_eq!(inner, Rect::new(27, 15, 46, 10));

        // Clamped to the available area
        let small = Rect::new(0, 0, 30, 5);
        assert_eq!(centered_rect_fixed(46, 10, small), Rect::new(0, 0, 30, 5));
    }
}
