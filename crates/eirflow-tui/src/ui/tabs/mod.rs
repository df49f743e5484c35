//! Content rendering for each tab.

pub mod air;
pub mod bikes;
pub mod bus;
pub mod events;
pub mod home;
pub mod notifications;
pub mod pedestrian;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::ViewData;
use crate::ui::styles;

/// Draw the loading / error / empty state of a view in place of its list.
/// Returns true when something was drawn and the caller should stop.
pub fn render_placeholder<T>(
    frame: &mut Frame,
    view: &ViewData<T>,
    title: &str,
    area: Rect,
) -> bool {
    let line = match view {
        ViewData::Ready(_) => return false,
        ViewData::NotLoaded => Line::from(Span::styled(
            "Press [u] to load",
            styles::muted_style(),
        )),
        ViewData::Loading => Line::from(Span::styled("Loading...", styles::highlight_style())),
        ViewData::Failed(msg) => Line::from(Span::styled(msg.clone(), styles::error_style())),
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(vec![Line::from(""), line]).block(block), area);
    true
}

/// "Label:    value" row used by the detail panels. Labels are padded to
/// line up the values.
pub fn detail_line<'a>(label: &'a str, value: impl Into<String>) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), styles::muted_style()),
        Span::raw(value.into()),
    ])
}

pub fn empty_detail(frame: &mut Frame, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let paragraph = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        styles::muted_style(),
    )))
    .block(block);
    frame.render_widget(paragraph, area);
}

pub fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.chars().count() + 1 + word.chars().count() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("Temple Bar Trad Festival returns", 16),
            vec!["Temple Bar Trad", "Festival returns"]
        );
        assert!(wrap_text("   ", 10).is_empty());
        // Words longer than the width get their own line
        assert_eq!(wrap_text("a verylongword b", 4), vec!["a", "verylongword", "b"]);
    }
}
