use ratatui::style::{Color, Modifier, Style};

use eirflow_core::models::{AqiCategory, DensityTier, NotificationStatus};

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn input_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Unread badge on the Notifications tab
pub fn badge_style() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(ERROR)
        .add_modifier(Modifier::BOLD)
}

// Severity colors, shared by the air, pedestrian, bike and notification views

pub fn aqi_style(category: AqiCategory) -> Style {
    match category {
        AqiCategory::Good => success_style(),
        AqiCategory::Moderate => highlight_style(),
        AqiCategory::High => error_style(),
    }
}

pub fn density_style(tier: DensityTier) -> Style {
    match tier {
        DensityTier::None => muted_style(),
        DensityTier::Low => success_style(),
        DensityTier::Medium => highlight_style(),
        DensityTier::High => error_style(),
    }
}

pub fn demand_style(high_demand: bool) -> Style {
    if high_demand {
        error_style()
    } else {
        list_item_style()
    }
}

pub fn notification_status_style(status: NotificationStatus) -> Style {
    match status {
        NotificationStatus::Pending => highlight_style(),
        NotificationStatus::Approved => success_style(),
        NotificationStatus::Rejected => error_style(),
    }
}
