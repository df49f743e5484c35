//! Keyboard input handling for the TUI.
//!
//! Overlays (login, help, confirmations, forms) take every key while they
//! are open; otherwise global keys are handled first and the rest go to the
//! current tab.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use eirflow_core::dashboard::Layer;
use eirflow_core::models::NotificationStatus;

use crate::app::{
    can_add_password_char, can_add_text_char, can_add_username_char, App, AppState, LoginFocus,
    RerouteFocus, RouteField, Tab, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::EditingRoute => {
            handle_route_editor_input(app, key);
            return Ok(false);
        }
        AppState::ComposingReroute => {
            handle_reroute_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit | AppState::ConfirmingClearCache | AppState::ConfirmingLogout => {
            return Ok(handle_confirmation(app, key));
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if let Some(tab) = app.visible_tabs().get(index).copied() {
                app.select_tab(tab);
            }
        }
        KeyCode::Left => app.prev_tab(),
        KeyCode::Right => app.next_tab(),
        KeyCode::Char('u') => app.reload_current_tab(),
        KeyCode::Char('c') => {
            app.state = AppState::ConfirmingClearCache;
        }
        KeyCode::Char('L') => {
            app.state = AppState::ConfirmingLogout;
        }
        KeyCode::Esc => {
            app.status_message = None;
        }
        _ => match app.current_tab {
            Tab::Home => handle_home_input(app, key),
            Tab::Notifications => handle_notifications_input(app, key),
            _ => handle_list_input(app, key),
        },
    }

    Ok(false)
}

/// Y/N dialogs. Returns true when the app should quit.
fn handle_confirmation(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            match app.state {
                AppState::ConfirmingQuit => {
                    app.state = AppState::Quitting;
                    return true;
                }
                AppState::ConfirmingClearCache => {
                    app.state = AppState::Normal;
                    app.clear_cache_and_reload();
                }
                AppState::ConfirmingLogout => app.logout(),
                _ => {}
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        _ => {}
    }
    false
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password => app.login_focus = LoginFocus::Button,
            LoginFocus::RememberMe => app.login_remember = !app.login_remember,
            LoginFocus::Button => {
                // On failure login_error is set and the form stays open
                if app.attempt_login().await.is_ok() {
                    app.load_all_background();
                }
            }
        },
        KeyCode::Char(' ') if app.login_focus == LoginFocus::RememberMe => {
            app.login_remember = !app.login_remember;
        }
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::RememberMe | LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::RememberMe | LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

/// Move a list selection, clamped to `len`.
fn move_selection(selection: &mut usize, len: usize, key: KeyCode) {
    let max_index = len.saturating_sub(1);
    match key {
        KeyCode::Char('j') | KeyCode::Down => {
            *selection = (*selection + 1).min(max_index);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            *selection = selection.saturating_sub(1);
        }
        KeyCode::Home => {
            *selection = 0;
        }
        KeyCode::End => {
            *selection = max_index;
        }
        KeyCode::PageDown => {
            *selection = (*selection + PAGE_SCROLL_SIZE).min(max_index);
        }
        KeyCode::PageUp => {
            *selection = selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        _ => {}
    }
}

/// Air, bus, bikes, events and pedestrian tabs.
fn handle_list_input(app: &mut App, key: KeyEvent) {
    match (app.current_tab, key.code) {
        (Tab::Bikes, KeyCode::Char('h')) => {
            app.bikes_high_demand_only = !app.bikes_high_demand_only;
            app.bike_selection = 0;
        }
        (Tab::Pedestrian, KeyCode::Char('h')) => {
            app.pedestrian_high_traffic_only = !app.pedestrian_high_traffic_only;
            app.pedestrian_selection = 0;
        }
        (Tab::Events, KeyCode::Char('w')) => {
            app.events_upcoming_only = !app.events_upcoming_only;
            app.event_selection = 0;
        }
        (_, code) => {
            let len = app.current_list_len();
            if let Some(selection) = app.current_selection_mut() {
                move_selection(selection, len, code);
            }
        }
    }
}

fn handle_notifications_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') => app.decide_selected(NotificationStatus::Approved),
        KeyCode::Char('r') => app.decide_selected(NotificationStatus::Rejected),
        KeyCode::Char('n') => app.start_reroute(),
        code => {
            let len = app.inbox.items().len();
            move_selection(&mut app.notification_selection, len, code);
        }
    }
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    let layer = match key.code {
        KeyCode::Char('a') => Some(Layer::Aqi),
        KeyCode::Char('h') => Some(Layer::Heatmap),
        KeyCode::Char('v') => Some(Layer::Events),
        KeyCode::Char('b') => Some(Layer::BikeStands),
        KeyCode::Char('p') => Some(Layer::Pedestrian),
        _ => None,
    };
    if let Some(layer) = layer {
        app.route_layers.toggle(layer);
        return;
    }

    match key.code {
        KeyCode::Char('e') | KeyCode::Char('/') => {
            app.route_field = RouteField::Source;
            app.state = AppState::EditingRoute;
        }
        KeyCode::Char('f') => {
            app.route_filter = app.route_filter.next();
        }
        KeyCode::Enter => app.plan_route_background(),
        _ => {}
    }
}

fn handle_route_editor_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.suggestions.clear();
            app.suggestion_selection = None;
            app.state = AppState::Normal;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.route_field = match app.route_field {
                RouteField::Source => RouteField::Destination,
                RouteField::Destination => RouteField::Source,
            };
            app.suggestions.clear();
            app.suggestion_selection = None;
        }
        KeyCode::Down => {
            if !app.suggestions.is_empty() {
                let max_index = app.suggestions.len() - 1;
                app.suggestion_selection =
                    Some(app.suggestion_selection.map_or(0, |i| (i + 1).min(max_index)));
            }
        }
        KeyCode::Up => {
            app.suggestion_selection = match app.suggestion_selection {
                Some(0) | None => None,
                Some(i) => Some(i - 1),
            };
        }
        KeyCode::Enter => {
            if app.accept_suggestion() {
                if app.route_field == RouteField::Source {
                    app.route_field = RouteField::Destination;
                }
            } else if app.route_field == RouteField::Source
                && app.route_destination.trim().is_empty()
            {
                app.route_field = RouteField::Destination;
            } else {
                app.state = AppState::Normal;
                app.plan_route_background();
            }
        }
        KeyCode::Backspace => {
            app.route_input_mut().pop();
            app.request_suggestions();
        }
        KeyCode::Char(c) => {
            if can_add_text_char(app.route_input().chars().count(), c) {
                app.route_input_mut().push(c);
                app.request_suggestions();
            }
        }
        _ => {}
    }
}

fn handle_reroute_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.reroute_focus = app.reroute_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.reroute_focus = app.reroute_focus.prev();
        }
        KeyCode::Enter => match app.reroute_focus {
            RerouteFocus::Message => app.reroute_focus = RerouteFocus::Location,
            RerouteFocus::Location => app.reroute_focus = RerouteFocus::Button,
            RerouteFocus::Button => app.submit_reroute(),
        },
        KeyCode::Backspace => match app.reroute_focus {
            RerouteFocus::Message => {
                app.reroute_message.pop();
            }
            RerouteFocus::Location => {
                app.reroute_location.pop();
            }
            RerouteFocus::Button => {}
        },
        KeyCode::Char(c) => match app.reroute_focus {
            RerouteFocus::Message => {
                if can_add_text_char(app.reroute_message.chars().count(), c) {
                    app.reroute_message.push(c);
                }
            }
            RerouteFocus::Location => {
                if can_add_text_char(app.reroute_location.chars().count(), c) {
                    app.reroute_location.push(c);
                }
            }
            RerouteFocus::Button => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_selection_clamps() {
        let mut sel = 0;
        move_selection(&mut sel, 3, KeyCode::Down);
        move_selection(&mut sel, 3, KeyCode::Char('j'));
        move_selection(&mut sel, 3, KeyCode::Down);
        assert_eq!(sel, 2);

        move_selection(&mut sel, 3, KeyCode::PageUp);
        assert_eq!(sel, 0);
        move_selection(&mut sel, 3, KeyCode::Up);
        assert_eq!(sel, 0);

        move_selection(&mut sel, 25, KeyCode::PageDown);
        assert_eq!(sel, PAGE_SCROLL_SIZE);
        move_selection(&mut sel, 25, KeyCode::End);
        assert_eq!(sel, 24);
    }

    #[test]
    fn test_move_selection_empty_list() {
        let mut sel = 0;
        move_selection(&mut sel, 0, KeyCode::Down);
        assert_eq!(sel, 0);
    }
}
