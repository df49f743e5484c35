//! Application state management for Eirflow.
//!
//! This module contains the core `App` struct that owns the session, the
//! per-view data, and the channels through which background loads and the
//! notification poller report back to the UI loop.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use eirflow_core::api::{describe_error, ApiClient, GeocodingClient};
use eirflow_core::auth::{CredentialStore, Session, SessionData};
use eirflow_core::cache::CacheManager;
use eirflow_core::config::{Config, ENV_PASSWORD, ENV_USERNAME};
use eirflow_core::dashboard::{
    bikes, events, pedestrian, BusData, DashboardService, LayerToggles, RouteFilter, RouteResult,
};
use eirflow_core::models::{
    AirStation, BikeStation, EventInfo, Notification, NotificationStatus, PedestrianPoint, Place,
    RerouteRequest,
};
use eirflow_core::notifications::{NotificationInbox, NotificationPoller, PollEvent};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channels.
const CHANNEL_BUFFER_SIZE: usize = 32;

const MAX_USERNAME_LENGTH: usize = 50;

const MAX_PASSWORD_LENGTH: usize = 128;

/// Place names and reroute messages.
const MAX_TEXT_LENGTH: usize = 200;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    AirQuality,
    Bus,
    Bikes,
    Events,
    Pedestrian,
    Notifications,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Home,
        Tab::AirQuality,
        Tab::Bus,
        Tab::Bikes,
        Tab::Events,
        Tab::Pedestrian,
        Tab::Notifications,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::AirQuality => "Air Quality",
            Tab::Bus => "Bus",
            Tab::Bikes => "Bike Stations",
            Tab::Events => "Events",
            Tab::Pedestrian => "Pedestrian",
            Tab::Notifications => "Notifications",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Home => Tab::AirQuality,
            Tab::AirQuality => Tab::Bus,
            Tab::Bus => Tab::Bikes,
            Tab::Bikes => Tab::Events,
            Tab::Events => Tab::Pedestrian,
            Tab::Pedestrian => Tab::Notifications,
            Tab::Notifications => Tab::Home,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Home => Tab::Notifications,
            Tab::AirQuality => Tab::Home,
            Tab::Bus => Tab::AirQuality,
            Tab::Bikes => Tab::Bus,
            Tab::Events => Tab::Bikes,
            Tab::Pedestrian => Tab::Events,
            Tab::Notifications => Tab::Pedestrian,
        }
    }

    /// Tabs shown to a user. Notifications only exist for supervisors and
    /// managers.
    pub fn visible(show_notifications: bool) -> Vec<Tab> {
        Tab::ALL
            .into_iter()
            .filter(|t| show_notifications || *t != Tab::Notifications)
            .collect()
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    EditingRoute,
    ComposingReroute,
    ShowingHelp,
    ConfirmingQuit,
    ConfirmingClearCache,
    ConfirmingLogout,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    RememberMe,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::RememberMe,
            LoginFocus::RememberMe => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::RememberMe => LoginFocus::Password,
            LoginFocus::Button => LoginFocus::RememberMe,
        }
    }
}

/// Route planner input being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteField {
    Source,
    Destination,
}

/// Reroute form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerouteFocus {
    Message,
    Location,
    Button,
}

impl RerouteFocus {
    pub fn next(&self) -> Self {
        match self {
            RerouteFocus::Message => RerouteFocus::Location,
            RerouteFocus::Location => RerouteFocus::Button,
            RerouteFocus::Button => RerouteFocus::Message,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            RerouteFocus::Message => RerouteFocus::Button,
            RerouteFocus::Location => RerouteFocus::Message,
            RerouteFocus::Button => RerouteFocus::Location,
        }
    }
}

/// Load state of one view.
#[derive(Debug, Clone, Default)]
pub enum ViewData<T> {
    #[default]
    NotLoaded,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> ViewData<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewData::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewData::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewData::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    fn from_result(result: std::result::Result<T, String>) -> Self {
        match result {
            Ok(data) => ViewData::Ready(data),
            Err(msg) => ViewData::Failed(msg),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned tasks back to the UI loop. Errors are already
/// turned into user-facing messages.
enum LoadResult {
    Bus(std::result::Result<BusData, String>),
    Bikes(std::result::Result<Vec<BikeStation>, String>),
    Events(std::result::Result<Vec<EventInfo>, String>),
    Pedestrian(std::result::Result<Vec<PedestrianPoint>, String>),
    Air(std::result::Result<Vec<AirStation>, String>),
    Route(std::result::Result<RouteResult, String>),
    /// Autocomplete answer for (field, query it was asked for)
    Suggestions(RouteField, String, Vec<Place>),
    StatusChanged(String, NotificationStatus, std::result::Result<(), String>),
    RerouteSent(std::result::Result<String, String>),
}

impl LoadResult {
    /// Dashboard view loads are the only results that can write the cache.
    fn is_view_load(&self) -> bool {
        matches!(
            self,
            LoadResult::Bus(_)
                | LoadResult::Bikes(_)
                | LoadResult::Events(_)
                | LoadResult::Pedestrian(_)
                | LoadResult::Air(_)
        )
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub dashboard: DashboardService,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub status_message: Option<String>,
    /// Newest cache write, refreshed when a view load lands
    pub last_write: Option<i64>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_remember: bool,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // View data
    pub bus: ViewData<BusData>,
    pub bikes: ViewData<Vec<BikeStation>>,
    pub events: ViewData<Vec<EventInfo>>,
    pub pedestrian: ViewData<Vec<PedestrianPoint>>,
    pub air: ViewData<Vec<AirStation>>,

    // Selection indices
    pub air_selection: usize,
    pub bus_selection: usize,
    pub bike_selection: usize,
    pub event_selection: usize,
    pub pedestrian_selection: usize,
    pub notification_selection: usize,

    // List filters
    pub bikes_high_demand_only: bool,
    pub events_upcoming_only: bool,
    pub pedestrian_high_traffic_only: bool,

    // Route planner
    pub route_source: String,
    pub route_destination: String,
    pub route_field: RouteField,
    pub suggestions: Vec<Place>,
    pub suggestion_selection: Option<usize>,
    pub route: ViewData<RouteResult>,
    pub route_layers: LayerToggles,
    pub route_filter: RouteFilter,

    // Reroute form
    pub reroute_message: String,
    pub reroute_location: String,
    pub reroute_focus: RerouteFocus,
    pub reroute_error: Option<String>,

    // Notifications
    pub inbox: NotificationInbox,
    poller: Option<NotificationPoller>,
    poll_rx: Option<mpsc::Receiver<PollEvent>>,

    // Background task channel
    load_rx: mpsc::Receiver<LoadResult>,
    load_tx: mpsc::Sender<LoadResult>,
}

impl App {
    /// Create a new application instance
    pub async fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(api = %config.api_base_url, "Config loaded");

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let mut session = Session::new(cache_dir.clone());
        if let Err(e) = session.load() {
            warn!(error = %e, "Ignoring unreadable session file");
        }

        let api = ApiClient::new(&config.api_base_url)?
            .with_token(session.token().map(str::to_string));
        let geocoder = GeocodingClient::new(&config.geocoder_base_url)?;
        let dashboard = DashboardService::new(api, geocoder, CacheManager::new(&cache_dir));
        let last_write = dashboard.cache().last_write();

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = std::env::var(ENV_USERNAME)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();

        let login_password = std::env::var(ENV_PASSWORD)
            .ok()
            .or_else(|| {
                if config.remember_me && !login_username.is_empty() {
                    CredentialStore::get_password(&login_username).ok()
                } else {
                    None
                }
            })
            .unwrap_or_default();

        let login_remember = config.remember_me;

        Ok(Self {
            config,
            session,
            dashboard,

            state: AppState::Normal,
            current_tab: Tab::Home,
            status_message: None,
            last_write,

            login_username,
            login_password,
            login_remember,
            login_focus: LoginFocus::Username,
            login_error: None,

            bus: ViewData::NotLoaded,
            bikes: ViewData::NotLoaded,
            events: ViewData::NotLoaded,
            pedestrian: ViewData::NotLoaded,
            air: ViewData::NotLoaded,

            air_selection: 0,
            bus_selection: 0,
            bike_selection: 0,
            event_selection: 0,
            pedestrian_selection: 0,
            notification_selection: 0,

            bikes_high_demand_only: false,
            events_upcoming_only: false,
            pedestrian_high_traffic_only: false,

            route_source: String::new(),
            route_destination: String::new(),
            route_field: RouteField::Source,
            suggestions: Vec::new(),
            suggestion_selection: None,
            route: ViewData::NotLoaded,
            route_layers: LayerToggles::default(),
            route_filter: RouteFilter::default(),

            reroute_message: String::new(),
            reroute_location: String::new(),
            reroute_focus: RerouteFocus::Message,
            reroute_error: None,

            inbox: NotificationInbox::new(),
            poller: None,
            poll_rx: None,

            load_rx: rx,
            load_tx: tx,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn user(&self) -> Option<&SessionData> {
        self.session.user()
    }

    pub fn visible_tabs(&self) -> Vec<Tab> {
        Tab::visible(self.user().is_some_and(|u| u.sees_notifications()))
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow!("Username and password required"));
        }

        self.login_error = None;

        match self.dashboard.api().authenticate(&username, &password).await {
            Ok(response) => {
                let session_data = SessionData::from_login(&username, response);

                let stored = if self.login_remember {
                    CredentialStore::store(&username, &password)
                } else {
                    CredentialStore::delete(&username)
                };
                if let Err(e) = stored {
                    warn!(error = %e, "Failed to update stored credentials");
                }

                self.config.last_username = Some(username);
                self.config.remember_me = self.login_remember;
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.dashboard = self.dashboard.with_token(session_data.token.clone());
                info!(user = %session_data.display(), "Login successful");
                self.session.update(session_data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                self.start_poller();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(describe_error(&e));
                Err(e)
            }
        }
    }

    /// Forget the session, stop polling and go back to the login form.
    pub fn logout(&mut self) {
        self.stop_poller();
        self.inbox.clear();
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to remove session file");
        }
        self.dashboard = self.dashboard.with_token(None);
        self.current_tab = Tab::Home;
        self.status_message = Some("Logged out".to_string());
        info!("Logged out");
        self.start_login();
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Start polling for the logged-in user. Plain users have nothing to poll.
    pub fn start_poller(&mut self) {
        self.stop_poller();
        let Some(query) = self.user().and_then(|u| u.notification_query()) else {
            return;
        };
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let period = self.config.poll_interval();
        info!(?period, "Starting notification poller");
        self.poller = Some(NotificationPoller::spawn(
            self.dashboard.api().clone(),
            query,
            period,
            tx,
        ));
        self.poll_rx = Some(rx);
    }

    fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
        self.poll_rx = None;
    }

    pub fn selected_notification(&self) -> Option<&Notification> {
        self.inbox.items().get(self.notification_selection)
    }

    pub fn can_review_selected(&self) -> bool {
        match (self.user(), self.selected_notification()) {
            (Some(user), Some(n)) => {
                user.can_review(n.mode_of_transport) && n.status == NotificationStatus::Pending
            }
            _ => false,
        }
    }

    /// Approve or reject the selected request. The list is patched right
    /// away; the next poll brings the backend's view.
    pub fn decide_selected(&mut self, status: NotificationStatus) {
        let Some(id) = self.selected_notification().map(|n| n.id.clone()) else {
            return;
        };
        let Some(user) = self.session.user() else {
            return;
        };
        if let Err(e) = self.inbox.apply_status(user, &id, status) {
            self.status_message = Some(e.to_string());
            return;
        }

        let api = self.dashboard.api().clone();
        let tx = self.load_tx.clone();
        self.status_message = Some(format!("Marking request as {}...", status));
        tokio::spawn(async move {
            let result = api.update_notification_status(&id, status).await;
            let result = Self::outcome("Status update", result);
            Self::send_result(&tx, LoadResult::StatusChanged(id, status, result)).await;
        });
    }

    pub fn start_reroute(&mut self) {
        if !self.user().is_some_and(|u| u.can_request_reroute()) {
            self.status_message = Some("Only managers can request a reroute".to_string());
            return;
        }
        self.reroute_message.clear();
        self.reroute_location.clear();
        self.reroute_focus = RerouteFocus::Message;
        self.reroute_error = None;
        self.state = AppState::ComposingReroute;
    }

    /// Send the reroute form. The form stays open on validation errors.
    pub fn submit_reroute(&mut self) {
        let Some(user) = self.session.user() else {
            return;
        };
        let Some(mode) = user.mode.filter(|_| user.can_request_reroute()) else {
            self.reroute_error = Some("Only managers can request a reroute".to_string());
            return;
        };
        let message = self.reroute_message.trim().to_string();
        if message.is_empty() {
            self.reroute_error = Some("Message is required".to_string());
            return;
        }
        let location = self.reroute_location.trim();
        let request = RerouteRequest {
            mode_of_transport: mode,
            manager_name: user.username.clone(),
            message,
            location: (!location.is_empty()).then(|| location.to_string()),
        };

        let api = self.dashboard.api().clone();
        let tx = self.load_tx.clone();
        tokio::spawn(async move {
            let result = api.submit_reroute_request(&request).await;
            Self::send_result(&tx, LoadResult::RerouteSent(Self::outcome("Reroute", result)))
                .await;
        });

        self.state = AppState::Normal;
        self.status_message = Some("Sending reroute request...".to_string());
    }

    // =========================================================================
    // Background Data Loading
    // =========================================================================

    /// Load every dashboard view. Each view is served from the cache when
    /// fresh.
    pub fn load_all_background(&mut self) {
        info!("Loading all dashboard views");
        self.bus = ViewData::Loading;
        self.bikes = ViewData::Loading;
        self.events = ViewData::Loading;
        self.pedestrian = ViewData::Loading;
        self.air = ViewData::Loading;

        let service = self.dashboard.clone();
        let tx = self.load_tx.clone();
        tokio::spawn(async move {
            let (bus, bikes, events, pedestrian, air) = tokio::join!(
                service.load_bus(),
                service.load_bikes(),
                service.load_events(),
                service.load_pedestrian(),
                service.load_air(),
            );
            Self::send_result(&tx, LoadResult::Bus(Self::outcome("Bus", bus))).await;
            Self::send_result(&tx, LoadResult::Bikes(Self::outcome("Bikes", bikes))).await;
            Self::send_result(&tx, LoadResult::Events(Self::outcome("Events", events))).await;
            Self::send_result(
                &tx,
                LoadResult::Pedestrian(Self::outcome("Pedestrian", pedestrian)),
            )
            .await;
            Self::send_result(&tx, LoadResult::Air(Self::outcome("Air quality", air))).await;
        });
    }

    /// Reload only the view on the current tab.
    pub fn reload_current_tab(&mut self) {
        let service = self.dashboard.clone();
        let tx = self.load_tx.clone();
        match self.current_tab {
            Tab::AirQuality => {
                self.air = ViewData::Loading;
                tokio::spawn(async move {
                    let result = Self::outcome("Air quality", service.load_air().await);
                    Self::send_result(&tx, LoadResult::Air(result)).await;
                });
            }
            Tab::Bus => {
                self.bus = ViewData::Loading;
                tokio::spawn(async move {
                    let result = Self::outcome("Bus", service.load_bus().await);
                    Self::send_result(&tx, LoadResult::Bus(result)).await;
                });
            }
            Tab::Bikes => {
                self.bikes = ViewData::Loading;
                tokio::spawn(async move {
                    let result = Self::outcome("Bikes", service.load_bikes().await);
                    Self::send_result(&tx, LoadResult::Bikes(result)).await;
                });
            }
            Tab::Events => {
                self.events = ViewData::Loading;
                tokio::spawn(async move {
                    let result = Self::outcome("Events", service.load_events().await);
                    Self::send_result(&tx, LoadResult::Events(result)).await;
                });
            }
            Tab::Pedestrian => {
                self.pedestrian = ViewData::Loading;
                tokio::spawn(async move {
                    let result = Self::outcome("Pedestrian", service.load_pedestrian().await);
                    Self::send_result(&tx, LoadResult::Pedestrian(result)).await;
                });
            }
            Tab::Notifications => self.start_poller(),
            Tab::Home => {}
        }
    }

    /// Drop the cached responses and fetch everything again.
    pub fn clear_cache_and_reload(&mut self) {
        let removed = self.dashboard.clear_cache();
        self.last_write = None;
        self.status_message = Some(format!("Cleared {} cached responses", removed));
        self.load_all_background();
    }

    // =========================================================================
    // Route Planner
    // =========================================================================

    pub fn route_input(&self) -> &str {
        match self.route_field {
            RouteField::Source => &self.route_source,
            RouteField::Destination => &self.route_destination,
        }
    }

    pub fn route_input_mut(&mut self) -> &mut String {
        match self.route_field {
            RouteField::Source => &mut self.route_source,
            RouteField::Destination => &mut self.route_destination,
        }
    }

    /// Ask for autocomplete entries for the field being edited. Short
    /// queries clear the list without a request.
    pub fn request_suggestions(&mut self) {
        let query = self.route_input().to_string();
        self.suggestion_selection = None;
        if !eirflow_core::api::geocoding::wants_suggestions(&query) {
            self.suggestions.clear();
            return;
        }

        let service = self.dashboard.clone();
        let tx = self.load_tx.clone();
        let field = self.route_field;
        tokio::spawn(async move {
            match service.suggestions(&query).await {
                Ok(places) => {
                    Self::send_result(&tx, LoadResult::Suggestions(field, query, places)).await;
                }
                // Autocomplete is best effort
                Err(e) => debug!(error = %e, "Suggestion lookup failed"),
            }
        });
    }

    /// Copy the highlighted suggestion into the field being edited.
    pub fn accept_suggestion(&mut self) -> bool {
        let Some(place) = self
            .suggestion_selection
            .and_then(|i| self.suggestions.get(i))
            .cloned()
        else {
            return false;
        };
        *self.route_input_mut() = place.display_name;
        self.suggestions.clear();
        self.suggestion_selection = None;
        true
    }

    pub fn plan_route_background(&mut self) {
        let source = self.route_source.trim().to_string();
        let destination = self.route_destination.trim().to_string();
        if source.is_empty() || destination.is_empty() {
            self.route = ViewData::Failed("Enter both a start and a destination".to_string());
            return;
        }

        self.suggestions.clear();
        self.suggestion_selection = None;
        self.route = ViewData::Loading;

        let service = self.dashboard.clone();
        let tx = self.load_tx.clone();
        tokio::spawn(async move {
            let result = service.plan_route(&source, &destination).await;
            Self::send_result(&tx, LoadResult::Route(Self::outcome("Route", result))).await;
        });
    }

    // =========================================================================
    // Result Processing
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<LoadResult>, result: LoadResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send load result - channel closed");
        }
    }

    /// Log a failed load and turn it into a message for the view.
    fn outcome<T>(name: &str, result: Result<T>) -> std::result::Result<T, String> {
        result.map_err(|e| {
            error!(error = %e, "{} load failed", name);
            describe_error(&e)
        })
    }

    /// Drain finished loads and poll results
    pub async fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.load_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_load_result(result);
        }

        let mut polls = Vec::new();
        if let Some(ref mut rx) = self.poll_rx {
            while let Ok(event) = rx.try_recv() {
                polls.push(event);
            }
        }
        for event in polls {
            self.process_poll_event(event);
        }
    }

    fn process_load_result(&mut self, result: LoadResult) {
        let view_load = result.is_view_load();
        match result {
            LoadResult::Bus(r) => {
                self.bus = ViewData::from_result(r);
                self.bus_selection = 0;
            }
            LoadResult::Bikes(r) => {
                self.bikes = ViewData::from_result(r);
                self.bike_selection = 0;
            }
            LoadResult::Events(r) => {
                self.events = ViewData::from_result(r);
                self.event_selection = 0;
            }
            LoadResult::Pedestrian(r) => {
                self.pedestrian = ViewData::from_result(r);
                self.pedestrian_selection = 0;
            }
            LoadResult::Air(r) => {
                self.air = ViewData::from_result(r);
                self.air_selection = 0;
            }
            LoadResult::Route(r) => {
                self.route = ViewData::from_result(r);
            }
            LoadResult::Suggestions(field, query, places) => {
                // Drop answers for text the user has since changed
                if self.state == AppState::EditingRoute
                    && field == self.route_field
                    && query == self.route_input()
                {
                    self.suggestions = places;
                    self.suggestion_selection = None;
                }
            }
            LoadResult::StatusChanged(id, status, r) => {
                self.status_message = Some(match r {
                    Ok(()) => format!("Request {} {}", id, status),
                    Err(msg) => format!("Error: {}", msg),
                });
            }
            LoadResult::RerouteSent(r) => {
                self.status_message = Some(match r {
                    Ok(msg) => msg,
                    Err(msg) => format!("Error: {}", msg),
                });
            }
        }

        if view_load {
            self.last_write = self.dashboard.cache().last_write();
        }
    }

    fn process_poll_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::Updated(items) => {
                let Some(user) = self.session.user() else {
                    return;
                };
                let new = self.inbox.apply_poll(user, items);
                // The open tab counts as read
                if self.current_tab == Tab::Notifications {
                    self.inbox.mark_all_read();
                } else if new > 0 {
                    self.status_message = Some(format!("{} new notification(s)", new));
                }
                let max = self.inbox.items().len().saturating_sub(1);
                self.notification_selection = self.notification_selection.min(max);
            }
            PollEvent::Failed(msg) => {
                self.status_message = Some(format!("Notifications: {}", msg));
            }
        }
    }

    // =========================================================================
    // Navigation and Filtered Views
    // =========================================================================

    pub fn select_tab(&mut self, tab: Tab) {
        if !self.visible_tabs().contains(&tab) {
            return;
        }
        self.current_tab = tab;
        if tab == Tab::Notifications {
            self.inbox.mark_all_read();
        }
    }

    pub fn next_tab(&mut self) {
        let mut tab = self.current_tab.next();
        while !self.visible_tabs().contains(&tab) {
            tab = tab.next();
        }
        self.select_tab(tab);
    }

    pub fn prev_tab(&mut self) {
        let mut tab = self.current_tab.prev();
        while !self.visible_tabs().contains(&tab) {
            tab = tab.prev();
        }
        self.select_tab(tab);
    }

    pub fn visible_bikes(&self) -> Vec<&BikeStation> {
        match self.bikes.ready() {
            Some(stations) if self.bikes_high_demand_only => bikes::high_demand(stations),
            Some(stations) => stations.iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn visible_events(&self) -> Vec<&EventInfo> {
        match self.events.ready() {
            Some(list) if self.events_upcoming_only => events::upcoming(list, Utc::now()),
            Some(list) => list.iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn visible_pedestrian(&self) -> Vec<&PedestrianPoint> {
        match self.pedestrian.ready() {
            Some(points) if self.pedestrian_high_traffic_only => pedestrian::high_traffic(points),
            Some(points) => points.iter().collect(),
            None => Vec::new(),
        }
    }

    /// Number of rows in the current tab's list.
    pub fn current_list_len(&self) -> usize {
        match self.current_tab {
            Tab::Home => 0,
            Tab::AirQuality => self.air.ready().map_or(0, Vec::len),
            Tab::Bus => self.bus.ready().map_or(0, |b| b.zones.len()),
            Tab::Bikes => self.visible_bikes().len(),
            Tab::Events => self.visible_events().len(),
            Tab::Pedestrian => self.visible_pedestrian().len(),
            Tab::Notifications => self.inbox.items().len(),
        }
    }

    pub fn current_selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Home => None,
            Tab::AirQuality => Some(&mut self.air_selection),
            Tab::Bus => Some(&mut self.bus_selection),
            Tab::Bikes => Some(&mut self.bike_selection),
            Tab::Events => Some(&mut self.event_selection),
            Tab::Pedestrian => Some(&mut self.pedestrian_selection),
            Tab::Notifications => Some(&mut self.notification_selection),
        }
    }

    // =========================================================================
    // Interactive CLI prompts
    // =========================================================================

    pub fn prompt_line(label: &str) -> Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    pub fn prompt_password(label: &str) -> Result<String> {
        let password = rpassword::prompt_password(format!("{}: ", label))?;
        Ok(password)
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Place names and free-text messages
pub fn can_add_text_char(current_len: usize, c: char) -> bool {
    current_len < MAX_TEXT_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Home.next(), Tab::AirQuality);
        assert_eq!(Tab::AirQuality.next(), Tab::Bus);
        assert_eq!(Tab::Bus.next(), Tab::Bikes);
        assert_eq!(Tab::Bikes.next(), Tab::Events);
        assert_eq!(Tab::Events.next(), Tab::Pedestrian);
        assert_eq!(Tab::Pedestrian.next(), Tab::Notifications);
        assert_eq!(Tab::Notifications.next(), Tab::Home); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Home.prev(), Tab::Notifications); // Wraps around
        assert_eq!(Tab::Notifications.prev(), Tab::Pedestrian);
        assert_eq!(Tab::AirQuality.prev(), Tab::Home);
    }

    #[test]
    fn test_next_prev_agree_with_all() {
        for (i, tab) in Tab::ALL.iter().enumerate() {
            assert_eq!(tab.next(), Tab::ALL[(i + 1) % Tab::ALL.len()]);
            assert_eq!(tab.next().prev(), *tab);
        }
    }

    #[test]
    fn test_visible_tabs() {
        assert_eq!(Tab::visible(true).len(), 7);
        let plain = Tab::visible(false);
        assert_eq!(plain.len(), 6);
        assert!(!plain.contains(&Tab::Notifications));
        assert_eq!(plain[0], Tab::Home);
    }

    #[test]
    fn test_login_focus_cycle() {
        let mut focus = LoginFocus::Username;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, LoginFocus::Username);
        assert_eq!(LoginFocus::Username.prev(), LoginFocus::Button);
        assert_eq!(RerouteFocus::Message.prev(), RerouteFocus::Button);
        assert_eq!(RerouteFocus::Location.next(), RerouteFocus::Button);
    }

    // -------------------------------------------------------------------------
    // ViewData Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_view_data_states() {
        let loading: ViewData<Vec<u32>> = ViewData::Loading;
        assert!(loading.is_loading());
        assert!(loading.ready().is_none());

        let ready = ViewData::from_result(Ok(vec![1, 2]));
        assert_eq!(ready.ready(), Some(&vec![1, 2]));
        assert!(ready.error().is_none());

        let failed: ViewData<Vec<u32>> = ViewData::from_result(Err("No bike data found.".into()));
        assert_eq!(failed.error(), Some("No bike data found."));
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_only_view_loads_refresh_last_write() {
        assert!(LoadResult::Air(Ok(Vec::new())).is_view_load());
        assert!(LoadResult::Bikes(Err("offline".to_string())).is_view_load());
        assert!(!LoadResult::Suggestions(RouteField::Source, "dub".to_string(), Vec::new())
            .is_view_load());
        assert!(!LoadResult::RerouteSent(Ok("sent".to_string())).is_view_load());
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
        assert!(!can_add_username_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_text_char() {
        assert!(can_add_text_char(0, ' '));
        assert!(can_add_text_char(199, 'é'));
        assert!(!can_add_text_char(200, 'a'));
        assert!(!can_add_text_char(0, '\x1b'));
    }
}
