//! Eirflow - a terminal dashboard for city mobility data.
//!
//! Shows bus congestion, bike station demand, pedestrian density, air
//! quality and events from the mobility backend, plans routes between two
//! places, and lets supervisors and managers exchange reroute requests.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eirflow_core::api::{describe_error, ApiClient};
use eirflow_core::cache::CacheManager;
use eirflow_core::config::Config;
use eirflow_core::models::{Registration, Role, TransportMode};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "eirflow.log";

/// Initialize the tracing subscriber.
///
/// The terminal belongs to the UI, so logs go to a daily file under the
/// cache directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: PathBuf) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().unwrap_or_default();
    let log_dir = config.log_dir().unwrap_or_else(|_| PathBuf::from("./cache/logs"));
    let _log_guard = init_tracing(log_dir);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--register" {
        return register_interactive(&config).await;
    }
    if args.len() > 1 && args[1] == "--clear-cache" {
        return clear_cache(&config);
    }

    info!("Eirflow starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match App::new().await {
        Ok(mut app) => {
            if app.is_authenticated() {
                app.start_poller();
                app.load_all_background();
            } else {
                app.start_login();
            }
            run_app(&mut terminal, &mut app).await
        }
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Eirflow shutting down");
    Ok(())
}

/// Create an account from terminal prompts.
async fn register_interactive(config: &Config) -> Result<()> {
    println!("\n=== Eirflow Registration ===\n");

    let role_names: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
    let mode_names: Vec<&str> = TransportMode::ALL.iter().map(|m| m.as_str()).collect();

    let supervisor_name = App::prompt_line("Supervisor name")?;
    let username = App::prompt_line("Username")?;
    let password = App::prompt_password("Password")?;
    let role = loop {
        let input = App::prompt_line(&format!("Role ({})", role_names.join("/")))?;
        match Role::parse(&input) {
            Some(role) => break role,
            None => println!("Unknown role: {}", input),
        }
    };
    let mode = loop {
        let input = App::prompt_line(&format!("Mode of transport ({})", mode_names.join("/")))?;
        match TransportMode::parse(&input) {
            Some(mode) => break mode,
            None => println!("Unknown mode: {}", input),
        }
    };
    let security_question = App::prompt_line("Security question")?;
    let security_answer = App::prompt_line("Security answer")?;

    let registration = Registration {
        supervisor_name,
        username,
        password,
        role,
        mode,
        security_question,
        security_answer,
    };

    if let Some(field) = registration.missing_field() {
        println!("\n{} is required.", field);
        return Ok(());
    }

    println!("\nRegistering...");
    let api = ApiClient::new(&config.api_base_url)?;
    match api.register(&registration).await {
        Ok(message) => {
            info!(username = %registration.username, "Registered");
            println!("{}", message);
        }
        Err(e) => println!("Registration failed: {}", describe_error(&e)),
    }
    Ok(())
}

fn clear_cache(config: &Config) -> Result<()> {
    let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
    let removed = CacheManager::new(&cache_dir).clear();
    println!("Removed {} cached responses from {}", removed, cache_dir.display());
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks().await;

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
