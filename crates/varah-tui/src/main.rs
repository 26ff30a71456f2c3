//! Varah TUI - a terminal client for the Varah workforce service.
//!
//! Provides a keyboard-driven interface for logging in and managing the
//! employee roster (names and NFC card assignments).

mod app;
mod ui;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use varah_core::api::ApiClient;
use varah_core::auth::Session;
use varah_core::config::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Initialize the tracing subscriber for logging.
///
/// The terminal is owned by the UI, so output goes to a log file under the
/// cache directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
/// The returned guard must stay alive for the writer to flush.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = Config::log_dir().ok()?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let appender = tracing_appender::rolling::never(log_dir, "varah.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // CLI path for creating a company account without entering the TUI
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--register" {
        return register_interactive().await;
    }

    let _log_guard = init_tracing();
    info!("Varah TUI starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app; the session starts anonymous every run
    let mut app = App::new()?;
    app.start_login();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

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

    info!("Varah TUI shutting down");
    Ok(())
}

/// Register a new company account from the command line
async fn register_interactive() -> Result<()> {
    println!("\n=== Varah Registration ===\n");

    let company = prompt("Company name: ")?;
    let email = prompt("Email: ")?;
    let password = rpassword::prompt_password("Password: ")?;

    let api = ApiClient::new(Session::new())?;

    println!("\nRegistering...");
    match api.register(&company, &email, &password).await {
        Ok(()) => {
            println!("Success! You can now run `varah` and log in.");
            Ok(())
        }
        Err(e) => {
            eprintln!("Registration failed: {}", e);
            Err(e.into())
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Apply completed background task results
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
