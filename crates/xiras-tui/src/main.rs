//! xiras - a terminal client for the xIRAS student records API.
//!
//! Log in with your student ID and the encrypted IRAS password captured by
//! the browser extension, then browse your profile and course list.

mod app;
mod ui;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xiras_core::{Config, OperationKind, SessionController};

use app::{App, AppState, USERNAME_ENV};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const USAGE: &str = "\
Usage: xiras [--print]

  (no flags)  Interactive terminal client
  --print     Prompt for credentials, print profile and courses as JSON
  --help      Show this message

Environment:
  XIRAS_API_URL    API base URL (overrides api_url in the config file)
  XIRAS_USERNAME   Pre-fills the username
  RUST_LOG         Log filter (default: warn)

The interactive client writes its log to xiras.log in the user cache
directory; --print logs to stderr.";

/// Log file name inside `Config::log_dir()`
const LOG_FILE: &str = "xiras.log";

/// Where log lines go.
///
/// The terminal UI owns the screen, so it never logs to stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File(PathBuf),
    Discard,
}

impl LogTarget {
    fn for_mode(interactive: bool) -> Self {
        if !interactive {
            return LogTarget::Stderr;
        }
        match Config::log_dir() {
            Ok(dir) => LogTarget::File(dir),
            Err(_) => LogTarget::Discard,
        }
    }
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes buffered log lines when dropped.
fn init_tracing(target: LogTarget) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (writer, guard) = match target {
        LogTarget::Stderr => tracing_appender::non_blocking(io::stderr()),
        LogTarget::File(dir) => match open_log_file(&dir) {
            Some(appender) => tracing_appender::non_blocking(appender),
            None => tracing_appender::non_blocking(io::sink()),
        },
        LogTarget::Discard => tracing_appender::non_blocking(io::sink()),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

fn open_log_file(dir: &Path) -> Option<RollingFileAppender> {
    std::fs::create_dir_all(dir).ok()?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(dir)
        .ok()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().skip(1).any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }
    if let Some(unknown) = args.iter().skip(1).find(|a| a.as_str() != "--print") {
        anyhow::bail!("Unknown argument: {}\n\n{}", unknown, USAGE);
    }

    let print_mode = args.len() > 1;
    let _guard = init_tracing(LogTarget::for_mode(!print_mode));
    let config = Config::load().context("Failed to load configuration")?;

    if print_mode {
        return print_records(config).await;
    }

    info!("xiras starting");

    let mut app = App::new(config)?;
    app.start_login();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    // Drop the session before exiting
    app.controller.logout();
    info!("xiras shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout so finished requests show up promptly
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Apply completed background requests
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

/// Non-interactive mode: log in, then print profile and courses as JSON.
async fn print_records(config: Config) -> Result<()> {
    let default_username = std::env::var(USERNAME_ENV)
        .ok()
        .or_else(|| config.last_username.clone())
        .unwrap_or_default();

    let username = prompt_username(&default_username)?;
    let password = rpassword::prompt_password("Password (encrypted): ")?;

    let mut controller = SessionController::new(&config)?;

    eprintln!("Authenticating...");
    controller.authenticate(&username, &password);
    drop(password);
    // Waits for the login and the profile fetch chained onto it
    controller.settle().await;

    if let Some(err) = controller.error(OperationKind::Authenticate) {
        anyhow::bail!("{}", err);
    }
    if let Some(err) = controller.error(OperationKind::Profile) {
        anyhow::bail!("{}", err);
    }

    controller.fetch_courses();
    controller.settle().await;
    if let Some(err) = controller.error(OperationKind::Courses) {
        anyhow::bail!("{}", err);
    }

    let output = serde_json::json!({
        "profile": controller.profile(),
        "courses": controller.courses(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    controller.logout();
    Ok(())
}

fn prompt_username(default: &str) -> Result<String> {
    if default.is_empty() {
        eprint!("Username: ");
    } else {
        eprint!("Username [{}]: ", default);
    }
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input.to_string())
    }
}
