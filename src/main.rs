mod app;
mod config;
mod domain;
mod input;
mod logging;
mod notifications;
mod persistence;
mod scheduler;
mod store;
mod ticker;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use clap::{Parser, Subcommand};
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notifications::OsNotifier;
use ratatui::{backend::CrosstermBackend, Terminal};
use scheduler::Scheduler;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "tasknag")]
#[command(about = "A terminal task list with a timer that keeps asking what you are working on", long_about = None)]
struct Cli {
    /// Config file. Defaults to ~/.config/tasknag/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive task list (default)
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let state_dir = config.state_dir()?;
    let _log_guard = logging::init(&state_dir, &config.log_level)?;
    tracing::info!(state_dir = %state_dir.display(), backend = ?config.backend.kind, "starting");

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_tui(&config),
    }
}

fn run_tui(config: &AppConfig) -> Result<()> {
    let store = store::make_backend(config)?;
    tracing::info!(backend = store.name(), "backend ready");

    let mut scheduler = Scheduler::new(
        Arc::clone(&store),
        Arc::new(OsNotifier::new()),
        config.notifications.interval(),
        config.notifications.mode,
    );
    if config.notifications.enabled {
        scheduler.start()?;
    }

    let mut app = AppState::new(store);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    scheduler.stop();

    if let Err(err) = &result {
        tracing::error!("event loop failed: {:#}", err);
    }
    tracing::info!("exiting");
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let repaint = ticker::repaint_interval();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Poll with a timeout so the clock and timer keep ticking
        if event::poll(repaint)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key) {
                    return Ok(());
                }
            }
        }
    }
}
