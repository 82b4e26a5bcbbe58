//! Pinpad - terminal lock screen
//!
//! Mounts the PIN overlay full-screen. Unlocking lands on a small home menu
//! from which the terminal can be locked again or the PIN changed.

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pinpad_tui::app::{App, TuiConfig};
use pinpad_tui::auth;
use pinpad_tui::cli::Args;

/// Application entry point with panic handling for terminal restoration
fn main() -> Result<()> {
    let args = Args::parse();

    // Set up panic hook to restore terminal on crash
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Log to a file; the alternate screen owns stdout
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)
        .with_context(|| format!("Failed to open log file {:?}", args.log_file))?;
    let directive = if args.verbose {
        "pinpad_tui=debug,pinpad_core=debug"
    } else {
        "pinpad_tui=info"
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let mut config = match &args.config {
        Some(path) => TuiConfig::load_from(path)?,
        None => TuiConfig::load(),
    };
    args.apply(&mut config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = run_app(&config, runtime.handle().clone());

    if let Err(e) = &result {
        tracing::error!("Application error: {:#}", e);
    }

    result
}

/// Main application runner
fn run_app(config: &TuiConfig, runtime: tokio::runtime::Handle) -> Result<()> {
    let store = auth::FilePinStore::new(config.pin_file_path());
    let collaborators = auth::collaborators(config);
    let mut app = App::new(config, Box::new(store), collaborators, runtime)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
