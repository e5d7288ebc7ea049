//! Qrypt - Browse and edit a crypto token catalog
//!
//! A terminal UI application for managing a catalog of crypto tokens and
//! their blockchain-platform addresses, enriched with market data pulled
//! from the CoinGecko API through a TTL-cached adapter.

mod app;
mod cache;
mod catalog;
mod cli;
mod config;
mod market;
mod ui;

use std::io;
use std::panic;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use app::{App, AppState, StatusMessage};
use cli::{Cli, StartupConfig};
use config::CoinGeckoConfig;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Initializes tracing from RUST_LOG
///
/// Stays silent unless RUST_LOG is set, so log lines do not tear the TUI;
/// users who want logs redirect stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &mut App) {
    match app.state.clone() {
        AppState::Loading => {
            render_loading(frame);
        }
        AppState::TokenList => {
            ui::render_token_list(frame, app);
        }
        AppState::TokenDetail(token_id) => {
            ui::render_token_detail(frame, app, token_id);
        }
        AppState::TokenForm(_) => {
            ui::render_token_form(frame, app);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while the startup sync runs
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Syncing token catalog with CoinGecko...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse CLI arguments before touching the terminal
    let cli = Cli::parse();
    let startup = match StartupConfig::from_cli(&cli) {
        Ok(startup) => startup,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    };

    let mut config = match CoinGeckoConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(1);
        }
    };
    if let Some(vs_currency) = &startup.vs_currency {
        config.vs_currency = vs_currency.clone();
    }
    if let Some(cache_file) = &startup.cache_file {
        config.cache_file = cache_file.clone();
    }

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app instance
    let mut app = App::new(config, &startup);

    // Initial render to show loading state
    terminal.draw(|f| render_ui(f, &mut app))?;

    // Startup sync, unless running offline
    if !startup.offline {
        app.sync_catalog().await;
    }

    // Main event loop
    loop {
        // Render UI
        terminal.draw(|f| render_ui(f, &mut app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // Run a requested sync while showing a progress note
        if app.sync_requested {
            app.sync_requested = false;
            app.status = Some(StatusMessage::Info(
                "Syncing with CoinGecko...".to_string(),
            ));
            terminal.draw(|f| render_ui(f, &mut app))?;
            app.sync_catalog().await;
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
