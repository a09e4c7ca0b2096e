mod app;
mod config;
mod demo;
mod event;
mod ui;

use std::io;
use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use ui_behaviors::{BehaviorError, BehaviorResult};

use crate::app::App;
use crate::config::{CliArgs, Config};
use crate::event::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    if cli.print_default_config {
        print!("{}", config::default_config_toml());
        return Ok(());
    }

    // Initialize color-eyre with custom panic hook that restores terminal
    install_panic_hook()?;

    let config = config::load(&cli)?;
    let _log_guard = init_logging(&config)?;
    info!(fps = config.appearance.fps, animations = config.appearance.animations, "ui-behaviors starting");

    let mut app = App::new(config)?;
    let mouse = app.config.appearance.mouse;

    // Setup terminal
    enable_raw_mode().map_err(|e| BehaviorError::Terminal(format!("Failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut event_handler = EventHandler::new(app.config.tick_rate());
    let start = Instant::now();

    // ── Main event loop ───────────────────────────────────────────────
    loop {
        terminal.draw(|f| ui::draw(f, &mut app))?;

        tokio::select! {
            event = event_handler.next() => match event {
                Some(event) => app.handle_event(event, start.elapsed()),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => app.should_quit = true,
        }

        if app.should_quit {
            break;
        }
    }

    event_handler.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    info!("ui-behaviors exiting");
    Ok(())
}

/// Install color-eyre, then wrap its panic hook so the terminal is restored
/// before the report prints.
fn install_panic_hook() -> Result<()> {
    color_eyre::install()?;
    let eyre_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        eyre_hook(panic_info);
    }));
    Ok(())
}

/// Initialize tracing to the configured log file. The returned guard flushes
/// the writer on drop and must live until exit.
fn init_logging(config: &Config) -> BehaviorResult<Option<WorkerGuard>> {
    use tracing_subscriber::EnvFilter;

    let Some(path) = config.log_file() else {
        // Nothing may reach stdout while the TUI owns it
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .with_writer(io::sink)
            .init();
        return Ok(None);
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::OpenOptions::new().create(true).append(true).open(&path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}
