mod api;
mod app;
mod cli;
mod config;
mod error;
mod logging;
mod models;
mod routes;
mod session;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::api::{HttpTransport, Transport};
use crate::app::{App, Reply};
use crate::cli::Cli;
use crate::routes::Route;
use crate::session::{ConfiguredCredentials, Session};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init(&cli)?;
    logging::init(&config.log_file)?;
    info!(proxy_root = %config.proxy_root(), "starting comandas admin");

    let landing = cli
        .route
        .as_deref()
        .map(str::parse::<Route>)
        .transpose()
        .context("invalid --route")?;

    let transport = Arc::new(HttpTransport::new(config.request_timeout())?);
    let session = Session::new(Box::new(ConfiguredCredentials::from_config(&config)));
    let (mut app, replies) = App::new(&config, transport, session);
    if let Some(route) = landing {
        app.set_landing(route);
    }
    app.navigate(Route::Login);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, replies);

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(%err, "application stopped");
        println!("Error: {err}");
    }

    info!("bye");
    result
}

/// Draws, reads one key if any, then applies finished backend calls.
fn run_app<B: Backend, T: Transport>(
    terminal: &mut Terminal<B>,
    app: &mut App<T>,
    mut replies: UnboundedReceiver<Reply<T>>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        while let Ok(reply) = replies.try_recv() {
            reply(app);
        }

        app.tick(Instant::now());

        if app.should_quit() {
            return Ok(());
        }
    }
}
