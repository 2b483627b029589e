//! Main entry point for the tvmaze-browser CLI application.

use clap::Parser;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info, warn};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tvmaze_browser::api::TvMazeClient;
use tvmaze_browser::browse::{CatalogStatus, FetchOutcome, Lifecycle, NavigationCoordinator};
use tvmaze_browser::config::Config;
use tvmaze_browser::tui::{draw, poll_event, Action, App, Screen};
use tvmaze_browser::types::ShowId;

type Navigator = NavigationCoordinator<TvMazeClient>;

/// Command-line arguments for the tvmaze-browser application.
#[derive(Parser, Debug)]
#[command(
    name = "tvmaze-browser",
    version,
    about = "A terminal browser for TVMaze shows and episodes",
    long_about = "Browse the TVMaze catalog, pick a show, and search its episodes using a TUI interface."
)]
struct Args {
    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Base URL of the TVMaze API (overrides config)
    #[arg(short, long)]
    api_url: Option<String>,

    /// Open this show's episodes on startup
    #[arg(short, long)]
    show: Option<ShowId>,

    /// Print the matching list and exit instead of starting the TUI
    #[arg(short, long)]
    print: bool,

    /// Initial show search text
    #[arg(short, long)]
    query: Option<String>,

    /// Initial episode search text
    #[arg(short, long)]
    episode_query: Option<String>,

    /// Write a default config file if none exists, print its path, and exit
    #[arg(long)]
    init_config: bool,
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    if args.init_config {
        let path = Config::create_default_if_missing()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Load config
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with CLI args
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }

    info!("Using TVMaze API at {}", config.api_url);

    let client = TvMazeClient::from_config(&config)?;
    let (mut nav, mut outcomes) = NavigationCoordinator::new(Arc::new(client));

    nav.subscribe(|change| {
        debug!(
            "State: {:?}, showing {} ({})",
            change.lifecycle,
            change.display.len(),
            change.count_label
        );
    });

    if args.print {
        return run_print(&args, &mut nav, &mut outcomes).await;
    }

    nav.load_catalog();
    if let Some(query) = &args.query {
        nav.set_show_query(query);
    }

    let mut app = App::new(&config);
    if let Some(show_id) = args.show {
        nav.select_show(Some(show_id));
        app.screen = Screen::EpisodeList;
    }

    // Initialize terminal
    let mut terminal = init_terminal()?;

    // Main event loop
    let result = run_app(
        &mut terminal,
        &mut app,
        &mut nav,
        &mut outcomes,
        args.episode_query.as_deref(),
    )
    .await;

    // Restore terminal
    restore_terminal()?;

    result
}

/// Wait until every outstanding fetch has been applied.
async fn settle(nav: &mut Navigator, outcomes: &mut UnboundedReceiver<FetchOutcome>) {
    while nav.has_pending() {
        match outcomes.recv().await {
            Some(outcome) => nav.complete(outcome),
            None => break,
        }
    }
}

/// Headless mode: print the matching shows or episodes and the count label.
async fn run_print(
    args: &Args,
    nav: &mut Navigator,
    outcomes: &mut UnboundedReceiver<FetchOutcome>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(show_id) = args.show {
        nav.select_show(Some(show_id));
        settle(nav, outcomes).await;

        if let Lifecycle::Error { message, .. } = nav.lifecycle() {
            return Err(message.clone().into());
        }
        if let Some(query) = &args.episode_query {
            nav.set_episode_query(query);
        }

        let state = nav.state();
        for episode in &state.display {
            println!("{}", episode.to_display());
        }
        println!("{}", state.count_label);
        return Ok(());
    }

    nav.load_catalog();
    settle(nav, outcomes).await;

    if let CatalogStatus::Failed(message) = nav.catalog_status() {
        return Err(message.clone().into());
    }
    if let Some(query) = &args.query {
        nav.set_show_query(query);
    }

    for show in nav.catalog_view() {
        println!("{}\t{}", show.id, show.to_display());
    }
    println!("{}", nav.catalog_count_label());
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    nav: &mut Navigator,
    outcomes: &mut UnboundedReceiver<FetchOutcome>,
    mut initial_episode_query: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Apply finished fetches
        while let Ok(outcome) = outcomes.try_recv() {
            nav.complete(outcome);
            if matches!(nav.lifecycle(), Lifecycle::Browsing(_)) {
                if let Some(query) = initial_episode_query.take() {
                    nav.set_episode_query(query);
                }
            }
            app.sync(nav);
        }

        // Draw UI
        terminal.draw(|f| draw(f, app, nav))?;

        // Poll for events
        let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_input(key, nav) {
            Action::None => {}
            Action::Quit => break,
            Action::SelectShow(show_id) => nav.select_show(show_id),
            Action::SelectEpisode(episode_id) => nav.select_episode(episode_id),
            Action::ShowQuery(text) => nav.set_show_query(&text),
            Action::EpisodeQuery(text) => nav.set_episode_query(&text),
            Action::ShowAll => nav.show_all(),
            Action::Retry => nav.retry(),
        }
        app.sync(nav);

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
