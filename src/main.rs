//! Main entry point for the episode-explorer CLI application.

use clap::{Parser, ValueEnum};
use crossterm::event::{Event, KeyEventKind};
use episode_explorer::config::Config;
use episode_explorer::error::LOAD_FAILURE_MESSAGE;
use episode_explorer::loader::{build_client, fetch_episodes};
use episode_explorer::query::{FilterSet, SortState};
use episode_explorer::render::{TableView, to_html, to_plain};
use episode_explorer::state::{AppState, LoadOutcome};
use episode_explorer::tui::{
    Action, App, LoadMessage, draw, init_terminal, poll_event, restore_terminal,
};
use log::{debug, info, warn};
use ratatui::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

/// How the episode table is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputMode {
    /// Interactive full-screen table
    Tui,
    /// Plain-text table on stdout
    Table,
    /// HTML table on stdout
    Html,
}

/// Command-line arguments for the episode-explorer application.
#[derive(Parser, Debug)]
#[command(
    name = "episode-explorer",
    version,
    about = "Browse a JSON episode list as a filterable, sortable table",
    long_about = "Fetch a JSON list of TV episodes, then filter, sort and display it in a TUI or as a plain-text / HTML table."
)]
struct Args {
    /// URL of the JSON episode list (overrides config)
    #[arg(short, long)]
    url: Option<String>,

    /// Output mode
    #[arg(short, long, value_enum, default_value_t = OutputMode::Tui)]
    output: OutputMode,

    /// Write table/html output to this file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Initial filter, e.g. "dalek series:1-4 year:2005-"
    #[arg(short, long)]
    filter: Option<String>,

    /// Sort field: rank, title, series, era, broadcast or rating
    #[arg(short, long)]
    sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    desc: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Write a default config file if none exists, print its path and exit
    #[arg(long)]
    init_config: bool,
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

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with CLI args
    if let Some(url) = &args.url {
        config.api_url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout.max(1);
    }
    if let Some(sort) = &args.sort {
        config.default_sort = sort.clone();
    }
    if args.desc {
        config.default_descending = true;
    }

    let sort = match config.sort_state() {
        Ok(sort) => sort,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let filters = match args.filter.as_deref().map(FilterSet::parse).transpose() {
        Ok(filters) => filters.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let client = build_client(&config)?;
    info!("Using endpoint: {}", config.api_url);

    match args.output {
        OutputMode::Tui => {
            let mut terminal = init_terminal()?;
            let mut app = App::new(AppState::new(filters, sort), config.api_url.clone());

            let result = run_app(&mut terminal, &mut app, &client, &config.api_url).await;

            restore_terminal()?;
            result
        }
        OutputMode::Table | OutputMode::Html => {
            let rendered = match load_once(filters, sort, &client, &config.api_url).await {
                Some(state) => {
                    let view = TableView::from_episodes(state.filtered());
                    if args.output == OutputMode::Html {
                        to_html(&view, &state.sort())
                    } else {
                        to_plain(&view, &state.sort())
                    }
                }
                None => {
                    eprintln!("Error: {}", LOAD_FAILURE_MESSAGE);
                    std::process::exit(1);
                }
            };

            match &args.out {
                Some(path) => fs::write(path, rendered)?,
                None => io::stdout().write_all(rendered.as_bytes())?,
            }
            Ok(())
        }
    }
}

/// Load the episode list once; `None` if the load failed.
async fn load_once(
    filters: FilterSet,
    sort: SortState,
    client: &reqwest::Client,
    url: &str,
) -> Option<AppState> {
    let mut state = AppState::new(filters, sort);
    let token = state.begin_load();
    let result = fetch_episodes(client, url).await;
    match state.finish_load(token, result) {
        LoadOutcome::Applied => Some(state),
        LoadOutcome::Failed | LoadOutcome::Stale => None,
    }
}

/// Start a load in the background, superseding any pending one.
fn spawn_load(
    app: &mut App,
    client: &reqwest::Client,
    url: &str,
    tx: &UnboundedSender<LoadMessage>,
) {
    let token = app.state.begin_load();
    debug!("Starting load {:?}", token);

    let client = client.clone();
    let url = url.to_string();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = fetch_episodes(&client, &url).await;
        // The receiver is gone once the UI has quit
        let _ = tx.send((token, result));
    });
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &reqwest::Client,
    url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<LoadMessage>();
    spawn_load(app, client, url, &tx);

    loop {
        while let Ok((token, result)) = rx.try_recv() {
            let outcome = app.finish_load(token, result);
            debug!("Load {:?} finished: {:?}", token, outcome);
        }

        // Draw UI
        terminal.draw(|f| draw(f, app))?;

        // Poll for events
        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_input(key) {
                Action::Quit => break,
                Action::Reload => spawn_load(app, client, url, &tx),
                Action::None => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
