//! gridwatch CLI
//!
//! Console entry point. Runs the chat command loop against stdin, with
//! reports printed to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gridwatch::{
    commands::Dispatcher,
    error::Result,
    gateway::{ChatGateway, ConsoleGateway, IncomingMessage},
    models::{Config, WatchState, World},
    services::{FeedClient, SnapshotSource},
    storage::ErrorLog,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// gridwatch - ATLAS grid population watcher
#[derive(Parser, Debug)]
#[command(
    name = "gridwatch",
    version,
    about = "Watches ATLAS grid populations and reports to chat channels"
)]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "gridwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive watch console
    Run,

    /// Fetch one snapshot and print the grid populations
    Fetch {
        /// World to fetch (default: the configured world)
        #[arg(long)]
        world: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Feed stdin lines into the command inbox until EOF.
async fn read_console(inbox: mpsc::Sender<IncomingMessage>) {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let message = IncomingMessage::new("console", "console", line.trim_end());
                if inbox.send(message).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(error) => {
                log::error!("Console read failed: {error}");
                break;
            }
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("gridwatch starting...");

    let config = Config::load_or_default(&cli.config);
    config.validate()?;
    let config = Arc::new(config);

    match cli.command {
        Command::Run => {
            let state = Arc::new(WatchState::new(&config.watch));
            let gateway: Arc<dyn ChatGateway> = Arc::new(ConsoleGateway::new());
            let source: Arc<dyn SnapshotSource> = Arc::new(FeedClient::new(Arc::clone(&config))?);
            let error_log = ErrorLog::new(&config.logging.error_log);
            let dispatcher = Dispatcher::new(state, gateway, source, error_log);

            let (tx, rx) = mpsc::channel(64);
            tokio::spawn(read_console(tx));

            log::info!("Type /? for the command list. Ctrl-D exits.");
            dispatcher.run(rx).await;
        }

        Command::Fetch { world } => {
            let world = match world {
                Some(raw) => raw.parse::<World>()?,
                None => config.watch.world,
            };

            let source = FeedClient::new(Arc::clone(&config))?;
            let snapshot = source.fetch(world, &[]).await?;

            log::info!(
                "Fetched {} grids from {}, {} players total",
                snapshot.len(),
                world,
                snapshot.total_population()
            );
            let mut names: Vec<&str> = snapshot.grid_names().collect();
            names.sort();
            for name in names {
                if let Some(status) = snapshot.get(name) {
                    log::info!("  {} count:{}", name, status.population);
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("NA feed: {}", config.feeds.na_url);
            log::info!("EU feed: {}", config.feeds.eu_url);
            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}
