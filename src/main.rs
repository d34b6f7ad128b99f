mod commands;
mod parse;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use chrono::NaiveDate;
use repeatcal_core::config::RepeatcalConfig;
use repeatcal_core::operations::EventOperations;
use repeatcal_core::store::HttpStore;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::config::ConfigCommand;
use crate::commands::edit::EditArgs;
use crate::commands::new::NewArgs;

#[derive(Parser)]
#[command(name = "repeatcal")]
#[command(about = "Create, edit and delete recurring calendar events")]
struct Cli {
    /// Event server URL (defaults to server_url from the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log at the configured level instead of warnings only
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events, grouped by day
    List {
        /// Show events from this date (YYYY-MM-DD, today, tomorrow)
        #[arg(long, value_parser = parse::date)]
        from: Option<NaiveDate>,

        /// Show events until this date, inclusive
        #[arg(long, value_parser = parse::date)]
        to: Option<NaiveDate>,

        /// Print the events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an event, or a recurring series with --repeat
    New(NewArgs),
    /// Edit one occurrence, or its whole series with --all
    Edit(EditArgs),
    /// Delete one occurrence, or its whole series with --series
    Delete {
        id: String,

        #[arg(long)]
        series: bool,
    },
    /// Print the occurrences an event would expand to, without saving
    Expand(NewArgs),
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RepeatcalConfig::load()?;
    init_tracing(cli.verbose, &config.log_level);

    let server = cli.server.unwrap_or_else(|| config.server_url.clone());

    match cli.command {
        Commands::List { from, to, json } => {
            let mut ops = operations(&config, server);
            commands::list::run(&mut ops, from, to, json).await
        }
        Commands::New(args) => {
            let mut ops = operations(&config, server);
            commands::new::run(&mut ops, &args).await
        }
        Commands::Edit(args) => {
            let mut ops = operations(&config, server);
            commands::edit::run(&mut ops, &args).await
        }
        Commands::Delete { id, series } => {
            let mut ops = operations(&config, server);
            commands::delete::run(&mut ops, &id, series).await
        }
        Commands::Expand(args) => commands::expand::run(&args),
        Commands::Config { command } => commands::config::run(command, &config),
    }
}

fn operations(config: &RepeatcalConfig, server: String) -> EventOperations<HttpStore> {
    EventOperations::new(HttpStore::new(server)).with_repeat_end_limit(config.repeat_end_limit)
}

/// RUST_LOG wins; otherwise warnings only, or the configured level with --verbose.
fn init_tracing(verbose: bool, level: &str) {
    let fallback = if verbose { level } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
