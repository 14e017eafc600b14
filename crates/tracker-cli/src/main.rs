//! Tracker CLI - command-line access to an event store.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{append, get, list, meta, stats, StoreArgs};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Append and read events in a tracker event store")]
struct Cli {
    /// Store directory (created if absent)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// JSON store configuration; --data-dir overrides its data_dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append an event and print its id
    Append {
        /// User id attached to the event
        #[arg(long, allow_hyphen_values = true)]
        user: i64,
        /// Event type id attached to the event
        #[arg(long = "type", allow_hyphen_values = true)]
        event_type: i32,
        /// Payload file (or stdin if not provided)
        input: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the payload of an event to stdout
    Get {
        /// Event id
        id: u64,
    },
    /// Show the metadata of an event
    Meta {
        /// Event id
        id: u64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show store counters
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List event metadata in id order
    List {
        /// Stop after N events (default: unlimited)
        #[arg(long)]
        max_events: Option<u64>,
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = StoreArgs {
        data_dir: cli.data_dir,
        config: cli.config,
    };

    let result = match cli.command {
        Commands::Append {
            user,
            event_type,
            input,
            json,
        } => append::run(&store, user, event_type, input, json),
        Commands::Get { id } => get::run(&store, id),
        Commands::Meta { id, json } => meta::run(&store, id, json),
        Commands::Stats { json } => stats::run(&store, json),
        Commands::List { max_events, json } => list::run(&store, max_events, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
