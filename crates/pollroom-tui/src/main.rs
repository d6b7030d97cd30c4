//! Pollroom terminal client.
//!
//! # Usage
//!
//! ```bash
//! # Anonymous, read-only identity
//! pollroom --server http://localhost:8069
//!
//! # Named user with a session, joining a channel on start
//! pollroom --server https://chat.example --name ana --session abc123 --channel ops
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use pollroom_client::{
    ClientIdentity, RedbReadPositions, SyncConfig,
    transport::{DEFAULT_TIMEOUT, HttpService},
};
use pollroom_tui::{Runtime, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Pollroom terminal chat client
#[derive(Parser, Debug)]
#[command(name = "pollroom")]
#[command(about = "Terminal client for the Pollroom polling chat service")]
#[command(version)]
struct Args {
    /// Base URL of the chat service
    #[arg(short, long, default_value = "http://localhost:8069")]
    server: String,

    /// Display name used for authorship and typing indicators
    ///
    /// Without a name the client is read-only for other people's messages
    /// and sends no typing signals.
    #[arg(short, long)]
    name: Option<String>,

    /// Session id sent with every request
    #[arg(long)]
    session: Option<String>,

    /// Channel to join on start (created if missing)
    #[arg(short, long)]
    channel: Option<String>,

    /// Read-position database
    #[arg(long, default_value = "pollroom.redb")]
    db: PathBuf,

    /// Log file; the terminal belongs to the UI
    #[arg(long, default_value = "pollroom.log")]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Message poll interval in milliseconds
    #[arg(long, default_value = "2000")]
    poll_ms: u64,

    /// Presence poll interval in milliseconds
    #[arg(long, default_value = "5000")]
    presence_ms: u64,

    /// Rows from the bottom still counted as reading the latest messages
    #[arg(long, default_value = "2")]
    anchor_rows: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_file = std::fs::OpenOptions::new().create(true).append(true).open(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Arc::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    tracing::info!(server = %args.server, name = ?args.name, "pollroom starting");

    let service = HttpService::new(&args.server, args.session, DEFAULT_TIMEOUT)?;
    let positions = RedbReadPositions::open(&args.db)?;
    let identity = args.name.map_or_else(ClientIdentity::anonymous, ClientIdentity::named);
    let config = SyncConfig {
        message_interval: Duration::from_millis(args.poll_ms),
        presence_interval: Duration::from_millis(args.presence_ms),
        anchor_threshold: args.anchor_rows,
        ..SyncConfig::default()
    };

    let driver = TerminalDriver::new()?;
    let mut runtime = Runtime::new(driver, service, identity, config, positions);
    if let Some(channel) = args.channel {
        runtime = runtime.with_initial_channel(channel);
    }

    runtime.run().await?;
    Ok(())
}
