//! Session host: runs live matches handed off by the room broker.

use std::time::Duration;

use clap::Parser;
use roomgate::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "session-host")]
#[command(about = "Roomgate session host")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8333")]
    bind: String,

    /// Room broker address sessions hydrate from
    #[arg(long, default_value = "127.0.0.1:8555")]
    room_broker: String,

    /// Length of one write+read cycle, in milliseconds
    #[arg(long, default_value = "40000")]
    cycle_ms: u64,

    /// Length of the write window at the start of each cycle, in milliseconds
    #[arg(long, default_value = "30000")]
    write_window_ms: u64,

    /// Drop sessions with no reads or writes for this many seconds
    #[arg(long, default_value = "600")]
    idle_ttl_secs: u64,

    /// Deadline for fetching a room from the broker, in seconds
    #[arg(long, default_value = "10")]
    upstream_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let window = AccessWindowGate::new(
        Duration::from_millis(args.cycle_ms),
        Duration::from_millis(args.write_window_ms),
    )?;
    let session_config = SessionConfig {
        window,
        idle_ttl: Duration::from_secs(args.idle_ttl_secs),
    };
    let bootstrap_config = BootstrapConfig {
        upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
    };

    let server = SessionServerBuilder::new()
        .bind(&args.bind)
        .broker(&args.room_broker)
        .session_config(session_config)
        .bootstrap_config(bootstrap_config)
        .build()
        .await?;
    tracing::info!(
        addr = %server.local_addr()?,
        broker = %args.room_broker,
        "session host listening"
    );

    server.run().await?;
    Ok(())
}
