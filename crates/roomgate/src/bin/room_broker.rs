//! Room broker: lobby management and session-host placement.

use clap::Parser;
use roomgate::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "room-broker")]
#[command(about = "Roomgate room broker")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8555")]
    bind: String,

    /// Host advertised to clients for started rooms
    #[arg(long, default_value = "127.0.0.1")]
    session_host: String,

    /// Port of the session host advertised to clients
    #[arg(long, default_value = "8333")]
    session_port: u16,

    /// Map used when CreateRoom names none
    #[arg(long, default_value = "000")]
    default_map: String,

    /// Seats per room
    #[arg(long, default_value = "8")]
    capacity: u32,

    /// Room IDs wrap (and old rooms are purged) at this value
    #[arg(long, default_value = "100000")]
    id_ceiling: u64,

    /// Close connections idle for this many seconds
    #[arg(long, default_value = "60")]
    idle_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = RoomConfig {
        default_map_id: args.default_map,
        capacity: args.capacity,
        id_ceiling: args.id_ceiling,
    };
    let directory = FixedHostDirectory::new(args.session_host, args.session_port);

    let server = RoomServerBuilder::new()
        .bind(&args.bind)
        .room_config(config)
        .idle_timeout(std::time::Duration::from_secs(args.idle_timeout_secs))
        .build(directory)
        .await?;
    tracing::info!(addr = %server.local_addr()?, "room broker listening");

    server.run().await?;
    Ok(())
}
