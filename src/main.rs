use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sixstones_server::config::{load_default_config, LoadedConfig};
use sixstones_server::hub::spawn_hub;
use sixstones_server::rooms::RoomManager;
use sixstones_server::server::{serve, GameServer};

#[derive(Parser)]
#[command(name = "sixstones-server", about = "Six-in-a-row game server over WebSocket")]
struct Cli {
    /// Address to bind (overrides the config file)
    #[arg(long, env = "SIXSTONES_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "SIXSTONES_PORT")]
    port: Option<u16>,

    /// Path to sixstones.toml (default: auto-discover)
    #[arg(long, env = "SIXSTONES_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = match cli.config {
        Some(ref path) => LoadedConfig::from_path(path)?,
        None => load_default_config(),
    };
    let mut config = loaded.config.clone();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(config.log_level.parse()?)
                .from_env_lossy(),
        )
        .init();
    loaded.log();
    tracing::info!(?config, "configuration");

    let (hub, _hub_task) = spawn_hub(RoomManager::new());
    let server = Arc::new(GameServer::new(hub, config.max_frame_bytes));

    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "starting game server");

    serve(listener, server).await?;
    Ok(())
}
