//! Versus - shared tic-tac-toe lobbies over WebSockets.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;
use versus_server::{
    MemoryStore, ServerConfig, SessionRegistry, SnapshotStore, SqliteStore, router,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            db_path,
        } => {
            let config = ServerConfig::load_or_default(&config)?.with_overrides(host, port, db_path);
            init_tracing(config.log_filter());
            run_server(config).await
        }
        Command::Rooms { db_path } => {
            init_tracing("warn");
            list_rooms(&db_path)
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `fallback`.
fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

/// Run the lobby server until Ctrl+C, then flush room snapshots.
#[instrument(skip(config), fields(addr = %config.bind_addr()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    let store: Arc<dyn SnapshotStore> = match config.db_path() {
        Some(path) => Arc::new(SqliteStore::open(path.as_str())?),
        None => {
            warn!("No database configured, rooms will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let registry = SessionRegistry::new(store);
    let app = router(registry.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server ready at http://{}/", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let rooms = registry.shutdown().await;
    info!(rooms, "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Print every persisted room.
#[instrument]
fn list_rooms(db_path: &str) -> Result<()> {
    let store = SqliteStore::open(db_path)?;
    let rooms = store.list_blocking()?;

    if rooms.is_empty() {
        println!("No rooms stored in {}", db_path);
        return Ok(());
    }

    println!("{:<38} {:<8} {:<8} PLAYERS", "ROOM", "STARTED", "TURN");
    for room in &rooms {
        let players = room
            .players()
            .iter()
            .map(|p| format!("{} ({:?})", p.name(), p.role()))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<38} {:<8} {:<8} {}",
            room.room_id(),
            room.game_started(),
            room.current_turn().to_string(),
            players
        );
    }
    Ok(())
}
