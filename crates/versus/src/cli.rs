//! Command-line interface for versus.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Versus - shared tic-tac-toe lobbies over WebSockets
#[derive(Parser, Debug)]
#[command(name = "versus")]
#[command(about = "Tic-tac-toe lobby server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the lobby server
    Serve {
        /// Path to the TOML config file (defaults apply if it is missing)
        #[arg(short, long, default_value = "versus.toml", env = "VERSUS_CONFIG")]
        config: PathBuf,

        /// Host to bind to
        #[arg(long, env = "VERSUS_HOST")]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long, env = "VERSUS_PORT")]
        port: Option<u16>,

        /// SQLite database file; rooms stay in memory when unset
        #[arg(long, env = "VERSUS_DB_PATH")]
        db_path: Option<String>,
    },

    /// List rooms persisted in a database file
    Rooms {
        /// Path to the database file
        #[arg(long, default_value = "versus.db", env = "VERSUS_DB_PATH")]
        db_path: String,
    },
}
