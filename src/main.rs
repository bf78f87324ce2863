/// Main entry point for the Moto Tracker MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use moto_tracker_mcp::config::{DEFAULT_RETENTION, DEFAULT_TIMEOUT_SECS};
use moto_tracker_mcp::{EngineConfig, MotoTracker, RemoteConfig};

/// Get the default database path, falling back when the home directory is not writable
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let potential_paths = [
        dirs::home_dir().map(|mut p| {
            p.push(".moto_tracker");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("moto_tracker");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("moto_tracker");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".moto_tracker");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("moto.db"));
            }
        }
    }

    let mut temp_path = std::env::temp_dir();
    temp_path.push("moto_tracker");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("moto.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the Moto Tracker MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite cache database
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "MOTO_DATABASE")]
    database: Option<PathBuf>,

    /// Base URL of the remote backend; runs offline when omitted
    #[arg(long, env = "MOTO_REMOTE_URL")]
    remote_url: Option<String>,

    /// Bearer token for the remote backend
    #[arg(long, env = "MOTO_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Remote request timeout in seconds
    #[arg(long, env = "MOTO_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Number of most recent logs kept in the local cache
    #[arg(long, default_value_t = DEFAULT_RETENTION)]
    retention: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("moto_tracker_mcp={}", log_level))
        .with_writer(std::io::stderr) // stdout carries JSON-RPC
        .init();

    info!("Starting Moto Tracker MCP server");

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let mut config = EngineConfig::new(db_path);
    config.retention = args.retention;
    if let Some(url) = args.remote_url.filter(|u| !u.trim().is_empty()) {
        let mut remote = RemoteConfig::new(url);
        remote.api_token = args.api_token;
        remote.timeout = Duration::from_secs(args.timeout_secs.max(1));
        config = config.with_remote(remote);
    }

    let tracker = MotoTracker::new(config).await?;
    tracker.run().await?;

    info!("Moto Tracker MCP server shutdown complete");
    Ok(())
}
