/// Public library interface for the Moto Tracker MCP server
///
/// This module exports the vehicle usage engine (cache, remote gateway,
/// sync coordinator, metrics and maintenance alerts) and the server that
/// exposes it to MCP clients.

use thiserror::Error;

// Internal modules
mod domain;
mod mcp;
mod tools;

pub mod config;
pub mod maintenance;
pub mod metrics;
pub mod remote;
pub mod storage;
pub mod sync;

// Re-export public modules and types
pub use config::{EngineConfig, RemoteConfig};
pub use domain::*;
pub use remote::{HttpGateway, MemoryGateway, OfflineGateway, RemoteError, RemoteGateway};
pub use storage::{CacheKey, CacheStore, MemoryCache, SqliteCache, StorageError};
pub use sync::{CachedLog, FlushReport, SyncCoordinator};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Remote backend error: {0}")]
    Remote(#[from] remote::RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coordinator used by the server: SQLite cache plus whichever backend is configured
pub type Coordinator = SyncCoordinator<SqliteCache, Box<dyn RemoteGateway>>;

/// Vehicle usage tracker that implements the MCP protocol
///
/// Keeps a local SQLite cache of the profile and daily logs, mirrors them
/// to the remote backend when one is configured, and answers metric and
/// maintenance questions from whatever data is available.
pub struct MotoTracker {
    sync: Coordinator,
}

impl MotoTracker {
    /// Create a tracker from its configuration
    ///
    /// Opens (and migrates) the cache database. Without a remote URL the
    /// tracker runs fully offline.
    pub async fn new(config: EngineConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing Moto Tracker with database: {:?}", config.database_path);

        let cache = SqliteCache::new(config.database_path)?;

        let gateway: Box<dyn RemoteGateway> = match &config.remote {
            Some(remote) => {
                tracing::info!("Using remote backend at {}", remote.base_url);
                Box::new(HttpGateway::new(remote)?)
            }
            None => {
                tracing::info!("No remote backend configured, running offline");
                Box::new(OfflineGateway)
            }
        };

        let sync = SyncCoordinator::with_retention(cache, gateway, config.retention);
        Ok(Self { sync })
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let cached = self.sync.cached_logs().len();
        let pending = self.sync.pending_count();
        tracing::info!("Server started, {} cached logs ({} pending sync)", cached, pending);

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the sync coordinator (useful for testing)
    pub fn sync(&self) -> &Coordinator {
        &self.sync
    }
}
