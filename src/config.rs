/// Engine configuration
///
/// Built by `main.rs` from command line flags and environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Number of most recent logs kept in the local cache
pub const DEFAULT_RETENTION: usize = 180;

/// Default HTTP timeout for the remote backend
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the remote backend
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL, e.g. `https://api.example.com/moto`
    pub base_url: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Everything needed to start a tracker
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// SQLite file backing the local cache
    pub database_path: PathBuf,
    /// Runs offline when absent
    pub remote: Option<RemoteConfig>,
    pub retention: usize,
}

impl EngineConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path,
            remote: None,
            retention: DEFAULT_RETENTION,
        }
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = Some(remote);
        self
    }
}
