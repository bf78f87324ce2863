/// Remote gateway to the backend that owns the profile and the logs
///
/// The gateway is a thin contract: fetch and save the profile, list, create
/// and delete logs. Any call may fail; the sync coordinator decides what to
/// do about it.

pub mod http;
pub mod memory;
pub mod offline;

pub use http::HttpGateway;
pub use memory::MemoryGateway;
pub use offline::OfflineGateway;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{DailyUsageLog, LogId, VehicleProfile};

/// Ways a remote call can fail
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote backend not configured")]
    Offline,

    #[error("Remote backend unreachable: {0}")]
    Transport(String),

    #[error("Remote backend answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed remote payload: {0}")]
    Malformed(String),

    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Malformed(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Malformed(err.to_string())
    }
}

/// Backend operations the sync coordinator relies on
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// `GET profile`
    async fn fetch_profile(&self) -> Result<VehicleProfile, RemoteError>;

    /// `PUT profile`, returning the server's echo
    async fn save_profile(&self, profile: &VehicleProfile) -> Result<VehicleProfile, RemoteError>;

    /// `GET logs`
    async fn list_logs(&self) -> Result<Vec<DailyUsageLog>, RemoteError>;

    /// `POST logs`, returning the stored record
    async fn create_log(&self, log: &DailyUsageLog) -> Result<DailyUsageLog, RemoteError>;

    /// `DELETE logs/{id}`
    async fn delete_log(&self, id: &LogId) -> Result<LogId, RemoteError>;
}

#[async_trait]
impl<G: RemoteGateway + ?Sized> RemoteGateway for Box<G> {
    async fn fetch_profile(&self) -> Result<VehicleProfile, RemoteError> {
        (**self).fetch_profile().await
    }

    async fn save_profile(&self, profile: &VehicleProfile) -> Result<VehicleProfile, RemoteError> {
        (**self).save_profile(profile).await
    }

    async fn list_logs(&self) -> Result<Vec<DailyUsageLog>, RemoteError> {
        (**self).list_logs().await
    }

    async fn create_log(&self, log: &DailyUsageLog) -> Result<DailyUsageLog, RemoteError> {
        (**self).create_log(log).await
    }

    async fn delete_log(&self, id: &LogId) -> Result<LogId, RemoteError> {
        (**self).delete_log(id).await
    }
}
