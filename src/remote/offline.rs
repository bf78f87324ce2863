/// Gateway used when no backend is configured
///
/// Every call fails with `RemoteError::Offline`, so the coordinator always
/// serves and persists through the local cache.

use async_trait::async_trait;

use crate::domain::{DailyUsageLog, LogId, VehicleProfile};
use crate::remote::{RemoteError, RemoteGateway};

#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGateway;

#[async_trait]
impl RemoteGateway for OfflineGateway {
    async fn fetch_profile(&self) -> Result<VehicleProfile, RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn save_profile(&self, _profile: &VehicleProfile) -> Result<VehicleProfile, RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn list_logs(&self) -> Result<Vec<DailyUsageLog>, RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn create_log(&self, _log: &DailyUsageLog) -> Result<DailyUsageLog, RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn delete_log(&self, _id: &LogId) -> Result<LogId, RemoteError> {
        Err(RemoteError::Offline)
    }
}
