/// Tool for pushing logs recorded offline

use serde::Serialize;

use crate::remote::RemoteGateway;
use crate::storage::CacheStore;
use crate::sync::{FlushReport, SyncCoordinator};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushResponse {
    pub report: FlushReport,
    pub message: String,
}

/// Try to send every pending log to the backend
pub async fn flush_pending<C: CacheStore, G: RemoteGateway>(
    sync: &SyncCoordinator<C, G>,
) -> FlushResponse {
    let report = sync.flush_pending().await;

    let message = match (report.pushed, report.still_pending) {
        (0, 0) => "✅ Everything is already synced.".to_string(),
        (pushed, 0) => format!("☁️ Synced {} pending log{}.", pushed, if pushed == 1 { "" } else { "s" }),
        (pushed, waiting) => format!(
            "📴 Synced {} log{}, {} still waiting for the backend.",
            pushed,
            if pushed == 1 { "" } else { "s" },
            waiting
        ),
    };

    FlushResponse { report, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::OfflineGateway;
    use crate::storage::MemoryCache;

    #[tokio::test]
    async fn test_flush_with_nothing_pending() {
        let sync = SyncCoordinator::new(MemoryCache::new(), OfflineGateway);
        let response = flush_pending(&sync).await;
        assert_eq!(response.report, FlushReport::default());
        assert!(response.message.contains("already synced"));
    }
}
