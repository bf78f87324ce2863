/// Basic integration tests
use chrono::NaiveDate;
use moto_tracker_mcp::maintenance::{OilChangeStatus, Severity};
use moto_tracker_mcp::metrics::aggregate_window;
use moto_tracker_mcp::*;
use tempfile::NamedTempFile;

fn log_on(d: u32, odometer_start: f64, odometer_end: f64) -> DailyUsageLog {
    DailyUsageLog::new(
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
        odometer_start,
        odometer_end,
        3.0,
        Some(1.0),
        vec![FuelRefuelEntry::new(2.0, None).unwrap()],
        None,
    )
    .unwrap()
}

fn sqlite_coordinator<G: RemoteGateway>(file: &NamedTempFile, gateway: G) -> SyncCoordinator<SqliteCache, G> {
    let cache = SqliteCache::new(file.path().to_path_buf()).expect("Failed to create cache");
    SyncCoordinator::new(cache, gateway)
}

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_tracker_runs_offline() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let tracker = MotoTracker::new(EngineConfig::new(temp_file.path().to_path_buf()))
            .await
            .expect("Failed to create tracker");

        let profile = tracker.sync().load_profile().await;
        assert_eq!(profile, VehicleProfile::default());
        assert!(tracker.sync().list_logs().await.is_empty());
    }

    #[tokio::test]
    async fn test_profile_survives_restart_offline() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let profile = VehicleProfile {
            fuel_economy_km_per_liter: 35.0,
            fuel_price_per_liter: Some(6.0),
            ..VehicleProfile::default()
        };

        {
            let sync = sqlite_coordinator(&temp_file, OfflineGateway);
            assert_eq!(sync.save_profile(profile.clone()).await, profile);
        }

        let sync = sqlite_coordinator(&temp_file, OfflineGateway);
        assert_eq!(sync.load_profile().await, profile);
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_cache() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let sync = sqlite_coordinator(&temp_file, MemoryGateway::new());

        sync.add_log(log_on(1, 100.0, 150.0)).await;
        sync.add_log(log_on(2, 150.0, 190.0)).await;
        let before = sync.cached_logs();

        let added = sync.add_log(log_on(3, 190.0, 240.0)).await;
        assert_eq!(sync.cached_logs()[0].id, added.id);

        sync.remove_log(&added.id).await;
        assert_eq!(sync.cached_logs(), before);
        assert!(sync.gateway().logs().iter().all(|l| l.id != added.id));
    }

    #[tokio::test]
    async fn test_pending_logs_survive_refresh_and_flush() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let remote = MemoryGateway::new().with_logs(vec![log_on(1, 100.0, 150.0)]);
        let sync = sqlite_coordinator(&temp_file, remote);

        sync.gateway().set_available(false);
        let offline = sync.add_log(log_on(2, 150.0, 200.0)).await;
        assert_eq!(sync.pending_count(), 1);

        sync.gateway().set_available(true);
        let logs = sync.list_logs().await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].id, offline.id);

        let report = sync.flush_pending().await;
        assert_eq!(report, FlushReport { pushed: 1, still_pending: 0 });
        assert_eq!(sync.pending_count(), 0);
        assert_eq!(sync.gateway().logs().len(), 2);
    }

    #[tokio::test]
    async fn test_end_to_end_summary_and_oil_alert() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let sync = sqlite_coordinator(&temp_file, OfflineGateway);

        sync.save_profile(VehicleProfile {
            fuel_price_per_liter: Some(6.0),
            last_oil_change_odometer: Some(100.0),
            ..VehicleProfile::default()
        })
        .await;
        sync.add_log(log_on(1, 5100.0, 5150.0)).await;

        let logs = sync.list_logs().await;
        let profile = sync.load_profile().await;

        let summary = aggregate_window(&logs, &profile, 7);
        assert_eq!(summary.total_km, 50.0);
        assert_eq!(summary.real_km_per_liter, Some(12.5));
        assert_eq!(summary.real_cost, Some(24.0));

        let status = OilChangeStatus::evaluate(&profile, &logs);
        assert_eq!(status.km_since_change, Some(5050.0));
        assert_eq!(status.severity, Some(Severity::Leve));
    }
}
