/// Basic unit tests to verify core functionality
use chrono::NaiveDate;
use moto_tracker_mcp::maintenance::{self, OilChangeStatus, Severity};
use moto_tracker_mcp::metrics::{self, DayMetrics};
use moto_tracker_mcp::*;
use serde_json::json;
use tempfile::NamedTempFile;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_log_creation() {
        let refuel = FuelRefuelEntry::new(2.0, Some("Posto Shell".to_string())).unwrap();
        let log = DailyUsageLog::new(day(1), 100.0, 150.0, 3.0, Some(1.0), vec![refuel], None);

        assert!(log.is_ok());
        let log = log.unwrap();
        assert_eq!(log.refuels.len(), 1);
        assert!(log.has_fuel_end());
    }

    #[test]
    fn test_log_rejects_backwards_odometer() {
        let log = DailyUsageLog::new(day(1), 150.0, 100.0, 3.0, None, vec![], None);
        assert!(log.is_err());
    }

    #[test]
    fn test_log_parses_backend_document() {
        let log: DailyUsageLog = serde_json::from_value(json!({
            "id": "abc",
            "dateISO": "2024-05-01T12:00:00.000Z",
            "odometerStart": "100",
            "odometerEnd": 150,
            "fuelStartLiters": 3,
            "refuels": []
        }))
        .unwrap();

        assert_eq!(log.date_iso, day(1));
        assert_eq!(log.odometer_start, 100.0);
        assert_eq!(log.fuel_end_liters, None);
    }

    #[test]
    fn test_profile_from_partial_json() {
        let profile = VehicleProfile::from_json(&json!({"fuelPricePerLiter": 6.0})).unwrap();
        assert_eq!(profile.fuel_economy_km_per_liter, DEFAULT_KM_PER_LITER);
        assert_eq!(profile.fuel_price_per_liter, Some(6.0));

        assert!(VehicleProfile::from_json(&json!("nope")).is_none());
    }

    #[test]
    fn test_day_metrics_for_sample_day() {
        let refuel = FuelRefuelEntry::new(2.0, None).unwrap();
        let log = DailyUsageLog::new(day(1), 100.0, 150.0, 3.0, Some(1.0), vec![refuel], None).unwrap();
        let profile = VehicleProfile::default();

        let m = DayMetrics::compute(&log, &profile);
        assert_eq!(m.distance_km, 50.0);
        assert!((m.expected_fuel_used - 50.0 / 30.0).abs() < 1e-9);
        assert_eq!(m.real_fuel_used, Some(4.0));
        assert_eq!(m.real_km_per_liter, Some(12.5));
        assert_eq!(m.expected_cost, None);
    }

    #[test]
    fn test_metric_edge_cases() {
        assert_eq!(metrics::distance_km(200.0, 150.0), 0.0);
        assert_eq!(metrics::expected_fuel_used(100.0, 0.0), 0.0);
        assert_eq!(metrics::real_fuel_used(10.0, 5.0, Some(20.0)), Some(0.0));
        assert_eq!(metrics::real_fuel_used(10.0, 5.0, None), None);
        assert_eq!(metrics::real_km_per_liter(50.0, Some(0.0)), None);
    }

    #[test]
    fn test_empty_window() {
        let summary = metrics::aggregate_window(&[], &VehicleProfile::default(), 7);
        assert_eq!(summary.total_km, 0.0);
        assert_eq!(summary.expected_km_per_liter, None);
        assert_eq!(summary.real_km_per_liter, None);
    }

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(maintenance::severity(4999.0), Severity::Ok);
        assert_eq!(maintenance::severity(5000.0), Severity::Leve);
        assert_eq!(maintenance::severity(7000.0), Severity::Moderado);
        assert_eq!(maintenance::severity(10000.0), Severity::Critico);
        assert_eq!(maintenance::km_since_last_oil_change(Some(5000.0), Some(6000.0)), None);
    }

    #[test]
    fn test_oil_status_without_logs() {
        let profile = VehicleProfile {
            last_oil_change_odometer: Some(1000.0),
            ..VehicleProfile::default()
        };
        let status = OilChangeStatus::evaluate(&profile, &[]);
        assert_eq!(status.severity, None);
    }

    #[tokio::test]
    async fn test_tracker_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let tracker = MotoTracker::new(EngineConfig::new(temp_file.path().to_path_buf())).await;
        assert!(tracker.is_ok());
    }

    #[test]
    fn test_cache_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let cache = SqliteCache::new(temp_file.path().to_path_buf());
        assert!(cache.is_ok());

        let cache = cache.unwrap();
        assert!(cache.read(CacheKey::Logs).unwrap().is_none());
    }
}
