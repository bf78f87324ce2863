/// Tools for the oil change alert

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::maintenance::{current_odometer, register_oil_change, OilChangeStatus};
use crate::remote::RemoteGateway;
use crate::storage::CacheStore;
use crate::sync::SyncCoordinator;
use crate::tools::{parse_date, ToolError};

/// Parameters for registering an oil change
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RegisterOilChangeParams {
    /// Odometer at the change; defaults to the latest log's final odometer
    pub odometer: Option<f64>,
    /// Date of the change (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OilStatusResponse {
    pub status: OilChangeStatus,
    pub message: String,
}

/// Evaluate how urgent the next oil change is
pub async fn oil_status<C: CacheStore, G: RemoteGateway>(
    sync: &SyncCoordinator<C, G>,
) -> OilStatusResponse {
    let logs = sync.list_logs().await;
    let profile = sync.load_profile().await;
    let status = OilChangeStatus::evaluate(&profile, &logs);
    let message = status.message();
    OilStatusResponse { status, message }
}

/// Mark an oil change at the current odometer
pub async fn register_oil_change_now<C: CacheStore, G: RemoteGateway>(
    sync: &SyncCoordinator<C, G>,
    params: RegisterOilChangeParams,
) -> Result<OilStatusResponse, ToolError> {
    let date = parse_date(params.date.as_deref())?;
    let logs = sync.list_logs().await;

    let odometer = match params.odometer.or_else(|| current_odometer(&logs)) {
        Some(odometer) if odometer.is_finite() && odometer >= 0.0 => odometer,
        Some(_) => {
            return Err(ToolError::InvalidInput("Odometer cannot be negative".to_string()))
        }
        None => {
            return Err(ToolError::InvalidInput(
                "No daily logs yet; pass the odometer reading explicitly".to_string(),
            ))
        }
    };

    let profile = sync.load_profile().await;
    let saved = sync
        .save_profile(register_oil_change(&profile, odometer, Some(date)))
        .await;

    let status = OilChangeStatus::evaluate(&saved, &logs);
    let message = format!("🔧 Oil change registered at {} km\n{}", odometer, status.message());
    Ok(OilStatusResponse { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DailyUsageLog, LogId, VehicleProfile};
    use crate::maintenance::Severity;
    use crate::remote::MemoryGateway;
    use crate::storage::MemoryCache;
    use chrono::NaiveDate;

    fn log_ending_at(odometer_end: f64) -> DailyUsageLog {
        DailyUsageLog {
            id: LogId::new(),
            date_iso: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            odometer_start: odometer_end - 30.0,
            odometer_end,
            fuel_start_liters: 2.0,
            fuel_end_liters: None,
            refuels: vec![],
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_register_resets_severity() {
        let remote = MemoryGateway::new()
            .with_profile(VehicleProfile {
                last_oil_change_odometer: Some(1000.0),
                ..VehicleProfile::default()
            })
            .with_logs(vec![log_ending_at(11500.0)]);
        let sync = SyncCoordinator::new(MemoryCache::new(), remote);

        assert_eq!(oil_status(&sync).await.status.severity, Some(Severity::Critico));

        let response = register_oil_change_now(&sync, RegisterOilChangeParams::default())
            .await
            .unwrap();
        assert_eq!(response.status.severity, Some(Severity::Ok));
        assert_eq!(
            sync.gateway().profile().unwrap().last_oil_change_odometer,
            Some(11500.0)
        );
    }

    #[tokio::test]
    async fn test_register_without_logs_needs_odometer() {
        let sync = SyncCoordinator::new(MemoryCache::new(), MemoryGateway::new());
        let result = register_oil_change_now(&sync, RegisterOilChangeParams::default()).await;
        assert!(result.is_err());

        let result = register_oil_change_now(&sync, RegisterOilChangeParams {
            odometer: Some(4200.0),
            date: Some("2024-05-01".to_string()),
        })
        .await
        .unwrap();
        assert_eq!(result.status.severity, None);
    }
}
