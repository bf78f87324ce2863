/// Tools for recording and deleting daily usage logs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{DailyUsageLog, FuelRefuelEntry, LogId};
use crate::metrics::DayMetrics;
use crate::remote::RemoteGateway;
use crate::storage::CacheStore;
use crate::sync::SyncCoordinator;
use crate::tools::{format_money, parse_date, ToolError};

/// A fill-up during the day
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RefuelParams {
    /// Liters added
    pub liters: f64,
    pub note: Option<String>,
}

/// Parameters for recording a day of vehicle use
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddLogParams {
    /// Day of use (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    /// Odometer at the start of the day
    pub odometer_start: f64,
    /// Odometer at the end of the day
    pub odometer_end: f64,
    /// Estimated liters in the tank at the start of the day
    pub fuel_start_liters: f64,
    /// Liters in the tank at the end of the day, if measured
    pub fuel_end_liters: Option<f64>,
    /// Fill-ups, most recent first
    #[serde(default)]
    pub refuels: Vec<RefuelParams>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLogResponse {
    pub log: DailyUsageLog,
    pub metrics: DayMetrics,
    /// Logs recorded locally that the backend has not accepted yet
    pub pending_sync: usize,
    pub message: String,
}

/// Parameters for deleting a log
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemoveLogParams {
    pub log_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLogResponse {
    pub log_id: LogId,
    pub message: String,
}

/// Record a day of use and report its metrics
pub async fn add_log<C: CacheStore, G: RemoteGateway>(
    sync: &SyncCoordinator<C, G>,
    params: AddLogParams,
) -> Result<AddLogResponse, ToolError> {
    let date = parse_date(params.date.as_deref())?;

    let refuels = params
        .refuels
        .into_iter()
        .map(|r| FuelRefuelEntry::new(r.liters, r.note))
        .collect::<Result<Vec<_>, _>>()?;

    let log = DailyUsageLog::new(
        date,
        params.odometer_start,
        params.odometer_end,
        params.fuel_start_liters,
        params.fuel_end_liters,
        refuels,
        params.notes,
    )?;

    let saved = sync.add_log(log).await;
    let profile = sync.load_profile().await;
    let metrics = DayMetrics::compute(&saved, &profile);
    let pending_sync = sync.pending_count();

    let mut message = format!(
        "⛽ Logged {:.0} km on {}\n   Expected fuel: {:.2} l ({})",
        metrics.distance_km,
        saved.date_iso,
        metrics.expected_fuel_used,
        format_money(metrics.expected_cost),
    );
    if let Some(real) = metrics.real_fuel_used {
        message.push_str(&format!(
            "\n   Real fuel: {:.2} l ({})",
            real,
            format_money(metrics.real_cost)
        ));
    }
    if pending_sync > 0 {
        message.push_str(&format!(
            "\n   📴 {} log{} saved offline, waiting to sync",
            pending_sync,
            if pending_sync == 1 { "" } else { "s" }
        ));
    }

    Ok(AddLogResponse {
        log: saved,
        metrics,
        pending_sync,
        message,
    })
}

/// Delete a log by id
pub async fn remove_log<C: CacheStore, G: RemoteGateway>(
    sync: &SyncCoordinator<C, G>,
    params: RemoveLogParams,
) -> Result<RemoveLogResponse, ToolError> {
    let id = params.log_id.trim();
    if id.is_empty() {
        return Err(ToolError::InvalidInput("Log ID cannot be empty".to_string()));
    }

    let log_id = sync.remove_log(&LogId::from(id)).await;
    Ok(RemoveLogResponse {
        message: format!("🗑️ Removed log {}", log_id),
        log_id,
    })
}
