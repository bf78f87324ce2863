/// Tool for listing recent daily logs with their metrics

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::LogId;
use crate::metrics::DayMetrics;
use crate::remote::RemoteGateway;
use crate::storage::CacheStore;
use crate::sync::SyncCoordinator;
use crate::tools::format_rate;

const DEFAULT_LIMIT: usize = 10;

/// Parameters for listing logs
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListLogsParams {
    /// Maximum number of logs to show, most recent first (default 10)
    pub limit: Option<usize>,
}

/// One log in the listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    pub log_id: LogId,
    pub date: NaiveDate,
    pub odometer_start: f64,
    pub odometer_end: f64,
    pub refuel_count: usize,
    pub metrics: DayMetrics,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLogsResponse {
    pub logs: Vec<LogSummary>,
    pub total_logs: usize,
    pub message: String,
}

/// List the most recent logs
pub async fn list_logs<C: CacheStore, G: RemoteGateway>(
    sync: &SyncCoordinator<C, G>,
    params: ListLogsParams,
) -> ListLogsResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    let logs = sync.list_logs().await;
    let profile = sync.load_profile().await;

    let summaries: Vec<LogSummary> = logs
        .iter()
        .take(limit)
        .map(|log| LogSummary {
            log_id: log.id.clone(),
            date: log.date_iso,
            odometer_start: log.odometer_start,
            odometer_end: log.odometer_end,
            refuel_count: log.refuels.len(),
            metrics: DayMetrics::compute(log, &profile),
            notes: log.notes.clone(),
        })
        .collect();

    let message = if summaries.is_empty() {
        "No daily logs yet. Record your first day of riding to get started!".to_string()
    } else {
        let header = format!("📋 Showing {} of {} logs\n\n", summaries.len(), logs.len());
        let lines = summaries
            .iter()
            .map(|s| {
                format!(
                    "📅 {} ({})\n   🛣️ {:.0} km | odometer {} → {} | ⛽ {} refuel{} | real {}",
                    s.date,
                    s.log_id,
                    s.metrics.distance_km,
                    s.odometer_start,
                    s.odometer_end,
                    s.refuel_count,
                    if s.refuel_count == 1 { "" } else { "s" },
                    format_rate(s.metrics.real_km_per_liter),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{}{}", header, lines)
    };

    ListLogsResponse {
        total_logs: logs.len(),
        logs: summaries,
        message,
    }
}
