/// Tool for fuel-economy and cost totals over recent days

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::metrics::{aggregate_window, WindowSummary};
use crate::remote::RemoteGateway;
use crate::storage::CacheStore;
use crate::sync::SyncCoordinator;
use crate::tools::{format_money, format_rate};

const DEFAULT_WINDOW: usize = 7;

/// Parameters for the usage summary
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SummaryParams {
    /// Number of most recent logs to aggregate (default 7)
    pub window: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub window: usize,
    pub summary: WindowSummary,
    pub message: String,
}

/// Aggregate the most recent logs
pub async fn usage_summary<C: CacheStore, G: RemoteGateway>(
    sync: &SyncCoordinator<C, G>,
    params: SummaryParams,
) -> SummaryResponse {
    let window = params.window.unwrap_or(DEFAULT_WINDOW).max(1);
    let logs = sync.list_logs().await;
    let profile = sync.load_profile().await;
    let summary = aggregate_window(&logs, &profile, window);

    let used = window.min(logs.len());
    let message = if used == 0 {
        "No daily logs yet, nothing to summarize.".to_string()
    } else {
        let mut lines = vec![
            format!("📊 Last {} day{} of use", used, if used == 1 { "" } else { "s" }),
            format!("🛣️ Distance: {:.0} km", summary.total_km),
            format!(
                "⛽ Expected: {:.2} l at {} ({})",
                summary.total_expected_liters,
                format_rate(summary.expected_km_per_liter),
                format_money(summary.expected_cost),
            ),
        ];
        if summary.real_sample_count > 0 {
            lines.push(format!(
                "📏 Real: {:.2} l at {} ({}) from {} measured day{}",
                summary.total_real_liters,
                format_rate(summary.real_km_per_liter),
                format_money(summary.real_cost),
                summary.real_sample_count,
                if summary.real_sample_count == 1 { "" } else { "s" },
            ));
        } else {
            lines.push("📏 Real consumption unknown: record the tank level at the end of the day".to_string());
        }
        lines.join("\n")
    };

    SummaryResponse {
        window,
        summary,
        message,
    }
}
