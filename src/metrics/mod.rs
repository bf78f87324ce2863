/// Fuel-economy and cost metrics derived from logs and the profile
///
/// Every function here is pure and total: malformed numbers (NaN, negative,
/// infinite) read as zero or absent, and every division checks its
/// denominator so no NaN or Infinity ever reaches a rate or currency display.

use serde::Serialize;

use crate::domain::{DailyUsageLog, FuelRefuelEntry, VehicleProfile};

/// Clamp a raw reading to a usable non-negative value
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Distance covered between two odometer readings
///
/// An inverted pair (end below start) clamps to 0.
pub fn distance_km(odometer_start: f64, odometer_end: f64) -> f64 {
    (sanitize(odometer_end) - sanitize(odometer_start)).max(0.0)
}

/// Total liters added across refuel entries
pub fn sum_refuels(entries: &[FuelRefuelEntry]) -> f64 {
    entries.iter().map(|e| sanitize(e.liters)).sum()
}

/// Fuel the day should have used at the profile's average economy
pub fn expected_fuel_used(distance_km: f64, km_per_liter: f64) -> f64 {
    let distance = sanitize(distance_km);
    let kml = sanitize(km_per_liter);
    if distance > 0.0 && kml > 0.0 {
        distance / kml
    } else {
        0.0
    }
}

/// Fuel actually used according to tank bookkeeping
///
/// `None` means the end level was not recorded, which is different from
/// zero consumption. A tank that appears to have gained fuel clamps to 0.
pub fn real_fuel_used(fuel_start: f64, fuel_added: f64, fuel_end: Option<f64>) -> Option<f64> {
    let fuel_end = sanitize(fuel_end?);
    let used = sanitize(fuel_start) + sanitize(fuel_added) - fuel_end;
    Some(if used > 0.0 { used } else { 0.0 })
}

/// Real economy for a day, when real consumption is known and positive
pub fn real_km_per_liter(distance_km: f64, real_fuel_used: Option<f64>) -> Option<f64> {
    match real_fuel_used {
        Some(used) if used.is_finite() && used > 0.0 => Some(sanitize(distance_km) / used),
        _ => None,
    }
}

/// Cost of an amount of fuel; unknown without a configured price
pub fn estimated_cost(liters: f64, price_per_liter: Option<f64>) -> Option<f64> {
    match price_per_liter {
        Some(price) if price.is_finite() && price > 0.0 => Some(sanitize(liters) * price),
        _ => None,
    }
}

/// Everything the UI shows for a single day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMetrics {
    pub distance_km: f64,
    pub refueled_liters: f64,
    pub expected_fuel_used: f64,
    pub real_fuel_used: Option<f64>,
    pub real_km_per_liter: Option<f64>,
    pub expected_cost: Option<f64>,
    pub real_cost: Option<f64>,
}

impl DayMetrics {
    pub fn compute(log: &DailyUsageLog, profile: &VehicleProfile) -> Self {
        let distance = distance_km(log.odometer_start, log.odometer_end);
        let refueled = sum_refuels(&log.refuels);
        let expected = expected_fuel_used(distance, profile.km_per_liter());
        let real = real_fuel_used(log.fuel_start_liters, refueled, log.fuel_end_liters);
        let price = profile.fuel_price_per_liter;

        Self {
            distance_km: distance,
            refueled_liters: refueled,
            expected_fuel_used: expected,
            real_fuel_used: real,
            real_km_per_liter: real_km_per_liter(distance, real),
            expected_cost: estimated_cost(expected, price),
            real_cost: real.and_then(|liters| estimated_cost(liters, price)),
        }
    }
}

/// Totals and averages over the most recent logs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    pub total_km: f64,
    pub total_expected_liters: f64,
    pub total_real_liters: f64,
    pub expected_km_per_liter: Option<f64>,
    /// Average over the logs that had a real sample only
    pub real_km_per_liter: Option<f64>,
    pub real_sample_count: usize,
    pub expected_cost: Option<f64>,
    pub real_cost: Option<f64>,
}

/// Aggregate the first `window_size` logs
///
/// The slice must already be most-recent-first (the sync coordinator
/// guarantees this); it is not re-sorted here.
pub fn aggregate_window(
    logs: &[DailyUsageLog],
    profile: &VehicleProfile,
    window_size: usize,
) -> WindowSummary {
    let kml = profile.km_per_liter();

    let mut total_km = 0.0;
    let mut total_expected = 0.0;
    let mut total_real = 0.0;
    let mut real_km = 0.0;
    let mut real_samples = 0;

    for log in logs.iter().take(window_size) {
        let distance = distance_km(log.odometer_start, log.odometer_end);
        total_km += distance;
        total_expected += expected_fuel_used(distance, kml);

        let added = sum_refuels(&log.refuels);
        if let Some(real) = real_fuel_used(log.fuel_start_liters, added, log.fuel_end_liters) {
            total_real += real;
            real_km += distance;
            real_samples += 1;
        }
    }

    let ratio = |km: f64, liters: f64| (liters > 0.0).then(|| km / liters);
    let price = profile.fuel_price_per_liter;

    WindowSummary {
        total_km,
        total_expected_liters: total_expected,
        total_real_liters: total_real,
        expected_km_per_liter: ratio(total_km, total_expected),
        real_km_per_liter: ratio(real_km, total_real),
        real_sample_count: real_samples,
        expected_cost: estimated_cost(total_expected, price),
        real_cost: if real_samples > 0 {
            estimated_cost(total_real, price)
        } else {
            None
        },
    }
}
