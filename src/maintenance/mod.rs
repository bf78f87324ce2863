/// Oil-change urgency classification
///
/// Severity is a pure function of the kilometers driven since the last oil
/// change. The current odometer is the `odometerEnd` of the most recent log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DailyUsageLog, VehicleProfile};

/// Lower bound (inclusive) of each non-ok severity level, in km
pub const LEVE_KM: f64 = 5000.0;
pub const MODERADO_KM: f64 = 7000.0;
pub const CRITICO_KM: f64 = 10000.0;

/// Four-level oil change urgency, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Leve,
    Moderado,
    Critico,
}

impl Severity {
    /// Wire name of the level
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Leve => "leve",
            Severity::Moderado => "moderado",
            Severity::Critico => "critico",
        }
    }

    /// Short sentence shown next to the level
    pub fn message(&self) -> &'static str {
        match self {
            Severity::Ok => "Oil is fine, no service needed yet.",
            Severity::Leve => "Oil change coming up, plan a service soon.",
            Severity::Moderado => "Oil change overdue, schedule it this week.",
            Severity::Critico => "Oil change critical, service the engine now.",
        }
    }

    /// Kilometer mark where the next level starts, if there is one
    pub fn next_threshold(&self) -> Option<f64> {
        match self {
            Severity::Ok => Some(LEVE_KM),
            Severity::Leve => Some(MODERADO_KM),
            Severity::Moderado => Some(CRITICO_KM),
            Severity::Critico => None,
        }
    }
}

/// Kilometers driven since the last oil change
///
/// `None` when the last change is unknown, or when the current reading is
/// below it (a stale service record, e.g. after a data reset).
pub fn km_since_last_oil_change(
    current_odometer: Option<f64>,
    last_oil_change_odometer: Option<f64>,
) -> Option<f64> {
    let current = current_odometer.filter(|n| n.is_finite())?;
    let last = last_oil_change_odometer.filter(|n| n.is_finite())?;
    let delta = current - last;
    (delta >= 0.0).then_some(delta)
}

/// Classify kilometers since the last change
///
/// Each threshold is inclusive at its lower bound.
pub fn severity(km_since_last_oil_change: f64) -> Severity {
    let km = km_since_last_oil_change;
    if km >= CRITICO_KM {
        Severity::Critico
    } else if km >= MODERADO_KM {
        Severity::Moderado
    } else if km >= LEVE_KM {
        Severity::Leve
    } else {
        Severity::Ok
    }
}

/// Current odometer: the end reading of the most recent log
///
/// Expects the most-recent-first ordering the sync coordinator returns.
pub fn current_odometer(logs: &[DailyUsageLog]) -> Option<f64> {
    logs.first().map(|log| log.odometer_end)
}

/// Overwrite the service point with the current odometer
///
/// Saving the returned profile resets the severity to `ok`.
pub fn register_oil_change(
    profile: &VehicleProfile,
    current_odometer: f64,
    date: Option<NaiveDate>,
) -> VehicleProfile {
    VehicleProfile {
        last_oil_change_odometer: Some(current_odometer),
        last_oil_change_date: date.map(|d| d.to_string()),
        ..profile.clone()
    }
}

/// Oil change state as shown to the operator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OilChangeStatus {
    pub current_odometer: Option<f64>,
    pub last_oil_change_odometer: Option<f64>,
    pub km_since_change: Option<f64>,
    /// `None` when the distance cannot be classified
    pub severity: Option<Severity>,
    pub km_to_next_level: Option<f64>,
}

impl OilChangeStatus {
    pub fn evaluate(profile: &VehicleProfile, logs: &[DailyUsageLog]) -> Self {
        let current = current_odometer(logs);
        let km_since = km_since_last_oil_change(current, profile.last_oil_change_odometer);
        let level = km_since.map(severity);
        let km_to_next = match (km_since, level.and_then(|s| s.next_threshold())) {
            (Some(km), Some(threshold)) => Some(threshold - km),
            _ => None,
        };

        Self {
            current_odometer: current,
            last_oil_change_odometer: profile.last_oil_change_odometer,
            km_since_change: km_since,
            severity: level,
            km_to_next_level: km_to_next,
        }
    }

    /// Human readable summary line
    pub fn message(&self) -> String {
        match (self.severity, self.km_since_change) {
            (Some(level), Some(km)) => format!(
                "🛢️ {} km since last oil change [{}]. {}",
                km.round(),
                level.label(),
                level.message()
            ),
            _ if self.last_oil_change_odometer.is_none() => {
                "No oil change registered yet. Register one to start tracking.".to_string()
            }
            _ if self.current_odometer.is_none() => {
                "No daily logs yet, current odometer is unknown.".to_string()
            }
            _ => "Last oil change reading is above the current odometer; register the change again."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LogId;

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(severity(0.0), Severity::Ok);
        assert_eq!(severity(4999.0), Severity::Ok);
        assert_eq!(severity(5000.0), Severity::Leve);
        assert_eq!(severity(6999.0), Severity::Leve);
        assert_eq!(severity(7000.0), Severity::Moderado);
        assert_eq!(severity(9999.0), Severity::Moderado);
        assert_eq!(severity(10000.0), Severity::Critico);
        assert_eq!(severity(250000.0), Severity::Critico);
    }

    #[test]
    fn test_severity_is_ordered() {
        assert!(Severity::Ok < Severity::Leve);
        assert!(Severity::Moderado < Severity::Critico);
        assert_eq!(serde_json::to_value(Severity::Critico).unwrap(), "critico");
    }

    #[test]
    fn test_km_since_rejects_negative_delta() {
        assert_eq!(km_since_last_oil_change(Some(5000.0), Some(6000.0)), None);
        assert_eq!(km_since_last_oil_change(Some(6000.0), Some(6000.0)), Some(0.0));
        assert_eq!(km_since_last_oil_change(Some(12000.0), Some(5000.0)), Some(7000.0));
        assert_eq!(km_since_last_oil_change(Some(12000.0), None), None);
        assert_eq!(km_since_last_oil_change(None, Some(1.0)), None);
    }

    fn log_ending_at(odometer_end: f64) -> DailyUsageLog {
        DailyUsageLog {
            id: LogId::new(),
            date_iso: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            odometer_start: odometer_end - 10.0,
            odometer_end,
            fuel_start_liters: 1.0,
            fuel_end_liters: None,
            refuels: vec![],
            notes: None,
        }
    }

    #[test]
    fn test_status_and_register_reset() {
        let profile = VehicleProfile {
            last_oil_change_odometer: Some(10000.0),
            ..VehicleProfile::default()
        };
        let logs = vec![log_ending_at(17500.0), log_ending_at(17000.0)];

        let status = OilChangeStatus::evaluate(&profile, &logs);
        assert_eq!(status.current_odometer, Some(17500.0));
        assert_eq!(status.km_since_change, Some(7500.0));
        assert_eq!(status.severity, Some(Severity::Moderado));
        assert_eq!(status.km_to_next_level, Some(2500.0));

        let serviced = register_oil_change(&profile, 17500.0, NaiveDate::from_ymd_opt(2024, 5, 1));
        let status = OilChangeStatus::evaluate(&serviced, &logs);
        assert_eq!(status.severity, Some(Severity::Ok));
        assert_eq!(serviced.last_oil_change_date.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_status_without_data() {
        let status = OilChangeStatus::evaluate(&VehicleProfile::default(), &[]);
        assert_eq!(status.severity, None);
        assert!(status.message().contains("No oil change registered"));
    }
}
