/// Daily usage log and refuel entries
///
/// A DailyUsageLog is one day of vehicle use: odometer at the start and end
/// of the day, the estimated tank level, and any fill-ups. Logs are
/// immutable once created; they are only ever added or deleted.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::lenient;
use crate::domain::{DomainError, LogId, RefuelId};

/// One fill-up event inside a daily log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelRefuelEntry {
    pub id: RefuelId,
    /// Liters added; missing or non-numeric values read as 0
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub liters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FuelRefuelEntry {
    /// Create a refuel entry with validation
    pub fn new(liters: f64, note: Option<String>) -> Result<Self, DomainError> {
        if !liters.is_finite() || liters <= 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Refuel liters must be greater than 0".to_string(),
            });
        }
        validate_text("Refuel note", &note)?;

        Ok(Self {
            id: RefuelId::new(),
            liters,
            note,
        })
    }
}

/// One day of vehicle use as recorded by the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsageLog {
    pub id: LogId,
    /// Calendar day this log is for
    #[serde(rename = "dateISO", deserialize_with = "lenient::iso_date")]
    pub date_iso: NaiveDate,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub odometer_start: f64,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub odometer_end: f64,
    /// Estimated tank level at the start of the day
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub fuel_start_liters: f64,
    /// Tank level at the end of the day; enables real consumption
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub fuel_end_liters: Option<f64>,
    /// Most recent refuel first by convention
    #[serde(default)]
    pub refuels: Vec<FuelRefuelEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DailyUsageLog {
    /// Create a new log with the checks the operator form applies on submit
    ///
    /// The odometer must advance during the day and tank levels cannot be
    /// negative. The metrics functions still clamp bad values, since logs
    /// written by other clients never went through this constructor.
    pub fn new(
        date_iso: NaiveDate,
        odometer_start: f64,
        odometer_end: f64,
        fuel_start_liters: f64,
        fuel_end_liters: Option<f64>,
        refuels: Vec<FuelRefuelEntry>,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_date(&date_iso)?;
        Self::validate_odometer(odometer_start, odometer_end)?;
        Self::validate_fuel(fuel_start_liters, fuel_end_liters)?;
        validate_text("Notes", &notes)?;

        Ok(Self {
            id: LogId::new(),
            date_iso,
            odometer_start,
            odometer_end,
            fuel_start_liters,
            fuel_end_liters,
            refuels,
            notes,
        })
    }

    /// Whether the tank level was recorded at the end of the day
    pub fn has_fuel_end(&self) -> bool {
        self.fuel_end_liters.is_some()
    }

    fn validate_date(date: &NaiveDate) -> Result<(), DomainError> {
        let today = Utc::now().naive_utc().date();

        if *date > today {
            return Err(DomainError::InvalidDate(
                "Cannot log vehicle use for future dates".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_odometer(start: f64, end: f64) -> Result<(), DomainError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Odometer readings must be non-negative numbers".to_string(),
            });
        }

        if end <= start {
            return Err(DomainError::InvalidValue {
                message: format!(
                    "Final odometer ({}) must be greater than the initial odometer ({})",
                    end, start
                ),
            });
        }

        Ok(())
    }

    fn validate_fuel(start: f64, end: Option<f64>) -> Result<(), DomainError> {
        if !start.is_finite() || start < 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Starting fuel cannot be negative".to_string(),
            });
        }

        if let Some(end) = end {
            if !end.is_finite() || end < 0.0 {
                return Err(DomainError::InvalidValue {
                    message: "Ending fuel cannot be negative".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn validate_text(field: &str, text: &Option<String>) -> Result<(), DomainError> {
    if let Some(text) = text {
        if text.len() > 500 {
            return Err(DomainError::InvalidValue {
                message: format!("{} cannot be longer than 500 characters", field),
            });
        }
    }
    Ok(())
}
