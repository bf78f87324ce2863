/// Vehicle profile entity
///
/// The profile is a singleton per operator: average fuel economy, fuel price
/// and the odometer reading of the last oil change. It is created with
/// defaults on first read and overwritten by explicit saves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::lenient;
use crate::domain::DomainError;

/// Fuel economy assumed when none is configured
pub const DEFAULT_KM_PER_LITER: f64 = 30.0;

/// Per-operator vehicle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleProfile {
    /// Average km driven per liter; always positive once normalized
    pub fuel_economy_km_per_liter: f64,
    /// Price of one liter of fuel, if the operator configured it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_price_per_liter: Option<f64>,
    /// Informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tank_capacity_liters: Option<f64>,
    /// Odometer reading at the last oil change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_oil_change_odometer: Option<f64>,
    /// Informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_oil_change_date: Option<String>,
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self {
            fuel_economy_km_per_liter: DEFAULT_KM_PER_LITER,
            fuel_price_per_liter: None,
            tank_capacity_liters: None,
            last_oil_change_odometer: None,
            last_oil_change_date: None,
        }
    }
}

impl VehicleProfile {
    /// Build a profile from an untrusted JSON document
    ///
    /// Every field is read on its own: a missing or invalid value falls back
    /// to its default instead of rejecting the document. Only a payload that
    /// is not a JSON object at all is refused.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let last_oil_change_odometer = obj
            .get("lastOilChangeOdometer")
            .and_then(lenient::number)
            .filter(|n| *n >= 0.0);

        let last_oil_change_date = obj
            .get("lastOilChangeDate")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            fuel_economy_km_per_liter: lenient::positive(obj.get("fuelEconomyKmPerLiter"))
                .unwrap_or(DEFAULT_KM_PER_LITER),
            fuel_price_per_liter: lenient::positive(obj.get("fuelPricePerLiter")),
            tank_capacity_liters: lenient::positive(obj.get("tankCapacityLiters")),
            last_oil_change_odometer,
            last_oil_change_date,
        })
    }

    /// Apply defaults to any missing or invalid value
    pub fn normalized(self) -> Self {
        let positive = |v: Option<f64>| v.filter(|n| n.is_finite() && *n > 0.0);

        Self {
            fuel_economy_km_per_liter: self.km_per_liter(),
            fuel_price_per_liter: positive(self.fuel_price_per_liter),
            tank_capacity_liters: positive(self.tank_capacity_liters),
            last_oil_change_odometer: self
                .last_oil_change_odometer
                .filter(|n| n.is_finite() && *n >= 0.0),
            last_oil_change_date: self.last_oil_change_date.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Fuel economy to use for derivations, substituting the default
    pub fn km_per_liter(&self) -> f64 {
        let kml = self.fuel_economy_km_per_liter;
        if kml.is_finite() && kml > 0.0 {
            kml
        } else {
            DEFAULT_KM_PER_LITER
        }
    }

    /// Check values an operator is about to save
    pub fn validate(&self) -> Result<(), DomainError> {
        let kml = self.fuel_economy_km_per_liter;
        if !kml.is_finite() || kml <= 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Fuel economy must be greater than 0 km/l".to_string(),
            });
        }

        Self::validate_optional_positive("Fuel price", self.fuel_price_per_liter)?;
        Self::validate_optional_positive("Tank capacity", self.tank_capacity_liters)?;

        if let Some(odometer) = self.last_oil_change_odometer {
            if !odometer.is_finite() || odometer < 0.0 {
                return Err(DomainError::InvalidValue {
                    message: "Oil change odometer cannot be negative".to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_optional_positive(field: &str, value: Option<f64>) -> Result<(), DomainError> {
        match value {
            Some(v) if !v.is_finite() || v <= 0.0 => Err(DomainError::InvalidValue {
                message: format!("{} must be greater than 0", field),
            }),
            _ => Ok(()),
        }
    }
}
