/// Tools for reading and updating the vehicle profile

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, VehicleProfile};
use crate::remote::RemoteGateway;
use crate::storage::CacheStore;
use crate::sync::SyncCoordinator;
use crate::tools::{format_money, ToolError};

/// Fields to change; omitted fields keep their current value
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateProfileParams {
    /// Average fuel economy in km per liter
    pub fuel_economy_km_per_liter: Option<f64>,
    /// Fuel price per liter
    pub fuel_price_per_liter: Option<f64>,
    /// Tank capacity in liters
    pub tank_capacity_liters: Option<f64>,
    /// Odometer reading at the last oil change
    pub last_oil_change_odometer: Option<f64>,
    /// Date of the last oil change (YYYY-MM-DD)
    pub last_oil_change_date: Option<String>,
    /// Optional fields to reset to "not set"
    #[serde(default)]
    pub clear: Vec<ProfileField>,
}

/// Profile fields that can be unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    FuelPricePerLiter,
    TankCapacityLiters,
    /// Both the odometer and the date of the last change
    LastOilChange,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: VehicleProfile,
    pub message: String,
}

fn describe(profile: &VehicleProfile) -> String {
    let mut lines = vec![
        format!("🏍️ Fuel economy: {:.1} km/l", profile.km_per_liter()),
        format!("⛽ Fuel price: {}", format_money(profile.fuel_price_per_liter)),
    ];
    if let Some(tank) = profile.tank_capacity_liters {
        lines.push(format!("🛢️ Tank: {:.1} l", tank));
    }
    match (profile.last_oil_change_odometer, &profile.last_oil_change_date) {
        (Some(odometer), Some(date)) => {
            lines.push(format!("🔧 Last oil change: {} km on {}", odometer, date))
        }
        (Some(odometer), None) => lines.push(format!("🔧 Last oil change: {} km", odometer)),
        _ => lines.push("🔧 No oil change registered".to_string()),
    }
    lines.join("\n")
}

/// Show the current profile
pub async fn get_profile<C: CacheStore, G: RemoteGateway>(
    sync: &SyncCoordinator<C, G>,
) -> ProfileResponse {
    let profile = sync.load_profile().await;
    let message = describe(&profile);
    ProfileResponse { profile, message }
}

/// Apply changes to the profile and save it
pub async fn update_profile<C: CacheStore, G: RemoteGateway>(
    sync: &SyncCoordinator<C, G>,
    params: UpdateProfileParams,
) -> Result<ProfileResponse, ToolError> {
    let UpdateProfileParams {
        fuel_economy_km_per_liter,
        fuel_price_per_liter,
        tank_capacity_liters,
        last_oil_change_odometer,
        last_oil_change_date,
        clear,
    } = params;

    if fuel_economy_km_per_liter.is_none()
        && fuel_price_per_liter.is_none()
        && tank_capacity_liters.is_none()
        && last_oil_change_odometer.is_none()
        && last_oil_change_date.is_none()
        && clear.is_empty()
    {
        return Err(DomainError::Validation {
            message: "Provide at least one profile field to update".to_string(),
        }
        .into());
    }

    let clears = |field: ProfileField| clear.contains(&field);
    let conflict = (clears(ProfileField::FuelPricePerLiter) && fuel_price_per_liter.is_some())
        || (clears(ProfileField::TankCapacityLiters) && tank_capacity_liters.is_some())
        || (clears(ProfileField::LastOilChange)
            && (last_oil_change_odometer.is_some() || last_oil_change_date.is_some()));
    if conflict {
        return Err(ToolError::InvalidInput(
            "A field cannot be set and cleared in the same update".to_string(),
        ));
    }

    let current = sync.load_profile().await;
    let mut next = VehicleProfile {
        fuel_economy_km_per_liter: fuel_economy_km_per_liter
            .unwrap_or(current.fuel_economy_km_per_liter),
        fuel_price_per_liter: fuel_price_per_liter.or(current.fuel_price_per_liter),
        tank_capacity_liters: tank_capacity_liters.or(current.tank_capacity_liters),
        last_oil_change_odometer: last_oil_change_odometer.or(current.last_oil_change_odometer),
        last_oil_change_date: last_oil_change_date.or(current.last_oil_change_date),
    };
    for field in &clear {
        match field {
            ProfileField::FuelPricePerLiter => next.fuel_price_per_liter = None,
            ProfileField::TankCapacityLiters => next.tank_capacity_liters = None,
            ProfileField::LastOilChange => {
                next.last_oil_change_odometer = None;
                next.last_oil_change_date = None;
            }
        }
    }
    next.validate()?;

    let saved = sync.save_profile(next).await;
    let message = format!("✅ Profile saved\n{}", describe(&saved));
    Ok(ProfileResponse { profile: saved, message })
}
