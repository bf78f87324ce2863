/// Domain module containing the vehicle tracking data model
///
/// This module defines the core entities (VehicleProfile, DailyUsageLog,
/// FuelRefuelEntry) and the validation rules applied when an operator
/// submits them.

pub mod log;
pub mod profile;
pub mod types;

// Re-export public types for easy access
pub use log::*;
pub use profile::*;
pub use types::{LogId, RefuelId};

use thiserror::Error;

/// Errors that can occur while validating operator input
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
