/// MCP tool implementations
///
/// Each tool is a thin caller of the engine: it validates arguments, calls
/// the sync coordinator, and runs the metrics and maintenance functions over
/// the data it loaded.

pub mod flush;
pub mod list;
pub mod log;
pub mod oil;
pub mod profile;
pub mod summary;

// Re-export tool functions
pub use flush::*;
pub use list::*;
pub use log::*;
pub use oil::*;
pub use profile::*;
pub use summary::*;

use chrono::{NaiveDate, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::DomainError;

/// Errors a tool reports back to the MCP client
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Domain(#[from] DomainError),
}

/// Parameters for tools that take no arguments
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Parse a `YYYY-MM-DD` date, defaulting to today
fn parse_date(raw: Option<&str>) -> Result<NaiveDate, ToolError> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| ToolError::InvalidInput(format!("Invalid date '{}', expected YYYY-MM-DD", s))),
        None => Ok(Utc::now().naive_utc().date()),
    }
}

/// Render an optional amount of money; unknown prices never show as zero
fn format_money(amount: Option<f64>) -> String {
    match amount {
        Some(value) => format!("R$ {:.2}", value),
        None => "n/a (no fuel price set)".to_string(),
    }
}

fn format_rate(km_per_liter: Option<f64>) -> String {
    match km_per_liter {
        Some(value) => format!("{:.1} km/l", value),
        None => "n/a".to_string(),
    }
}
