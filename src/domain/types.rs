/// Core identifier types and lenient field parsing used by the domain layer
///
/// Logs and refuel entries carry caller-generated string ids. Numeric fields
/// coming back from the cache or the backend are parsed leniently so one
/// badly-typed value degrades to "absent" instead of rejecting the record.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for a daily usage log
///
/// Ids are generated by the caller (normally a UUID v4) and are kept as
/// plain strings so records created by other clients round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogId(pub String);

impl LogId {
    /// Generate a new random log ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a refuel entry, unique within its log
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefuelId(pub String);

impl RefuelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RefuelId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RefuelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lenient parsers for JSON values written by other clients
pub(crate) mod lenient {
    use super::*;

    /// Read a finite number from a JSON number or a numeric string
    pub fn number(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        n.is_finite().then_some(n)
    }

    /// Like `number`, but only keeps strictly positive values
    pub fn positive(value: Option<&Value>) -> Option<f64> {
        value.and_then(number).filter(|n| *n > 0.0)
    }

    /// Parse a calendar date, accepting full ISO timestamps by their date part
    pub fn date(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        let date_part = trimmed.get(..10).unwrap_or(trimmed);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    /// serde adapter: missing or non-numeric values become 0
    pub fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(number(&value).unwrap_or(0.0))
    }

    /// serde adapter: non-numeric values become `None`
    pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(number(&value))
    }

    /// serde adapter for `dateISO`
    pub fn iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }
}
