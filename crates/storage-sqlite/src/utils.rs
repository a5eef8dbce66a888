//! Conversion helpers between SQLite TEXT columns and domain types.
//!
//! Timestamps are stored as RFC 3339 TEXT, dates as `YYYY-MM-DD`, and
//! decimals as their canonical string form. A row that fails to parse is
//! surfaced as an internal database error rather than silently defaulted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use adpulse_core::errors::{DatabaseError, Result};

pub(crate) fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Internal(format!("Bad {} timestamp '{}': {}", column, value, e)).into())
}

pub(crate) fn parse_timestamp_opt(column: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_timestamp(column, v)).transpose()
}

pub(crate) fn parse_date(column: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Internal(format!("Bad {} date '{}': {}", column, value, e)).into())
}

pub(crate) fn parse_decimal(column: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| DatabaseError::Internal(format!("Bad {} decimal '{}': {}", column, value, e)).into())
}

pub(crate) fn parse_enum<T: FromStr>(column: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| DatabaseError::Internal(format!("Bad {} value '{}': {}", column, value, e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp("created_at", &now.to_rfc3339()).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_timestamp("created_at", "yesterday").is_err());
        assert!(parse_date("date", "01/02/2025").is_err());
        assert!(parse_decimal("spend", "ten").is_err());
    }
}
