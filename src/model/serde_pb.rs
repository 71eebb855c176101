//! Serde adapters for record backend field conventions
//!
//! The backend stores unset text, relation and date fields as `""` and writes
//! timestamps as `2024-05-01 10:22:31.123Z`. These helpers read both that form
//! and RFC 3339, and map empty strings to `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// Timestamp format used by the record backend
pub const BACKEND_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3fZ";

/// Parse a backend or RFC 3339 timestamp
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.fZ", "%Y-%m-%d %H:%M:%SZ", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Format a timestamp the way the backend writes it
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(BACKEND_TIME_FORMAT).to_string()
}

/// Parse a calendar date, ignoring any trailing time part
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Read an optional string-encoded value, treating `""` as absent
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Optional timestamp fields (`created`, `assignedAt`, ...)
pub mod opt_timestamp {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&format_timestamp(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_timestamp(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }
}

/// Optional calendar date fields (`pickup_date`, `delivery_date`)
pub mod opt_date {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_date(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_backend_timestamp() {
        let dt = parse_timestamp("2024-05-01 10:22:31.123Z").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.second(), 31);
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        let dt = parse_timestamp("2024-05-01T10:22:31Z").unwrap();
        assert_eq!(dt.minute(), 22);
    }

    #[test]
    fn test_parse_empty_timestamp() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_format_roundtrips_through_parse() {
        let dt = parse_timestamp("2023-11-02 08:00:00.500Z").unwrap();
        assert_eq!(format_timestamp(&dt), "2023-11-02 08:00:00.500Z");
    }

    #[test]
    fn test_parse_date_with_time_suffix() {
        let date = parse_date("2024-06-10 00:00:00.000Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert!(parse_date("10/06/2024").is_none());
    }
}
