//! Utility functions for the ladder service

use crate::types::TimestampMs;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Generate a new unique player ID
pub fn generate_player_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a new unique match ID
pub fn generate_match_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Current time in milliseconds since the epoch
pub fn current_timestamp_ms() -> TimestampMs {
    Utc::now().timestamp_millis()
}

/// Parse an ISO-8601 date or date-time into epoch milliseconds.
///
/// Accepts RFC 3339 date-times and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_match_date(value: &str) -> Option<TimestampMs> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Case-insensitive name comparison used for roster uniqueness
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        assert_ne!(generate_player_id(), generate_player_id());
        assert_ne!(generate_match_id(), generate_match_id());
    }

    #[test]
    fn test_parse_match_date() {
        assert_eq!(parse_match_date("1970-01-02"), Some(86_400_000));
        assert_eq!(
            parse_match_date("2024-03-01T10:00:00Z"),
            Some(1_709_287_200_000)
        );
        assert_eq!(parse_match_date("last tuesday"), None);
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("Alice", " alice "));
        assert!(!names_match("Alice", "Alicia"));
    }
}
