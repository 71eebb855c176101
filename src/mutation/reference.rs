//! Load reference numbers

use chrono::{DateTime, Utc};

pub const REFERENCE_PREFIX: &str = "LD-";

/// `LD-` plus the last six digits of the epoch milliseconds at `now`
pub fn reference_at(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(1_000_000);
    format!("{}{:06}", REFERENCE_PREFIX, millis)
}

pub fn generate_reference() -> String {
    reference_at(Utc::now())
}

/// Whether `value` has the generated shape
pub fn is_generated_reference(value: &str) -> bool {
    value
        .strip_prefix(REFERENCE_PREFIX)
        .is_some_and(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reference_uses_last_six_digits() {
        let now = Utc.timestamp_millis_opt(1_717_171_234_567).unwrap();
        assert_eq!(reference_at(now), "LD-234567");
    }

    #[test]
    fn test_reference_zero_padded() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_042).unwrap();
        assert_eq!(reference_at(now), "LD-000042");
    }

    #[test]
    fn test_generated_shape() {
        assert!(is_generated_reference(&generate_reference()));
        assert!(!is_generated_reference("LD-12345"));
        assert!(!is_generated_reference("XX-123456"));
    }
}
