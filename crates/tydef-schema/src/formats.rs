//! # Built-in Formats
//!
//! Format checkers registered with every evaluator in addition to the
//! standard JSON Schema formats. Custom checkers supplied through
//! [`LibraryOptions::with_format`](crate::LibraryOptions::with_format)
//! replace a built-in of the same name.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime};

use crate::options::FormatFn;

/// Format name for Luhn-checksummed digit strings.
pub const LUHN: &str = "luhn";
/// Format name for date-times without an offset.
pub const LOCAL_DATE_TIME: &str = "local-date-time";
/// Format name for RFC 3339 date-times in UTC.
pub const UTC_DATE_TIME: &str = "utc-date-time";

/// Every built-in format, keyed by name.
pub fn builtin_formats() -> BTreeMap<String, FormatFn> {
    let mut formats: BTreeMap<String, FormatFn> = BTreeMap::new();
    formats.insert(LUHN.to_string(), Arc::new(is_luhn));
    formats.insert(LOCAL_DATE_TIME.to_string(), Arc::new(is_local_date_time));
    formats.insert(UTC_DATE_TIME.to_string(), Arc::new(is_utc_date_time));
    formats
}

/// A non-empty string of ASCII digits whose Luhn checksum is zero.
pub fn is_luhn(value: &str) -> bool {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = value
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// `YYYY-MM-DDTHH:MM:SS` with optional fractional seconds and no offset.
pub fn is_local_date_time(value: &str) -> bool {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// An RFC 3339 date-time whose offset is written `Z`.
pub fn is_utc_date_time(value: &str) -> bool {
    (value.ends_with('Z') || value.ends_with('z')) && DateTime::parse_from_rfc3339(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luhn() {
        assert!(is_luhn("4111111111111111"));
        assert!(is_luhn("79927398713"));
        assert!(!is_luhn("79927398710"));
        assert!(!is_luhn(""));
        assert!(!is_luhn("4111-1111"));
    }

    #[test]
    fn test_local_date_time() {
        assert!(is_local_date_time("2024-02-29T13:45:00"));
        assert!(is_local_date_time("2024-02-29T13:45:00.250"));
        assert!(!is_local_date_time("2023-02-29T13:45:00"));
        assert!(!is_local_date_time("2024-02-29T13:45:00Z"));
        assert!(!is_local_date_time("2024-02-29"));
    }

    #[test]
    fn test_utc_date_time() {
        assert!(is_utc_date_time("2024-02-29T13:45:00Z"));
        assert!(is_utc_date_time("2024-02-29T13:45:00.5Z"));
        assert!(!is_utc_date_time("2024-02-29T13:45:00+01:00"));
        assert!(!is_utc_date_time("2024-02-29T13:45:00"));
    }

    #[test]
    fn test_builtin_names() {
        let names: Vec<String> = builtin_formats().into_keys().collect();
        assert_eq!(names, vec![LOCAL_DATE_TIME, LUHN, UTC_DATE_TIME]);
    }
}
