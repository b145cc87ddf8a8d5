//! Date keys
//!
//! The ledger partitions everything by calendar day in the device's local
//! time zone. `DateKey` is the validated partition key; `Clock` supplies the
//! current moment so "today" is resolved at call time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::LedgerError;

/// Canonical `YYYY-MM-DD` partition key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Parse a strict `YYYY-MM-DD` string that names a real calendar day
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        let bytes = s.as_bytes();
        let shape_ok = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shape_ok {
            return Err(LedgerError::InvalidDateKey(s.to_string()));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(DateKey)
            .map_err(|_| LedgerError::InvalidDateKey(s.to_string()))
    }

    /// The key for the local calendar day containing `moment`
    pub fn from_local(moment: &DateTime<Local>) -> Self {
        DateKey(moment.date_naive())
    }

    /// The key for "today" according to `clock`, resolved now
    pub fn today(clock: &dyn Clock) -> Self {
        Self::from_local(&clock.now())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateKey::parse(s)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Source of the current moment
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock in the device's local time zone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// ISO-8601 UTC timestamp for an entry created at `moment`
pub fn entry_timestamp(moment: &DateTime<Local>) -> String {
    moment
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}


#[cfg(test)]
mod tests {
    use super::test_support::ManualClock;
    use super::*;

    #[test]
    fn test_parse_valid_key() {
        let key = DateKey::parse("2025-01-09").unwrap();
        assert_eq!(key.to_string(), "2025-01-09");
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in ["2025-1-09", "2025/01/09", "20250109", "2025-02-30", "", "2025-01-09T00:00"] {
            assert!(DateKey::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_keys_order_chronologically() {
        let a = DateKey::parse("2024-12-31").unwrap();
        let b = DateKey::parse("2025-01-01").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_today_follows_clock() {
        let clock = ManualClock::at(2025, 3, 14, 23, 59, 59);
        assert_eq!(DateKey::today(&clock).to_string(), "2025-03-14");

        clock.set(2025, 3, 15, 0, 0, 1);
        assert_eq!(DateKey::today(&clock).to_string(), "2025-03-15");
    }

    #[test]
    fn test_serde_as_string() {
        let key = DateKey::parse("2025-06-01").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2025-06-01\"");

        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);

        assert!(serde_json::from_str::<DateKey>("\"yesterday\"").is_err());
    }

    #[test]
    fn test_entry_timestamp_is_utc_iso() {
        let clock = ManualClock::at(2025, 3, 14, 12, 0, 0);
        let ts = entry_timestamp(&clock.now());
        assert!(ts.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
