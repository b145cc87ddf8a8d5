//! Durable snapshot format
//!
//! The complete ledger as one JSON document. Keys are validated date keys, so a
//! snapshot with a malformed partition key fails to parse as a whole.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SnapshotError;
use crate::ledger::DateKey;
use crate::models::{ExerciseItem, FoodItem};

/// Payload format written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

fn legacy_version() -> u32 {
    // Snapshots written before the version field existed
    1
}

/// Serialized form of the whole ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub food_logs: BTreeMap<DateKey, Vec<FoodItem>>,
    #[serde(default)]
    pub exercise_logs: BTreeMap<DateKey, Vec<ExerciseItem>>,
    #[serde(default)]
    pub water_intake: BTreeMap<DateKey, i64>,
    #[serde(default)]
    pub steps: BTreeMap<DateKey, i64>,
    #[serde(default)]
    pub active_minutes: BTreeMap<DateKey, i64>,
    pub current_date: DateKey,
}

impl LedgerSnapshot {
    pub fn empty(current_date: DateKey) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            food_logs: BTreeMap::new(),
            exercise_logs: BTreeMap::new(),
            water_intake: BTreeMap::new(),
            steps: BTreeMap::new(),
            active_minutes: BTreeMap::new(),
            current_date,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored payload, refusing versions newer than this build
    pub fn from_json(payload: &str) -> Result<Self, SnapshotError> {
        let snapshot: LedgerSnapshot = serde_json::from_str(payload)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_unversioned_snapshot() {
        let payload = r#"{
            "foodLogs": {"2025-01-09": [{"id":"1","name":"Toast","calories":120,"protein":4,"carbs":22,"fats":2,"timestamp":"2025-01-09T07:30:00.000Z"}]},
            "exerciseLogs": {},
            "waterIntake": {"2025-01-09": 500},
            "steps": {},
            "activeMinutes": {},
            "currentDate": "2025-01-09"
        }"#;

        let snapshot = LedgerSnapshot::from_json(payload).unwrap();
        let day = DateKey::parse("2025-01-09").unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.food_logs[&day][0].name, "Toast");
        assert_eq!(snapshot.water_intake[&day], 500);
    }

    #[test]
    fn test_rejects_malformed_date_key() {
        let payload = r#"{"waterIntake": {"Jan 9": 500}, "currentDate": "2025-01-09"}"#;
        assert!(matches!(
            LedgerSnapshot::from_json(payload),
            Err(SnapshotError::Serde(_))
        ));
    }

    #[test]
    fn test_rejects_future_version() {
        let payload = r#"{"version": 99, "currentDate": "2025-01-09"}"#;
        assert!(matches!(
            LedgerSnapshot::from_json(payload),
            Err(SnapshotError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_written_field_names() {
        let snapshot = LedgerSnapshot::empty(DateKey::parse("2025-01-09").unwrap());
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        for field in ["version", "foodLogs", "exerciseLogs", "waterIntake", "steps", "activeMinutes", "currentDate"] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
    }
}
