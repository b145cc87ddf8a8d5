//! FitLedger Status Tool
//!
//! Runtime status of the service: build, process, hydration and durable
//! write progress.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::ledger::{HydrationState, LedgerStore};
use crate::persistence::WriteStatus;

/// Logging instructions for assistants driving the MCP tools
pub const LOGGING_INSTRUCTIONS: &str = r#"
# FitLedger Logging Instructions

Everything is stored per calendar day (local time, `YYYY-MM-DD`).
Every tool takes an optional `date`; leave it out to log against today.

## Food
- `add_food` with name, calories, protein, carbs, fats (grams).
- Set `ai_analyzed: true` when the values came from a photo estimate.
- Entries cannot be edited. To correct one, `remove_food` by id and add it again.

## Exercise
- `add_exercise` with name, calories burned, duration (minutes) and type:
  `cardio`, `strength` or `sports`.

## Water, steps, active minutes
- `add_*` increments the day's value (a glass of water: `add_water 250`).
- `set_*` overwrites it (syncing a step count from a watch: `set_steps 8421`).

## Reading
- `get_day` returns all entries, counters and totals for a day.
- If a response says `"hydrated": false` the ledger is still loading;
  values shown are not final and changes are queued until loading finishes.
"#;

/// Runtime status of the FitLedger service
#[derive(Debug, Clone, Serialize)]
pub struct FitLedgerStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Ledger information
    pub hydration: HydrationState,
    pub revision: u64,
    pub pending_mutations: usize,
    pub writes: WriteStatus,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self, ledger: &LedgerStore) -> FitLedgerStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        FitLedgerStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            hydration: ledger.hydration_state(),
            revision: ledger.revision(),
            pending_mutations: ledger.pending_mutations(),
            writes: ledger.write_status(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::Database;
    use crate::ledger::ValidationPolicy;
    use crate::persistence::SqliteSnapshotStore;

    #[tokio::test]
    async fn test_status_reports_ledger_progress() {
        let snapshots = SqliteSnapshotStore::new(Database::open_in_memory().unwrap()).unwrap();
        let ledger = LedgerStore::new(Arc::new(snapshots), ValidationPolicy::Permissive);
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/fitledger.db"));

        let cold = tracker.get_status(&ledger);
        assert_eq!(cold.hydration, HydrationState::Cold);
        assert_eq!(cold.database_size_bytes, None);

        ledger.hydrate().await;
        ledger.add_steps(100, None).unwrap();
        ledger.flush().await;

        let warm = tracker.get_status(&ledger);
        assert_eq!(warm.hydration, HydrationState::Hydrated);
        assert_eq!(warm.revision, 1);
        assert_eq!(warm.writes.last_durable_revision, Some(1));
        assert_eq!(warm.process_id, std::process::id());
    }
}
