//! Ledger Entry Tools
//!
//! Logging, correcting and reading daily entries.

use serde::Serialize;

use crate::ledger::{Counter, DailyTotals, DateKey, DaySummary, LedgerStore};
use crate::models::{ExerciseItem, ExerciseItemCreate, ExerciseType, FoodItem, FoodItemCreate};

/// Response for add_food
#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub date: DateKey,
    pub entry: FoodItem,
    pub totals: DailyTotals,
    pub hydrated: bool,
}

/// Response for add_exercise
#[derive(Debug, Serialize)]
pub struct LogExerciseResponse {
    pub date: DateKey,
    pub entry: ExerciseItem,
    pub totals: DailyTotals,
    pub hydrated: bool,
}

/// Response for remove_food / remove_exercise
#[derive(Debug, Serialize)]
pub struct RemoveEntryResponse {
    pub date: DateKey,
    pub id: String,
    /// Whether the entry was present before removal. `None` while the ledger
    /// is still loading, since stored and buffered entries are not visible yet.
    pub found: Option<bool>,
    pub remaining: usize,
    pub hydrated: bool,
}

/// Response for counter tools
#[derive(Debug, Serialize)]
pub struct CounterResponse {
    pub date: DateKey,
    pub counter: &'static str,
    pub value: i64,
    pub hydrated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMode {
    Add,
    Set,
}

/// Parse an optional `YYYY-MM-DD` argument
pub fn parse_date(date: Option<&str>) -> Result<Option<DateKey>, String> {
    date.map(|d| DateKey::parse(d).map_err(|e| e.to_string()))
        .transpose()
}

/// Explicit date, or today at the moment of the call
fn target_date(ledger: &LedgerStore, date: Option<&str>) -> Result<DateKey, String> {
    Ok(parse_date(date)?.unwrap_or_else(|| ledger.today()))
}

// ============================================================================
// Food
// ============================================================================

pub fn log_food(
    ledger: &LedgerStore,
    data: FoodItemCreate,
    date: Option<&str>,
) -> Result<LogFoodResponse, String> {
    let date = target_date(ledger, date)?;
    let entry = ledger
        .add_food(data, Some(date))
        .map_err(|e| format!("Failed to log food: {}", e))?;

    Ok(LogFoodResponse {
        date,
        totals: ledger.totals_on(&date),
        entry,
        hydrated: ledger.is_hydrated(),
    })
}

pub fn remove_food(
    ledger: &LedgerStore,
    id: &str,
    date: Option<&str>,
) -> Result<RemoveEntryResponse, String> {
    let date = target_date(ledger, date)?;
    let found = ledger
        .is_hydrated()
        .then(|| ledger.food_on(&date).iter().any(|f| f.id == id));
    ledger.remove_food(id, Some(date));

    Ok(RemoveEntryResponse {
        date,
        id: id.to_string(),
        found,
        remaining: ledger.food_on(&date).len(),
        hydrated: ledger.is_hydrated(),
    })
}

// ============================================================================
// Exercise
// ============================================================================

pub fn log_exercise(
    ledger: &LedgerStore,
    name: String,
    calories: f64,
    duration: f64,
    exercise_type: &str,
    date: Option<&str>,
) -> Result<LogExerciseResponse, String> {
    let exercise_type = ExerciseType::from_str(exercise_type).ok_or_else(|| {
        format!(
            "Unknown exercise type '{}': expected cardio, strength or sports",
            exercise_type
        )
    })?;
    let date = target_date(ledger, date)?;
    let entry = ledger
        .add_exercise(
            ExerciseItemCreate {
                name,
                calories,
                duration,
                exercise_type,
            },
            Some(date),
        )
        .map_err(|e| format!("Failed to log exercise: {}", e))?;

    Ok(LogExerciseResponse {
        date,
        totals: ledger.totals_on(&date),
        entry,
        hydrated: ledger.is_hydrated(),
    })
}

pub fn remove_exercise(
    ledger: &LedgerStore,
    id: &str,
    date: Option<&str>,
) -> Result<RemoveEntryResponse, String> {
    let date = target_date(ledger, date)?;
    let found = ledger
        .is_hydrated()
        .then(|| ledger.exercise_on(&date).iter().any(|e| e.id == id));
    ledger.remove_exercise(id, Some(date));

    Ok(RemoveEntryResponse {
        date,
        id: id.to_string(),
        found,
        remaining: ledger.exercise_on(&date).len(),
        hydrated: ledger.is_hydrated(),
    })
}

// ============================================================================
// Counters
// ============================================================================

pub fn adjust_counter(
    ledger: &LedgerStore,
    counter: Counter,
    mode: CounterMode,
    amount: i64,
    date: Option<&str>,
) -> Result<CounterResponse, String> {
    let date = target_date(ledger, date)?;
    let target = Some(date);

    let result = match (counter, mode) {
        (Counter::Water, CounterMode::Add) => ledger.add_water(amount, target),
        (Counter::Water, CounterMode::Set) => ledger.set_water(amount, target),
        (Counter::Steps, CounterMode::Add) => ledger.add_steps(amount, target),
        (Counter::Steps, CounterMode::Set) => ledger.set_steps(amount, target),
        (Counter::ActiveMinutes, CounterMode::Add) => ledger.add_active_minutes(amount, target),
        (Counter::ActiveMinutes, CounterMode::Set) => ledger.set_active_minutes(amount, target),
    };
    result.map_err(|e| format!("Failed to update {}: {}", counter.as_str(), e))?;

    let value = match counter {
        Counter::Water => ledger.water_on(&date),
        Counter::Steps => ledger.steps_on(&date),
        Counter::ActiveMinutes => ledger.active_minutes_on(&date),
    };

    Ok(CounterResponse {
        date,
        counter: counter.as_str(),
        value,
        hydrated: ledger.is_hydrated(),
    })
}

// ============================================================================
// Day
// ============================================================================

pub fn get_day(ledger: &LedgerStore, date: Option<&str>) -> Result<DaySummary, String> {
    let date = target_date(ledger, date)?;
    Ok(ledger.day(&date))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::Database;
    use crate::ledger::ValidationPolicy;
    use crate::persistence::SqliteSnapshotStore;

    async fn ledger() -> LedgerStore {
        let snapshots = SqliteSnapshotStore::new(Database::open_in_memory().unwrap()).unwrap();
        let ledger = LedgerStore::new(Arc::new(snapshots), ValidationPolicy::Permissive);
        ledger.hydrate().await;
        ledger
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(None).unwrap(), None);
        assert!(parse_date(Some("2025-01-09")).unwrap().is_some());
        assert!(parse_date(Some("01/09/2025")).is_err());
    }

    #[tokio::test]
    async fn test_log_and_remove_food_on_explicit_date() {
        let ledger = ledger().await;
        let logged = log_food(
            &ledger,
            FoodItemCreate {
                name: "Yogurt".into(),
                calories: 150.0,
                protein: 15.0,
                ..Default::default()
            },
            Some("2025-01-09"),
        )
        .unwrap();
        assert_eq!(logged.totals.calories, 150.0);
        assert_eq!(logged.date.to_string(), "2025-01-09");

        let removed = remove_food(&ledger, &logged.entry.id, Some("2025-01-09")).unwrap();
        assert_eq!(removed.found, Some(true));
        assert_eq!(removed.remaining, 0);

        let again = remove_food(&ledger, &logged.entry.id, Some("2025-01-09")).unwrap();
        assert_eq!(again.found, Some(false));
    }

    #[tokio::test]
    async fn test_remove_on_cold_ledger_reports_unknown() {
        let snapshots = SqliteSnapshotStore::new(Database::open_in_memory().unwrap()).unwrap();
        let ledger = LedgerStore::new(Arc::new(snapshots), ValidationPolicy::Permissive);

        let logged = log_food(
            &ledger,
            FoodItemCreate {
                name: "Toast".into(),
                calories: 90.0,
                ..Default::default()
            },
            Some("2025-01-09"),
        )
        .unwrap();
        assert!(!logged.hydrated);

        let removed = remove_food(&ledger, &logged.entry.id, Some("2025-01-09")).unwrap();
        assert_eq!(removed.found, None);
        assert!(!removed.hydrated);

        let removed = remove_exercise(&ledger, "whatever", Some("2025-01-09")).unwrap();
        assert_eq!(removed.found, None);

        ledger.hydrate().await;
        assert!(ledger.food_on(&logged.date).is_empty());
    }

    #[tokio::test]
    async fn test_log_food_rejects_nan() {
        let ledger = ledger().await;
        let err = log_food(
            &ledger,
            FoodItemCreate {
                name: "Mystery".into(),
                calories: f64::NAN,
                ..Default::default()
            },
            None,
        )
        .unwrap_err();
        assert!(err.contains("finite"));
        assert!(get_day(&ledger, None).unwrap().food.is_empty());
    }

    #[tokio::test]
    async fn test_log_exercise_rejects_unknown_type() {
        let ledger = ledger().await;
        let err = log_exercise(&ledger, "Yoga".into(), 100.0, 30.0, "flexibility", None).unwrap_err();
        assert!(err.contains("flexibility"));

        let ok = log_exercise(&ledger, "Swim".into(), 250.0, 30.0, "cardio", None).unwrap();
        assert_eq!(ok.totals.exercise, 250.0);
    }

    #[tokio::test]
    async fn test_adjust_counter_add_then_set() {
        let ledger = ledger().await;
        let first = adjust_counter(&ledger, Counter::Water, CounterMode::Add, 100, None).unwrap();
        assert_eq!(first.value, 100);
        let second = adjust_counter(&ledger, Counter::Water, CounterMode::Add, 50, None).unwrap();
        assert_eq!(second.value, 150);
        let set = adjust_counter(&ledger, Counter::Water, CounterMode::Set, 80, None).unwrap();
        assert_eq!(set.value, 80);
        assert_eq!(set.counter, "water");
    }

    #[tokio::test]
    async fn test_get_day_rejects_bad_date() {
        let ledger = ledger().await;
        assert!(get_day(&ledger, Some("tomorrow")).is_err());
        assert!(get_day(&ledger, None).unwrap().hydrated);
    }
}
