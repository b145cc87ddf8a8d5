//! In-memory ledger state
//!
//! Five independent date-partitioned maps. A missing bucket reads as empty or
//! zero; buckets appear on their first mutation.

use std::collections::BTreeMap;

use super::DateKey;
use crate::models::{ExerciseItem, FoodItem};
use crate::persistence::{LedgerSnapshot, SNAPSHOT_VERSION};

/// Integer-valued daily counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Milliliters
    Water,
    Steps,
    ActiveMinutes,
}

impl Counter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::Water => "water",
            Counter::Steps => "steps",
            Counter::ActiveMinutes => "active_minutes",
        }
    }
}

/// A fully resolved change to the ledger.
///
/// Date, id and timestamp are fixed when the mutation is requested, so
/// applying it later (after hydration) lands it where the caller intended.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddFood { date: DateKey, item: FoodItem },
    RemoveFood { date: DateKey, id: String },
    AddExercise { date: DateKey, item: ExerciseItem },
    RemoveExercise { date: DateKey, id: String },
    AddToCounter { date: DateKey, counter: Counter, amount: i64 },
    SetCounter { date: DateKey, counter: Counter, amount: i64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    food: BTreeMap<DateKey, Vec<FoodItem>>,
    exercise: BTreeMap<DateKey, Vec<ExerciseItem>>,
    water: BTreeMap<DateKey, i64>,
    steps: BTreeMap<DateKey, i64>,
    active_minutes: BTreeMap<DateKey, i64>,
}

impl LedgerState {
    pub fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::AddFood { date, item } => self.food.entry(date).or_default().push(item),
            Mutation::RemoveFood { date, id } => {
                if let Some(items) = self.food.get_mut(&date) {
                    items.retain(|item| item.id != id);
                }
            }
            Mutation::AddExercise { date, item } => {
                self.exercise.entry(date).or_default().push(item)
            }
            Mutation::RemoveExercise { date, id } => {
                if let Some(items) = self.exercise.get_mut(&date) {
                    items.retain(|item| item.id != id);
                }
            }
            Mutation::AddToCounter {
                date,
                counter,
                amount,
            } => {
                let value = self.counter_map_mut(counter).entry(date).or_insert(0);
                *value = value.saturating_add(amount);
            }
            Mutation::SetCounter {
                date,
                counter,
                amount,
            } => {
                self.counter_map_mut(counter).insert(date, amount);
            }
        }
    }

    pub fn food_on(&self, date: &DateKey) -> &[FoodItem] {
        self.food.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn exercise_on(&self, date: &DateKey) -> &[ExerciseItem] {
        self.exercise.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn counter_on(&self, counter: Counter, date: &DateKey) -> i64 {
        self.counter_map(counter).get(date).copied().unwrap_or(0)
    }

    fn counter_map(&self, counter: Counter) -> &BTreeMap<DateKey, i64> {
        match counter {
            Counter::Water => &self.water,
            Counter::Steps => &self.steps,
            Counter::ActiveMinutes => &self.active_minutes,
        }
    }

    fn counter_map_mut(&mut self, counter: Counter) -> &mut BTreeMap<DateKey, i64> {
        match counter {
            Counter::Water => &mut self.water,
            Counter::Steps => &mut self.steps,
            Counter::ActiveMinutes => &mut self.active_minutes,
        }
    }

    pub fn to_snapshot(&self, current_date: DateKey) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            food_logs: self.food.clone(),
            exercise_logs: self.exercise.clone(),
            water_intake: self.water.clone(),
            steps: self.steps.clone(),
            active_minutes: self.active_minutes.clone(),
            current_date,
        }
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            food: snapshot.food_logs,
            exercise: snapshot.exercise_logs,
            water: snapshot.water_intake,
            steps: snapshot.steps,
            active_minutes: snapshot.active_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoodItemCreate;

    fn day(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn food(id: &str) -> FoodItem {
        FoodItem::from_create(
            FoodItemCreate {
                name: id.into(),
                calories: 100.0,
                ..Default::default()
            },
            id.into(),
            "2025-01-09T08:00:00.000Z".into(),
        )
    }

    #[test]
    fn test_missing_buckets_read_as_empty() {
        let state = LedgerState::default();
        let d = day("2025-01-09");
        assert!(state.food_on(&d).is_empty());
        assert!(state.exercise_on(&d).is_empty());
        assert_eq!(state.counter_on(Counter::Steps, &d), 0);
    }

    #[test]
    fn test_remove_from_missing_bucket_creates_nothing() {
        let mut state = LedgerState::default();
        state.apply(Mutation::RemoveFood {
            date: day("2025-01-09"),
            id: "nope".into(),
        });
        assert_eq!(state, LedgerState::default());
    }

    #[test]
    fn test_food_keeps_insertion_order() {
        let mut state = LedgerState::default();
        let d = day("2025-01-09");
        for id in ["a", "b", "c"] {
            state.apply(Mutation::AddFood { date: d, item: food(id) });
        }
        state.apply(Mutation::RemoveFood { date: d, id: "b".into() });

        let ids: Vec<_> = state.food_on(&d).iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_counters_are_independent() {
        let mut state = LedgerState::default();
        let d = day("2025-01-09");
        state.apply(Mutation::AddToCounter { date: d, counter: Counter::Water, amount: 250 });
        state.apply(Mutation::SetCounter { date: d, counter: Counter::Steps, amount: 4000 });

        assert_eq!(state.counter_on(Counter::Water, &d), 250);
        assert_eq!(state.counter_on(Counter::Steps, &d), 4000);
        assert_eq!(state.counter_on(Counter::ActiveMinutes, &d), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut state = LedgerState::default();
        let d = day("2025-01-09");
        state.apply(Mutation::AddFood { date: d, item: food("a") });
        state.apply(Mutation::AddToCounter { date: d, counter: Counter::ActiveMinutes, amount: 45 });

        let json = state.to_snapshot(d).to_json().unwrap();
        let restored = LedgerState::from_snapshot(LedgerSnapshot::from_json(&json).unwrap());
        assert_eq!(restored, state);
    }
}
