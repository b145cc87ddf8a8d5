//! Exercise model
//!
//! A logged exercise session with its calorie burn.

use serde::{Deserialize, Serialize};

/// Exercise type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Cardio,
    Strength,
    Sports,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Cardio => "cardio",
            ExerciseType::Strength => "strength",
            ExerciseType::Sports => "sports",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cardio" => Some(ExerciseType::Cardio),
            "strength" => Some(ExerciseType::Strength),
            "sports" | "sport" => Some(ExerciseType::Sports),
            _ => None,
        }
    }
}

/// A logged exercise entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseItem {
    pub id: String,
    pub name: String,
    pub calories: f64,
    /// Minutes
    pub duration: f64,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub timestamp: String,
}

/// Caller-supplied fields for a new exercise entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseItemCreate {
    pub name: String,
    pub calories: f64,
    pub duration: f64,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
}

impl ExerciseItem {
    pub fn from_create(data: ExerciseItemCreate, id: String, timestamp: String) -> Self {
        Self {
            id,
            name: data.name,
            calories: data.calories,
            duration: data.duration,
            exercise_type: data.exercise_type,
            timestamp,
        }
    }
}

impl ExerciseItemCreate {
    pub fn negative_field(&self) -> Option<(&'static str, f64)> {
        [("calories", self.calories), ("duration", self.duration)]
            .into_iter()
            .find(|(_, v)| *v < 0.0)
    }

    pub fn non_finite_field(&self) -> Option<(&'static str, f64)> {
        [("calories", self.calories), ("duration", self.duration)]
            .into_iter()
            .find(|(_, v)| !v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_type_parsing() {
        assert_eq!(ExerciseType::from_str("Cardio"), Some(ExerciseType::Cardio));
        assert_eq!(ExerciseType::from_str("sport"), Some(ExerciseType::Sports));
        assert_eq!(ExerciseType::from_str("yoga"), None);
        assert_eq!(ExerciseType::Strength.as_str(), "strength");
    }

    #[test]
    fn test_type_field_name() {
        let item = ExerciseItem::from_create(
            ExerciseItemCreate {
                name: "Run".into(),
                calories: 300.0,
                duration: 30.0,
                exercise_type: ExerciseType::Cardio,
            },
            "x".into(),
            "2025-01-09T08:00:00.000Z".into(),
        );
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "cardio");
        assert!(value.get("exercise_type").is_none());
    }

    #[test]
    fn test_non_finite_duration() {
        let data = ExerciseItemCreate {
            name: "Swim".into(),
            calories: 250.0,
            duration: f64::NEG_INFINITY,
            exercise_type: ExerciseType::Cardio,
        };
        assert_eq!(data.non_finite_field(), Some(("duration", f64::NEG_INFINITY)));
        assert_eq!(data.negative_field(), Some(("duration", f64::NEG_INFINITY)));
    }
}
