//! Day totals
//!
//! Totals are always computed from the live entry sequences; nothing here is
//! cached, so a total can never lag behind the last applied mutation.

use serde::{Deserialize, Serialize};

use crate::models::{ExerciseItem, FoodItem, Nutrition};

/// Consumed macros plus calories burned by exercise for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub exercise: f64,
}

/// Sum a day's food macros and exercise calories
pub fn calculate_day_totals(food: &[FoodItem], exercise: &[ExerciseItem]) -> DailyTotals {
    let consumed: Nutrition = food.iter().map(FoodItem::nutrition).sum();
    let burned: f64 = exercise.iter().map(|e| e.calories).sum();

    DailyTotals {
        calories: consumed.calories,
        protein: consumed.protein,
        carbs: consumed.carbs,
        fats: consumed.fats,
        exercise: burned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseItemCreate, ExerciseType, FoodItemCreate};

    fn food(calories: f64, protein: f64, carbs: f64, fats: f64) -> FoodItem {
        FoodItem::from_create(
            FoodItemCreate {
                name: "food".into(),
                calories,
                protein,
                carbs,
                fats,
                ..Default::default()
            },
            "id".into(),
            "2025-01-09T08:00:00.000Z".into(),
        )
    }

    #[test]
    fn test_empty_day_is_zero() {
        assert_eq!(calculate_day_totals(&[], &[]), DailyTotals::default());
    }

    #[test]
    fn test_sums_food_and_exercise_separately() {
        let meals = vec![food(300.0, 20.0, 30.0, 10.0), food(450.0, 25.0, 50.0, 15.0)];
        let workouts = vec![ExerciseItem::from_create(
            ExerciseItemCreate {
                name: "Bike".into(),
                calories: 200.0,
                duration: 40.0,
                exercise_type: ExerciseType::Cardio,
            },
            "e".into(),
            "2025-01-09T09:00:00.000Z".into(),
        )];

        let totals = calculate_day_totals(&meals, &workouts);
        assert_eq!(totals.calories, 750.0);
        assert_eq!(totals.protein, 45.0);
        assert_eq!(totals.carbs, 80.0);
        assert_eq!(totals.fats, 25.0);
        assert_eq!(totals.exercise, 200.0);
    }
}
