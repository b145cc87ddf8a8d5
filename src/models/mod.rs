//! Data models
//!
//! Entries stored in the daily activity ledger.

mod exercise;
mod food_item;
mod nutrition;

pub use exercise::{ExerciseItem, ExerciseItemCreate, ExerciseType};
pub use food_item::{FoodItem, FoodItemCreate};
pub use nutrition::Nutrition;
