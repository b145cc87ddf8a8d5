//! Food Item model
//!
//! A single logged food entry with its macronutrients.

use serde::{Deserialize, Serialize};

use super::Nutrition;

/// A logged food entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fats: f64,    // grams
    /// ISO-8601 creation time, stamped by the ledger
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analyzed: Option<bool>,
}

/// Caller-supplied fields for a new food entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemCreate {
    pub name: String,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
    #[serde(default)]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub ai_analyzed: Option<bool>,
}

impl FoodItem {
    /// Build the stored entry from caller fields plus ledger-assigned id and time
    pub fn from_create(data: FoodItemCreate, id: String, timestamp: String) -> Self {
        Self {
            id,
            name: data.name,
            calories: data.calories,
            protein: data.protein,
            carbs: data.carbs,
            fats: data.fats,
            timestamp,
            image_uri: data.image_uri,
            ai_analyzed: data.ai_analyzed,
        }
    }

    pub fn nutrition(&self) -> Nutrition {
        Nutrition {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
        }
    }
}

impl FoodItemCreate {
    fn numeric_fields(&self) -> [(&'static str, f64); 4] {
        [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fats", self.fats),
        ]
    }

    /// First numeric field holding a negative value, if any
    pub fn negative_field(&self) -> Option<(&'static str, f64)> {
        self.numeric_fields().into_iter().find(|(_, v)| *v < 0.0)
    }

    /// First numeric field holding NaN or an infinity, if any
    pub fn non_finite_field(&self) -> Option<(&'static str, f64)> {
        self.numeric_fields().into_iter().find(|(_, v)| !v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_field_names() {
        let item = FoodItem::from_create(
            FoodItemCreate {
                name: "Oatmeal".into(),
                calories: 150.0,
                protein: 5.0,
                carbs: 27.0,
                fats: 3.0,
                image_uri: Some("file:///meal.jpg".into()),
                ai_analyzed: Some(true),
            },
            "1-1".into(),
            "2025-01-09T08:00:00.000Z".into(),
        );

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["imageUri"], "file:///meal.jpg");
        assert_eq!(value["aiAnalyzed"], true);
        assert_eq!(value["fats"], 3.0);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let json = r#"{"id":"a","name":"Apple","calories":95,"protein":0.5,"carbs":25,"fats":0.3,"timestamp":"2025-01-09T08:00:00.000Z"}"#;
        let item: FoodItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.image_uri, None);
        assert_eq!(item.ai_analyzed, None);

        let back = serde_json::to_value(&item).unwrap();
        assert!(back.get("imageUri").is_none());
    }

    #[test]
    fn test_negative_field() {
        let mut data = FoodItemCreate {
            name: "Bad".into(),
            calories: 100.0,
            ..Default::default()
        };
        assert_eq!(data.negative_field(), None);

        data.carbs = -2.0;
        assert_eq!(data.negative_field(), Some(("carbs", -2.0)));
    }

    #[test]
    fn test_non_finite_field() {
        let mut data = FoodItemCreate {
            name: "Soup".into(),
            calories: 120.0,
            ..Default::default()
        };
        assert_eq!(data.non_finite_field(), None);

        data.protein = f64::INFINITY;
        assert_eq!(data.non_finite_field(), Some(("protein", f64::INFINITY)));

        data.protein = 4.0;
        data.fats = f64::NAN;
        let (field, value) = data.non_finite_field().unwrap();
        assert_eq!(field, "fats");
        assert!(value.is_nan());
    }
}
