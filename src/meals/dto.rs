use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::meals::record::MealRecord;

/// Request body for creating a meal. The numeric fields stay `Option` at the
/// serde level so a missing field is reported by our own validation with a
/// 400 and a message naming the field, instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub user_id: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub meal_type: Option<String>,
    pub description: Option<String>,
}

impl CreateMealRequest {
    /// Validates field presence and ranges, producing the record to store
    /// with the server-assigned timestamp.
    pub fn into_record(self, timestamp: OffsetDateTime) -> Result<MealRecord, String> {
        let user_id = match self.user_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err("user_id must be a non-empty string".into()),
        };
        Ok(MealRecord {
            user_id,
            timestamp,
            calories: require_non_negative("calories", self.calories)?,
            protein: require_non_negative("protein", self.protein)?,
            fat: require_non_negative("fat", self.fat)?,
            carbs: require_non_negative("carbs", self.carbs)?,
            meal_type: self.meal_type,
            description: self.description,
        })
    }
}

fn require_non_negative(name: &str, value: Option<f64>) -> Result<f64, String> {
    match value {
        None => Err(format!("{name} is required")),
        // NaN fails the comparison and lands here as well.
        Some(v) if !(v >= 0.0) => Err(format!("{name} must be >= 0")),
        Some(v) => Ok(v),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i32,
}

fn default_limit() -> i32 {
    50
}

#[derive(Debug, Serialize)]
pub struct DailyStatsResponse {
    pub user_id: String,
    /// Calendar date the totals cover, `YYYY-MM-DD`.
    pub date: String,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_fat: f64,
    pub total_carbs: f64,
    pub meal_count: usize,
}
