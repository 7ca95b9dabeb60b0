use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One stored meal entry. `user_id` partitions the table, `timestamp` orders
/// entries within a partition; together they identify the record. Records are
/// never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub meal_type: Option<String>,
    pub description: Option<String>,
}
