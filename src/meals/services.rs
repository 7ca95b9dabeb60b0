use time::macros::time;
use time::{Date, OffsetDateTime};

use crate::meals::dto::DailyStatsResponse;
use crate::meals::record::MealRecord;

/// Current UTC instant truncated to microseconds, the sort-key resolution.
pub fn utc_now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

/// Inclusive bounds of one UTC calendar day: 00:00:00.000000 through
/// 23:59:59.999999.
pub fn utc_day_bounds(date: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = date.midnight().assume_utc();
    let end = date.with_time(time!(23:59:59.999999)).assume_utc();
    (start, end)
}

/// Reduces one user's records for one day to additive totals. Pure; an empty
/// slice yields zeroed totals with `meal_count` 0.
pub fn daily_stats(user_id: &str, date: Date, records: &[MealRecord]) -> DailyStatsResponse {
    let mut stats = DailyStatsResponse {
        user_id: user_id.to_string(),
        date: format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        ),
        total_calories: 0.0,
        total_protein: 0.0,
        total_fat: 0.0,
        total_carbs: 0.0,
        meal_count: 0,
    };
    for record in records {
        stats.total_calories += record.calories;
        stats.total_protein += record.protein;
        stats.total_fat += record.fat;
        stats.total_carbs += record.carbs;
        stats.meal_count += 1;
    }
    stats
}
