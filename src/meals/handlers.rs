use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::meals::dto::{CreateMealRequest, DailyStatsResponse, ListQuery};
use crate::meals::record::MealRecord;
use crate::meals::services;
use crate::state::AppState;

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/:user_id", get(list_meals))
        .route("/stats/:user_id/today", get(today_stats))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/meals", post(create_meal))
}

// --- handlers ---

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    Json(payload): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<MealRecord>), (StatusCode, String)> {
    let record = match payload.into_record(services::utc_now()) {
        Ok(r) => r,
        Err(msg) => {
            warn!(%msg, "meal payload rejected");
            return Err((StatusCode::BAD_REQUEST, msg));
        }
    };

    if let Err(e) = state.store.put(&record).await {
        error!(error = %e, user_id = %record.user_id, "put meal failed");
        return Err(internal(e));
    }

    info!(user_id = %record.user_id, "meal recorded");
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<MealRecord>>, (StatusCode, String)> {
    if q.limit < 1 {
        warn!(limit = q.limit, %user_id, "rejected non-positive limit");
        return Err((
            StatusCode::BAD_REQUEST,
            "limit must be a positive integer".into(),
        ));
    }

    let meals = state
        .store
        .query_by_user(&user_id, q.limit)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "list meals failed");
            internal(e)
        })?;

    Ok(Json(meals))
}

#[instrument(skip(state))]
pub async fn today_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DailyStatsResponse>, (StatusCode, String)> {
    // "Today" is the server's UTC calendar date, not user-local time.
    let today = OffsetDateTime::now_utc().date();
    let (start, end) = services::utc_day_bounds(today);

    let records = state
        .store
        .query_by_time_range(&user_id, start, end)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "daily stats query failed");
            internal(e)
        })?;

    Ok(Json(services::daily_stats(&user_id, today, &records)))
}

fn internal<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
