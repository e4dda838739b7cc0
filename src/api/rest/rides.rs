use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::engine::dispatch;
use crate::error::AppError;
use crate::models::ride::{Ride, RideStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rides/ongoing", get(list_ongoing))
        .route("/api/rides/complete", post(complete_ride))
}

#[derive(Deserialize)]
pub struct CompleteRideRequest {
    pub ride_id: Option<String>,
}

async fn list_ongoing(State(state): State<Arc<AppState>>) -> Json<Vec<Value>> {
    let mut ongoing: Vec<Ride> = state
        .rides
        .iter()
        .filter(|entry| entry.value().status == RideStatus::Ongoing)
        .map(|entry| entry.value().clone())
        .collect();

    ongoing.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));

    let items = ongoing
        .into_iter()
        .map(|ride| {
            json!({
                "ride_id": ride.id,
                "status": ride.status,
                "fare": ride.pricing.total_fare,
                "distance_km": ride.distance_km,
                "driver_id": ride.driver_id,
                "rider_id": ride.rider_id,
            })
        })
        .collect();

    Json(items)
}

async fn complete_ride(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CompleteRideRequest>,
) -> Result<Json<Value>, AppError> {
    let raw_id = payload
        .ride_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("ride_id required".to_string()))?;

    let ride_id = Uuid::parse_str(&raw_id)
        .map_err(|_| AppError::BadRequest(format!("malformed ride_id: {raw_id}")))?;

    dispatch::complete_ride(&state, ride_id)?;

    Ok(Json(json!({ "message": "ride completed" })))
}
