use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde_json::{json, Value};

use crate::models::driver::Driver;
use crate::models::ride::{Ride, RideStatus};
use crate::state::AppState;

const RECENT_RIDES_LIMIT: usize = 10;
const TOP_DRIVERS_LIMIT: usize = 5;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/summary", get(summary))
        .route("/api/admin/recent-rides", get(recent_rides))
        .route("/api/admin/top-drivers", get(top_drivers))
}

async fn summary(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut completed = 0usize;
    let mut ongoing = 0usize;
    for entry in state.rides.iter() {
        match entry.value().status {
            RideStatus::Completed => completed += 1,
            RideStatus::Ongoing => ongoing += 1,
        }
    }

    Json(json!({
        "total_rides": state.rides.len(),
        "completed_rides": completed,
        "ongoing_rides": ongoing,
    }))
}

async fn recent_rides(State(state): State<Arc<AppState>>) -> Json<Vec<Value>> {
    let mut rides: Vec<Ride> = state
        .rides
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    rides.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));

    let items = rides
        .into_iter()
        .take(RECENT_RIDES_LIMIT)
        .map(|ride| {
            json!({
                "ride_id": ride.id,
                "status": ride.status,
                "fare": ride.pricing.total_fare,
                "distance_km": ride.distance_km,
                "requested_at": ride.requested_at.to_rfc3339(),
            })
        })
        .collect();

    Json(items)
}

async fn top_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<Value>> {
    let mut drivers: Vec<Driver> = state
        .drivers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    drivers.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then(b.total_rides.cmp(&a.total_rides))
    });

    let items = drivers
        .into_iter()
        .take(TOP_DRIVERS_LIMIT)
        .map(|driver| {
            json!({
                "name": driver.name,
                "phone": driver.phone,
                "rating": driver.rating,
                "total_rides": driver.total_rides,
            })
        })
        .collect();

    Json(items)
}
