use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::engine::dispatch::{self, RideRequest};
use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::ride::Stop;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/riders/request-ride", post(request_ride))
}

#[derive(Deserialize)]
pub struct RequestRideBody {
    pub rider_name: Option<String>,
    pub rider_phone: Option<String>,
    pub pickup_lat: Option<f64>,
    pub pickup_lon: Option<f64>,
    pub pickup_address: Option<String>,
    pub drop_lat: Option<f64>,
    pub drop_lon: Option<f64>,
    pub drop_address: Option<String>,
    pub max_distance_km: Option<f64>,
}

async fn request_ride(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RequestRideBody>,
) -> Result<Json<Value>, AppError> {
    let rider_name = payload
        .rider_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("rider_name and rider_phone required".to_string())
        })?;
    let rider_phone = payload
        .rider_phone
        .filter(|phone| !phone.trim().is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("rider_name and rider_phone required".to_string())
        })?;

    let (Some(pickup_lat), Some(pickup_lon), Some(drop_lat), Some(drop_lon)) = (
        payload.pickup_lat,
        payload.pickup_lon,
        payload.drop_lat,
        payload.drop_lon,
    ) else {
        return Err(AppError::BadRequest(
            "pickup and drop coordinates required".to_string(),
        ));
    };

    let outcome = dispatch::request_ride(
        &state,
        RideRequest {
            rider_name,
            rider_phone,
            pickup: Stop {
                address: payload.pickup_address.unwrap_or_default(),
                location: GeoPoint::from_lat_lon(pickup_lat, pickup_lon),
            },
            dropoff: Stop {
                address: payload.drop_address.unwrap_or_default(),
                location: GeoPoint::from_lat_lon(drop_lat, drop_lon),
            },
            max_distance_km: payload
                .max_distance_km
                .unwrap_or(dispatch::DEFAULT_MAX_DISTANCE_KM),
        },
    )?;

    Ok(Json(json!({
        "message": "ride created",
        "ride_id": outcome.ride_id,
        "driver": {
            "name": outcome.driver_name,
            "phone": outcome.driver_phone,
        },
        "distance_km": outcome.distance_km,
        "duration_min": outcome.duration_min,
        "fare": outcome.fare,
    })))
}
