use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::registry;
use crate::error::AppError;
use crate::models::driver::DriverStatus;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/drivers/register", post(register_driver))
        .route("/api/drivers/location", post(update_location))
        .route("/api/drivers/locations", get(list_locations))
}

#[derive(Deserialize)]
pub struct RegisterDriverRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub vehicle_type: Option<String>,
    pub vehicle_model: Option<String>,
    pub plate_number: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub phone: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub status: Option<DriverStatus>,
}

#[derive(Serialize)]
struct DriverLocationView {
    driver_id: String,
    name: String,
    phone: String,
    status: DriverStatus,
    lon: f64,
    lat: f64,
}

async fn register_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterDriverRequest>,
) -> Result<Json<Value>, AppError> {
    let name = payload
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("name and phone are required".to_string()))?;
    let phone = payload
        .phone
        .filter(|phone| !phone.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("name and phone are required".to_string()))?;

    let driver_id = registry::register_or_update(
        &state,
        registry::DriverRegistration {
            name,
            phone,
            email: payload.email.unwrap_or_default(),
            vehicle_type: payload.vehicle_type.unwrap_or_else(|| "car".to_string()),
            vehicle_model: payload
                .vehicle_model
                .unwrap_or_else(|| "Unknown".to_string()),
            plate_number: payload.plate_number.unwrap_or_default(),
        },
    );

    Ok(Json(json!({
        "message": "driver registered/updated",
        "driver_id": driver_id,
    })))
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(phone), Some(lat), Some(lon)) = (payload.phone, payload.lat, payload.lon) else {
        return Err(AppError::BadRequest("phone, lat, lon required".to_string()));
    };

    registry::update_location(
        &state,
        registry::LocationUpdate {
            phone,
            lat,
            lon,
            status: payload.status.unwrap_or(DriverStatus::Available),
        },
    )?;

    Ok(Json(json!({ "message": "location updated" })))
}

async fn list_locations(State(state): State<Arc<AppState>>) -> Json<Vec<DriverLocationView>> {
    let locations = state
        .geo
        .snapshot()
        .into_iter()
        .map(|location| {
            let (name, phone) = state
                .drivers
                .get(&location.driver_id)
                .map(|driver| (driver.name.clone(), driver.phone.clone()))
                .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

            DriverLocationView {
                driver_id: location.driver_id.to_string(),
                name,
                phone,
                status: location.status,
                lon: location.point.lon,
                lat: location.point.lat,
            }
        })
        .collect();

    Json(locations)
}
