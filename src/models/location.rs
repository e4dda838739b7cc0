use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::driver::DriverStatus;

// Stored as [lon, lat] internally; the HTTP surface always uses separate
// lat/lon fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverLocation {
    pub driver_id: Uuid,
    pub point: GeoPoint,
    pub status: DriverStatus,
    pub last_updated: DateTime<Utc>,
}
