use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::location::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub address: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pricing {
    pub base_fare: f64,
    pub per_km: f64,
    pub per_minute: f64,
    pub surge_multiplier: f64,
    pub total_fare: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Uuid,
    pub pickup: Stop,
    pub dropoff: Stop,
    pub requested_at: DateTime<Utc>,
    pub accepted_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: RideStatus,
    pub distance_km: f64,
    pub duration_min: f64,
    pub pricing: Pricing,
    pub payment_status: PaymentStatus,
}
