use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    OnRide,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub status: DriverStatus,
    pub rating: f64,
    pub total_rides: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
