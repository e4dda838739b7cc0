use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub driver_id: Uuid,
    pub vehicle_type: String,
    pub model: String,
    pub plate_number: String,
    pub capacity: u8,
}
