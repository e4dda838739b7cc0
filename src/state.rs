use dashmap::DashMap;
use uuid::Uuid;

use crate::engine::fare::FareSchedule;
use crate::geo::index::GeoIndex;
use crate::models::driver::Driver;
use crate::models::ride::Ride;
use crate::models::rider::Rider;
use crate::models::vehicle::Vehicle;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub drivers: DashMap<Uuid, Driver>,
    // phone is the natural external key for drivers; ids are internal
    pub driver_phones: DashMap<String, Uuid>,
    pub vehicles: DashMap<Uuid, Vehicle>,
    pub riders: DashMap<String, Rider>,
    pub rides: DashMap<Uuid, Ride>,
    pub geo: GeoIndex,
    pub fares: FareSchedule,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(fares: FareSchedule) -> Self {
        Self {
            drivers: DashMap::new(),
            driver_phones: DashMap::new(),
            vehicles: DashMap::new(),
            riders: DashMap::new(),
            rides: DashMap::new(),
            geo: GeoIndex::new(),
            fares,
            metrics: Metrics::new(),
        }
    }
}
