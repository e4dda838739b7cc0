use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::valid_coordinates;
use crate::models::driver::{Driver, DriverStatus};
use crate::models::location::GeoPoint;
use crate::models::rider::Rider;
use crate::models::vehicle::Vehicle;
use crate::state::AppState;

const DEFAULT_VEHICLE_CAPACITY: u8 = 4;

pub struct DriverRegistration {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub vehicle_type: String,
    pub vehicle_model: String,
    pub plate_number: String,
}

pub struct LocationUpdate {
    pub phone: String,
    pub lat: f64,
    pub lon: f64,
    pub status: DriverStatus,
}

// Idempotent upsert keyed by phone. Re-registration touches name and email
// only; status, rating and total_rides survive. The vehicle record is
// overwritten either way.
pub fn register_or_update(state: &AppState, registration: DriverRegistration) -> Uuid {
    let now = Utc::now();
    let mut created = false;

    let driver_id = *state
        .driver_phones
        .entry(registration.phone.clone())
        .or_insert_with(|| {
            created = true;
            Uuid::new_v4()
        });

    if created {
        state.drivers.insert(
            driver_id,
            Driver {
                id: driver_id,
                name: registration.name,
                phone: registration.phone,
                email: registration.email,
                status: DriverStatus::Available,
                rating: 5.0,
                total_rides: 0,
                created_at: now,
                updated_at: now,
            },
        );
        state.metrics.drivers_registered.inc();
    } else if let Some(mut driver) = state.drivers.get_mut(&driver_id) {
        driver.name = registration.name;
        driver.email = registration.email;
        driver.updated_at = now;
    }

    state.vehicles.insert(
        driver_id,
        Vehicle {
            driver_id,
            vehicle_type: registration.vehicle_type,
            model: registration.vehicle_model,
            plate_number: registration.plate_number,
            capacity: DEFAULT_VEHICLE_CAPACITY,
        },
    );

    driver_id
}

pub fn update_location(state: &AppState, update: LocationUpdate) -> Result<(), AppError> {
    if !valid_coordinates(update.lat, update.lon) {
        return Err(AppError::InvalidCoordinate {
            lat: update.lat,
            lon: update.lon,
        });
    }

    let driver_id = state
        .driver_phones
        .get(&update.phone)
        .map(|entry| *entry.value())
        .ok_or_else(|| AppError::NotFound("driver not found, register first".to_string()))?;

    let now = Utc::now();

    {
        let mut driver = state
            .drivers
            .get_mut(&driver_id)
            .ok_or_else(|| AppError::NotFound("driver not found, register first".to_string()))?;
        driver.status = update.status;
        driver.updated_at = now;
    }

    state.geo.upsert(
        driver_id,
        GeoPoint::from_lat_lon(update.lat, update.lon),
        update.status,
        now,
    )?;

    Ok(())
}

pub fn upsert_rider(state: &AppState, name: &str, phone: &str) -> Uuid {
    state
        .riders
        .entry(phone.to_string())
        .or_insert_with(|| Rider {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.to_string(),
            rating: 5.0,
            created_at: Utc::now(),
        })
        .id
}

// Compare-and-swap available -> on_ride under the entry guard. The geo
// mirror is written after the swap and is never consulted to decide a
// reservation, so it can lag but never double-book.
pub fn try_reserve(state: &AppState, driver_id: Uuid) -> Result<(), AppError> {
    {
        let mut driver = state
            .drivers
            .get_mut(&driver_id)
            .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

        if driver.status != DriverStatus::Available {
            return Err(AppError::Conflict(format!(
                "driver {driver_id} is not available"
            )));
        }

        driver.status = DriverStatus::OnRide;
        driver.updated_at = Utc::now();
    }

    state.geo.set_status(driver_id, DriverStatus::OnRide);
    Ok(())
}

// A release marks one finished ride.
pub fn release(state: &AppState, driver_id: Uuid) {
    if let Some(mut driver) = state.drivers.get_mut(&driver_id) {
        driver.status = DriverStatus::Available;
        driver.total_rides += 1;
        driver.updated_at = Utc::now();
    }

    state.geo.set_status(driver_id, DriverStatus::Available);
}
