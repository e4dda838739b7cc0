use std::time::Instant;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::engine::fare;
use crate::engine::registry;
use crate::error::AppError;
use crate::geo::{haversine_km, valid_coordinates};
use crate::models::ride::{PaymentStatus, Ride, RideStatus, Stop};
use crate::state::AppState;

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 5.0;

pub struct RideRequest {
    pub rider_name: String,
    pub rider_phone: String,
    pub pickup: Stop,
    pub dropoff: Stop,
    pub max_distance_km: f64,
}

#[derive(Debug)]
pub struct DispatchOutcome {
    pub ride_id: Uuid,
    pub driver_name: String,
    pub driver_phone: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub fare: f64,
}

pub fn request_ride(state: &AppState, request: RideRequest) -> Result<DispatchOutcome, AppError> {
    let start = Instant::now();
    let result = dispatch(state, request);

    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .dispatch_latency_seconds
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());
    state
        .metrics
        .dispatches_total
        .with_label_values(&[outcome])
        .inc();

    result
}

fn dispatch(state: &AppState, request: RideRequest) -> Result<DispatchOutcome, AppError> {
    for point in [&request.pickup.location, &request.dropoff.location] {
        if !valid_coordinates(point.lat, point.lon) {
            return Err(AppError::InvalidCoordinate {
                lat: point.lat,
                lon: point.lon,
            });
        }
    }

    let rider_id = registry::upsert_rider(state, &request.rider_name, &request.rider_phone);

    let candidates = state
        .geo
        .nearest_available(request.pickup.location, request.max_distance_km)?;

    // Find-and-reserve: walk candidates nearest-first and claim the first
    // one whose available -> on_ride swap wins. A losing swap means another
    // request took that driver between the query and here.
    let matched = candidates
        .into_iter()
        .find(|candidate| registry::try_reserve(state, candidate.driver_id).is_ok())
        .ok_or(AppError::NoDriverAvailable)?;

    let (driver_name, driver_phone) = state
        .drivers
        .get(&matched.driver_id)
        .map(|driver| (driver.name.clone(), driver.phone.clone()))
        .ok_or_else(|| AppError::Internal("driver data missing".to_string()))?;

    let distance_km = haversine_km(&request.pickup.location, &request.dropoff.location);
    let duration_min = fare::estimate_duration_min(distance_km);
    let pricing = fare::quote(
        &state.fares,
        distance_km,
        duration_min,
        state.fares.default_surge,
    );
    let total_fare = pricing.total_fare;

    let now = Utc::now();
    let ride = Ride {
        id: Uuid::new_v4(),
        rider_id,
        driver_id: matched.driver_id,
        pickup: request.pickup,
        dropoff: request.dropoff,
        requested_at: now,
        // acceptance is instantaneous and automatic; no driver accept/reject
        // flow is modeled
        accepted_at: now,
        completed_at: None,
        status: RideStatus::Ongoing,
        distance_km: fare::round2(distance_km),
        duration_min: fare::round1(duration_min),
        pricing,
        payment_status: PaymentStatus::Pending,
    };

    let outcome = DispatchOutcome {
        ride_id: ride.id,
        driver_name,
        driver_phone,
        distance_km: ride.distance_km,
        duration_min: ride.duration_min,
        fare: total_fare,
    };

    state.rides.insert(ride.id, ride);
    state.metrics.rides_ongoing.inc();

    info!(
        ride_id = %outcome.ride_id,
        driver_id = %matched.driver_id,
        pickup_distance_km = matched.distance_km,
        trip_distance_km = outcome.distance_km,
        fare = total_fare,
        "ride dispatched"
    );

    Ok(outcome)
}

pub fn complete_ride(state: &AppState, ride_id: Uuid) -> Result<(), AppError> {
    let driver_id = {
        let mut ride = state
            .rides
            .get_mut(&ride_id)
            .ok_or_else(|| AppError::NotFound("ride not found".to_string()))?;

        // completing an already-completed ride is an error, not a no-op
        if ride.status != RideStatus::Ongoing {
            return Err(AppError::NotFound(
                "ride not found or already completed".to_string(),
            ));
        }

        ride.status = RideStatus::Completed;
        ride.payment_status = PaymentStatus::Paid;
        ride.completed_at = Some(Utc::now());
        ride.driver_id
    };

    registry::release(state, driver_id);
    state.metrics.rides_ongoing.dec();

    info!(ride_id = %ride_id, driver_id = %driver_id, "ride completed");
    Ok(())
}
