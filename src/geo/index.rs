use std::sync::RwLock;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{degree_radius, haversine_km, valid_coordinates};
use crate::models::driver::DriverStatus;
use crate::models::location::{DriverLocation, GeoPoint};

#[derive(Debug, Error)]
pub enum GeoIndexError {
    #[error("invalid coordinate: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("max distance must be positive, got {0}")]
    InvalidRadius(f64),

    #[error("spatial index lock poisoned")]
    Poisoned,
}

impl From<GeoIndexError> for AppError {
    fn from(err: GeoIndexError) -> Self {
        match err {
            GeoIndexError::InvalidCoordinate { lat, lon } => {
                AppError::InvalidCoordinate { lat, lon }
            }
            GeoIndexError::InvalidRadius(_) => AppError::BadRequest(err.to_string()),
            GeoIndexError::Poisoned => {
                AppError::Internal(format!("geospatial query failed: {err}"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SpatialEntry {
    driver_id: Uuid,
    point: [f64; 2],
}

impl SpatialEntry {
    fn new(driver_id: Uuid, point: GeoPoint) -> Self {
        Self {
            driver_id,
            point: [point.lon, point.lat],
        }
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for SpatialEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub driver_id: Uuid,
    pub distance_km: f64,
}

// One live location record per driver, indexed by an R-tree for radius
// queries. The status field mirrors the registry's driver status; the
// dispatcher writes both. The availability post-filter is linear in the
// number of drivers inside the query radius, and the whole index is
// single-process.
pub struct GeoIndex {
    locations: DashMap<Uuid, DriverLocation>,
    tree: RwLock<RTree<SpatialEntry>>,
}

impl GeoIndex {
    pub fn new() -> Self {
        Self {
            locations: DashMap::new(),
            tree: RwLock::new(RTree::new()),
        }
    }

    pub fn upsert(
        &self,
        driver_id: Uuid,
        point: GeoPoint,
        status: DriverStatus,
        now: DateTime<Utc>,
    ) -> Result<(), GeoIndexError> {
        if !valid_coordinates(point.lat, point.lon) {
            return Err(GeoIndexError::InvalidCoordinate {
                lat: point.lat,
                lon: point.lon,
            });
        }

        let entry = self.locations.entry(driver_id);
        let mut tree = self.tree.write().map_err(|_| GeoIndexError::Poisoned)?;

        match entry {
            Entry::Occupied(mut occupied) => {
                tree.remove(&SpatialEntry::new(driver_id, occupied.get().point));
                tree.insert(SpatialEntry::new(driver_id, point));

                let location = occupied.get_mut();
                location.point = point;
                location.status = status;
                location.last_updated = now;
            }
            Entry::Vacant(vacant) => {
                tree.insert(SpatialEntry::new(driver_id, point));
                vacant.insert(DriverLocation {
                    driver_id,
                    point,
                    status,
                    last_updated: now,
                });
            }
        }

        Ok(())
    }

    // Status mirror update only; a missing location record means the driver
    // has never reported a position and there is nothing to mirror.
    pub fn set_status(&self, driver_id: Uuid, status: DriverStatus) {
        if let Some(mut location) = self.locations.get_mut(&driver_id) {
            location.status = status;
        }
    }

    pub fn get(&self, driver_id: Uuid) -> Option<DriverLocation> {
        self.locations.get(&driver_id).map(|entry| entry.value().clone())
    }

    pub fn snapshot(&self) -> Vec<DriverLocation> {
        self.locations
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn nearest_available(
        &self,
        origin: GeoPoint,
        max_distance_km: f64,
    ) -> Result<Vec<Candidate>, GeoIndexError> {
        if !valid_coordinates(origin.lat, origin.lon) {
            return Err(GeoIndexError::InvalidCoordinate {
                lat: origin.lat,
                lon: origin.lon,
            });
        }
        if max_distance_km <= 0.0 {
            return Err(GeoIndexError::InvalidRadius(max_distance_km));
        }

        let radius_deg = degree_radius(origin.lat, max_distance_km);
        let in_radius: Vec<(Uuid, GeoPoint)> = {
            let tree = self.tree.read().map_err(|_| GeoIndexError::Poisoned)?;
            tree.locate_within_distance([origin.lon, origin.lat], radius_deg * radius_deg)
                .map(|entry| {
                    (
                        entry.driver_id,
                        GeoPoint {
                            lon: entry.point[0],
                            lat: entry.point[1],
                        },
                    )
                })
                .collect()
        };

        // Tree guard is dropped before the location records are consulted.
        let mut candidates: Vec<Candidate> = in_radius
            .into_iter()
            .filter_map(|(driver_id, point)| {
                let distance_km = haversine_km(&origin, &point);
                if distance_km > max_distance_km {
                    return None;
                }

                let available = self
                    .locations
                    .get(&driver_id)
                    .map(|location| location.status == DriverStatus::Available)
                    .unwrap_or(false);

                available.then_some(Candidate {
                    driver_id,
                    distance_km,
                })
            })
            .collect();

        candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(candidates)
    }

    pub fn find_nearest_available(
        &self,
        origin: GeoPoint,
        max_distance_km: f64,
    ) -> Result<Option<Candidate>, GeoIndexError> {
        Ok(self
            .nearest_available(origin, max_distance_km)?
            .into_iter()
            .next())
    }
}

impl Default for GeoIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{GeoIndex, GeoIndexError};
    use crate::models::driver::DriverStatus;
    use crate::models::location::GeoPoint;

    fn seeded(points: &[(u128, f64, f64)]) -> GeoIndex {
        let index = GeoIndex::new();
        for (seed, lat, lon) in points {
            index
                .upsert(
                    Uuid::from_u128(*seed),
                    GeoPoint::from_lat_lon(*lat, *lon),
                    DriverStatus::Available,
                    Utc::now(),
                )
                .unwrap();
        }
        index
    }

    #[test]
    fn nearest_comes_first() {
        let index = seeded(&[(1, 0.010, 0.0), (2, 0.001, 0.0), (3, 0.005, 0.0)]);

        let candidates = index
            .nearest_available(GeoPoint::from_lat_lon(0.0, 0.0), 5.0)
            .unwrap();

        let order: Vec<Uuid> = candidates.iter().map(|c| c.driver_id).collect();
        assert_eq!(
            order,
            vec![Uuid::from_u128(2), Uuid::from_u128(3), Uuid::from_u128(1)]
        );
        assert!(candidates[0].distance_km < candidates[1].distance_km);
    }

    #[test]
    fn drivers_outside_the_radius_are_excluded() {
        // ~111 km north of the origin.
        let index = seeded(&[(1, 1.0, 0.0)]);

        let nearest = index
            .find_nearest_available(GeoPoint::from_lat_lon(0.0, 0.0), 5.0)
            .unwrap();
        assert!(nearest.is_none());
    }

    #[test]
    fn busy_drivers_are_excluded() {
        let index = seeded(&[(1, 0.001, 0.0)]);
        index.set_status(Uuid::from_u128(1), DriverStatus::OnRide);

        let nearest = index
            .find_nearest_available(GeoPoint::from_lat_lon(0.0, 0.0), 5.0)
            .unwrap();
        assert!(nearest.is_none());

        index.set_status(Uuid::from_u128(1), DriverStatus::Available);
        let nearest = index
            .find_nearest_available(GeoPoint::from_lat_lon(0.0, 0.0), 5.0)
            .unwrap();
        assert_eq!(nearest.unwrap().driver_id, Uuid::from_u128(1));
    }

    #[test]
    fn reupsert_moves_the_driver() {
        let index = seeded(&[(1, 0.001, 0.0)]);
        index
            .upsert(
                Uuid::from_u128(1),
                GeoPoint::from_lat_lon(2.0, 2.0),
                DriverStatus::Available,
                Utc::now(),
            )
            .unwrap();

        let near_old = index
            .find_nearest_available(GeoPoint::from_lat_lon(0.0, 0.0), 5.0)
            .unwrap();
        assert!(near_old.is_none());

        let near_new = index
            .find_nearest_available(GeoPoint::from_lat_lon(2.0, 2.0), 5.0)
            .unwrap();
        assert_eq!(near_new.unwrap().driver_id, Uuid::from_u128(1));
        assert_eq!(index.snapshot().len(), 1);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let index = GeoIndex::new();
        let err = index
            .nearest_available(GeoPoint::from_lat_lon(91.0, 0.0), 5.0)
            .unwrap_err();
        assert!(matches!(err, GeoIndexError::InvalidCoordinate { .. }));
    }

    #[test]
    fn rejects_non_positive_radius() {
        let index = GeoIndex::new();
        let err = index
            .nearest_available(GeoPoint::from_lat_lon(0.0, 0.0), 0.0)
            .unwrap_err();
        assert!(matches!(err, GeoIndexError::InvalidRadius(_)));
    }
}
