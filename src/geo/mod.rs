pub mod index;

use crate::models::location::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;
const KM_PER_DEGREE_LAT: f64 = 110.574;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lon = (delta_lon / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

pub fn valid_coordinates(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

// Conservative radius in degree space: covers every point within `km`
// great-circle distance of a point at latitude `lat`. Longitude degrees
// shrink by cos(lat), so the bound widens toward the poles.
pub fn degree_radius(lat: f64, km: f64) -> f64 {
    let lat_deg = km / KM_PER_DEGREE_LAT;
    let cos_lat = lat.to_radians().cos().abs().max(0.01);
    let lon_deg = lat_deg / cos_lat;
    (lat_deg * lat_deg + lon_deg * lon_deg).sqrt()
}
