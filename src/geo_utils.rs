//! Geographic helpers shared by the GPS observation type and the place registry.

use geo::{Centroid, MultiPoint, Point};

use crate::GpsPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters per degree of latitude (approximately constant).
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance(a: &GpsPoint, b: &GpsPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Convert a north/south offset in meters to degrees of latitude.
pub fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE_LAT
}

/// Convert an east/west offset in meters to degrees of longitude at `latitude`.
pub fn meters_to_deg_lng(meters: f64, latitude: f64) -> f64 {
    let scale = latitude.to_radians().cos().max(1e-6);
    meters / (METERS_PER_DEGREE_LAT * scale)
}

/// Planar centroid of a set of points, `None` when empty.
///
/// Fine for the small extents of a single dwell.
pub fn centroid(points: &[GpsPoint]) -> Option<GpsPoint> {
    let multi: MultiPoint<f64> = points
        .iter()
        .map(|p| Point::new(p.longitude, p.latitude))
        .collect::<Vec<_>>()
        .into();
    multi.centroid().map(|c| GpsPoint::new(c.y(), c.x()))
}
