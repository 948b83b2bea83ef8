//! Tests for geo_utils module

use staymatch::GpsPoint;
use staymatch::geo_utils::*;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_haversine_distance_same_point() {
    let p = GpsPoint::new(51.5074, -0.1278);
    assert_eq!(haversine_distance(&p, &p), 0.0);
}

#[test]
fn test_haversine_distance_known_value() {
    // London to Paris is approximately 344 km
    let london = GpsPoint::new(51.5074, -0.1278);
    let paris = GpsPoint::new(48.8566, 2.3522);
    let dist = haversine_distance(&london, &paris);
    assert!(approx_eq(dist, 343_560.0, 5000.0)); // Within 5km
}

#[test]
fn test_haversine_is_symmetric() {
    let a = GpsPoint::new(47.37, 8.55);
    let b = GpsPoint::new(47.38, 8.56);
    assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
}

#[test]
fn test_degree_conversions_round_trip_distance() {
    let origin = GpsPoint::new(47.37, 8.55);
    let north = GpsPoint::new(origin.latitude + meters_to_deg_lat(100.0), origin.longitude);
    let east = GpsPoint::new(
        origin.latitude,
        origin.longitude + meters_to_deg_lng(100.0, origin.latitude),
    );
    assert!(approx_eq(haversine_distance(&origin, &north), 100.0, 1.0));
    assert!(approx_eq(haversine_distance(&origin, &east), 100.0, 1.0));
}

#[test]
fn test_centroid() {
    let points = vec![
        GpsPoint::new(51.50, -0.13),
        GpsPoint::new(51.51, -0.12),
    ];
    let c = centroid(&points).unwrap();
    assert!(approx_eq(c.latitude, 51.505, 1e-9));
    assert!(approx_eq(c.longitude, -0.125, 1e-9));
    assert!(centroid(&[]).is_none());
}
