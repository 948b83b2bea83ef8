//! Tests for error module

use staymatch::error::StayMatchError;
use staymatch::WindowConfig;

#[test]
fn test_error_display() {
    let err = StayMatchError::NonMonotonicTimestamp {
        timestamp: 4.0,
        newest: 7.5,
    };
    assert!(err.to_string().contains("4"));
    assert!(err.to_string().contains("7.5"));
}

#[test]
fn test_config_error_names_field() {
    let err = WindowConfig::time_based(10, 10, 2.0).validate().unwrap_err();
    assert!(matches!(
        err,
        StayMatchError::InvalidConfig { field: "delta", .. }
    ));
    assert!(err.to_string().contains("delta"));
}

#[test]
fn test_config_round_trips_through_json() {
    let config = WindowConfig::count_based(30, 0.4);
    let json = serde_json::to_string(&config).unwrap();
    let back: WindowConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
    assert_eq!(back.capacity, 30);
}
