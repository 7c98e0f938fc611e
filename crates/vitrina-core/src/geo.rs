//! Geographic types and proximity math
//!
//! The haversine distance between a position fix and the configured showroom
//! coordinate is the sole acceptance gate for new sessions.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        haversine_m(self, other)
    }
}

/// One position fix from the device's location capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    pub point: GeoPoint,
    /// Reported accuracy radius in meters.
    pub accuracy_m: f64,
}

/// Outcome of checking one fix against the configured target.
///
/// Computed once per probe, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCheckResult {
    pub fix: GeoFix,
    pub distance_m: f64,
    pub radius_m: f64,
}

impl GeoCheckResult {
    /// Evaluate `fix` against `target` with the allowed `radius_m`.
    pub fn evaluate(fix: GeoFix, target: GeoPoint, radius_m: f64) -> Self {
        let distance_m = fix.point.distance_m(&target);
        Self {
            fix,
            distance_m,
            radius_m,
        }
    }

    /// Whether the fix falls within the allowed radius.
    pub fn within_range(&self) -> bool {
        self.distance_m <= self.radius_m
    }
}

/// Haversine great-circle distance between two coordinates, in meters.
///
/// ```text
/// a = sin²(Δφ/2) + cos(φ1)·cos(φ2)·sin²(Δλ/2)
/// c = 2·atan2(√a, √(1−a))
/// d = R·c
/// ```
pub fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two central Buenos Aires landmarks used as the reference pair.
    const SHOWROOM: GeoPoint = GeoPoint {
        latitude: -34.5331,
        longitude: -58.5115,
    };
    const OBELISCO: GeoPoint = GeoPoint {
        latitude: -34.6037,
        longitude: -58.3816,
    };

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(haversine_m(&SHOWROOM, &SHOWROOM), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let there = haversine_m(&SHOWROOM, &OBELISCO);
        let back = haversine_m(&OBELISCO, &SHOWROOM);
        assert_eq!(there, back);
    }

    #[test]
    fn test_reference_distance_matches_closed_form() {
        // Closed-form haversine result for the reference pair.
        let expected = 14_251.224_011_815_957;
        let actual = haversine_m(&SHOWROOM, &OBELISCO);
        let relative = ((actual - expected) / expected).abs();
        assert!(
            relative < 1e-6,
            "distance {} deviates from {} (relative {})",
            actual,
            expected,
            relative
        );
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let equator = GeoPoint::new(0.0, 0.0);
        let one_north = GeoPoint::new(1.0, 0.0);
        let d = haversine_m(&equator, &one_north);
        // One degree of latitude is ~111.19 km on a 6371 km sphere.
        assert!((d - 111_194.926).abs() < 1.0);
    }

    #[test]
    fn test_check_result_within_radius() {
        // ~100 m north of the showroom.
        let fix = GeoFix {
            point: GeoPoint::new(-34.5340, -58.5115),
            accuracy_m: 15.0,
        };
        let check = GeoCheckResult::evaluate(fix, SHOWROOM, 200.0);
        assert!(check.within_range());
        assert!((check.distance_m - 100.075).abs() < 0.1);
    }

    #[test]
    fn test_check_result_out_of_range() {
        // ~595 m east of the showroom.
        let fix = GeoFix {
            point: GeoPoint::new(-34.5331, -58.5050),
            accuracy_m: 15.0,
        };
        let check = GeoCheckResult::evaluate(fix, SHOWROOM, 200.0);
        assert!(!check.within_range());
        assert!(check.distance_m > 200.0);
    }

    #[test]
    fn test_boundary_distance_counts_as_within() {
        let fix = GeoFix {
            point: SHOWROOM,
            accuracy_m: 5.0,
        };
        let check = GeoCheckResult::evaluate(fix, SHOWROOM, 0.0);
        // distance == radius passes the gate
        assert!(check.within_range());
    }
}
