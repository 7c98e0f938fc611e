//! The persisted session record
//!
//! A `SessionRecord` proves a recent successful proximity verification. It is
//! created on grant, read on every page activation, deleted on hard expiry,
//! and never updated in place.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Storage key under which the record is persisted.
pub const SESSION_STORAGE_KEY: &str = "showroomSession";

/// Coordinate captured at verification time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionLocation {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeoPoint> for SessionLocation {
    fn from(point: GeoPoint) -> Self {
        Self {
            lat: point.latitude,
            lng: point.longitude,
        }
    }
}

/// Proof of a recent proximity verification.
///
/// Persisted as `{"timestamp": <epoch-ms>, "location": {"lat": .., "lng": ..}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Grant time in epoch milliseconds.
    pub timestamp: i64,
    /// Where the device was when the session was granted.
    pub location: SessionLocation,
}

impl SessionRecord {
    /// Create a record granted now at `point`.
    pub fn granted_now(point: GeoPoint) -> Self {
        Self::granted_at(Utc::now().timestamp_millis(), point)
    }

    /// Create a record granted at `timestamp` (epoch ms) at `point`.
    pub fn granted_at(timestamp: i64, point: GeoPoint) -> Self {
        Self {
            timestamp,
            location: point.into(),
        }
    }

    /// Whether the record still grants access at `now` (epoch ms).
    ///
    /// Valid while `now - timestamp < session_duration`.
    pub fn is_valid_at(&self, now: i64, session_duration: Duration) -> bool {
        now - self.timestamp < session_duration.as_millis() as i64
    }

    /// Whether the record still grants access right now.
    pub fn is_valid(&self, session_duration: Duration) -> bool {
        self.is_valid_at(Utc::now().timestamp_millis(), session_duration)
    }
}
