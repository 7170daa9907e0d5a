//! Geo Primitives
//!
//! Location fixes, great-circle distance and the fix filter that turns a noisy
//! stream of positions into trustworthy distance.

mod distance;
mod filter;

pub use distance::DistanceAccumulator;
pub use filter::{classify, FilterConfig, FilterVerdict, GeoFilter};

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters (spherical approximation)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// One device location sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Horizontal accuracy estimate in meters, if the source reports one
    pub accuracy_m: Option<f64>,
}

impl LocationFix {
    /// Create a new fix
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64, accuracy_m: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp_ms,
            accuracy_m,
        }
    }

    /// Great-circle distance to another fix in meters
    pub fn distance_to(&self, other: &LocationFix) -> f64 {
        haversine_meters(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine distance between two coordinates in degrees, returned in meters
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // asin argument can creep past 1.0 for antipodal points
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
