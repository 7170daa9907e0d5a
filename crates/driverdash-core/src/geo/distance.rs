//! Session distance accumulator

/// Running distance total for the active session, in kilometers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceAccumulator {
    total_km: f64,
}

impl DistanceAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contribution in meters. Negative or non-finite values are ignored
    /// so the total never decreases.
    pub fn add(&mut self, meters: f64) {
        if meters.is_finite() && meters > 0.0 {
            self.total_km += meters / 1000.0;
        }
    }

    /// Zero the total
    pub fn reset(&mut self) {
        self.total_km = 0.0;
    }

    /// Total distance in kilometers
    pub fn total_km(&self) -> f64 {
        self.total_km
    }
}
