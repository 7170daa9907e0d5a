//! Simulated location source
//!
//! Drives a straight-line route at constant speed with random jitter and the
//! occasional low-accuracy fix. Used for demos and tests without a device.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{LocationError, LocationEvent, LocationSink, LocationSource, TrackingOptions, WatchId};
use crate::geo::{LocationFix, EARTH_RADIUS_M};

/// Route parameters for the simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedRoute {
    /// Starting latitude in degrees
    pub start_latitude: f64,
    /// Starting longitude in degrees
    pub start_longitude: f64,
    /// Heading in degrees clockwise from north
    pub heading_deg: f64,
    /// Ground speed in m/s
    pub speed_mps: f64,
    /// Time between fixes in ms
    pub interval_ms: u64,
    /// Maximum random offset per axis in meters
    pub jitter_m: f64,
    /// Reported accuracy for good fixes in meters
    pub accuracy_m: f64,
    /// Probability that a fix is a low-accuracy outlier
    pub bad_fix_probability: f64,
    /// Timestamp of the first fix. `None` uses the wall clock at first watch.
    pub start_timestamp_ms: Option<i64>,
    /// RNG seed
    pub seed: u64,
}

impl Default for SimulatedRoute {
    fn default() -> Self {
        Self {
            start_latitude: -23.5505,
            start_longitude: -46.6333,
            heading_deg: 45.0,
            speed_mps: 11.0, // ~40 km/h city driving
            interval_ms: 1000,
            jitter_m: 2.0,
            accuracy_m: 8.0,
            bad_fix_probability: 0.05,
            start_timestamp_ms: None,
            seed: 42,
        }
    }
}

impl SimulatedRoute {
    /// Fix for the given step along the route
    pub fn fix_at(&self, step: u64, base_timestamp_ms: i64, rng: &mut StdRng) -> LocationFix {
        let along = self.speed_mps * (step as f64) * (self.interval_ms as f64 / 1000.0);
        let heading = self.heading_deg.to_radians();

        let mut north = along * heading.cos();
        let mut east = along * heading.sin();
        let mut accuracy = self.accuracy_m;

        if self.jitter_m > 0.0 {
            north += rng.gen_range(-self.jitter_m..=self.jitter_m);
            east += rng.gen_range(-self.jitter_m..=self.jitter_m);
        }

        if self.bad_fix_probability > 0.0 && rng.gen_bool(self.bad_fix_probability.min(1.0)) {
            // Outlier: poor accuracy and a sizeable offset
            accuracy = rng.gen_range(60.0..150.0);
            north += rng.gen_range(-200.0..200.0);
            east += rng.gen_range(-200.0..200.0);
        }

        let (latitude, longitude) = offset(self.start_latitude, self.start_longitude, north, east);
        let timestamp_ms = base_timestamp_ms + (step * self.interval_ms) as i64;

        LocationFix::new(latitude, longitude, timestamp_ms, Some(accuracy))
    }
}

/// Move a coordinate by meters north/east on the spherical earth
fn offset(latitude: f64, longitude: f64, north_m: f64, east_m: f64) -> (f64, f64) {
    let d_lat = north_m / EARTH_RADIUS_M;
    let d_lon = east_m / (EARTH_RADIUS_M * latitude.to_radians().cos());
    (latitude + d_lat.to_degrees(), longitude + d_lon.to_degrees())
}

/// Location source backed by [`SimulatedRoute`]
pub struct SimulatedSource {
    route: SimulatedRoute,
    available: bool,
    permission_granted: bool,
    next_id: u64,
    /// Steps emitted so far, shared across watches so resuming continues the route
    steps: Arc<AtomicU64>,
    base_timestamp_ms: Option<i64>,
    watches: HashMap<WatchId, JoinHandle<()>>,
}

impl SimulatedSource {
    /// Create a source for the given route
    pub fn new(route: SimulatedRoute) -> Self {
        Self {
            route,
            available: true,
            permission_granted: true,
            next_id: 1,
            steps: Arc::new(AtomicU64::new(0)),
            base_timestamp_ms: route.start_timestamp_ms,
            watches: HashMap::new(),
        }
    }

    /// Simulate a device without positioning
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Simulate the user denying location permission
    pub fn permission_denied(mut self) -> Self {
        self.permission_granted = false;
        self
    }

    /// Number of watches currently running
    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }
}

impl LocationSource for SimulatedSource {
    fn is_available(&self) -> bool {
        self.available
    }

    fn watch(
        &mut self,
        options: TrackingOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationError> {
        if !self.available {
            return Err(LocationError::Unavailable(
                "simulated device has no positioning".to_string(),
            ));
        }
        if !self.permission_granted {
            return Err(LocationError::PermissionDenied);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LocationError::NoRuntime)?;

        let id = WatchId(self.next_id);
        self.next_id += 1;

        let base = *self
            .base_timestamp_ms
            .get_or_insert_with(|| chrono::Utc::now().timestamp_millis());
        let route = self.route;
        let steps = Arc::clone(&self.steps);
        let interval = Duration::from_millis(route.interval_ms.max(1));

        tracing::debug!(
            watch = id.0,
            high_accuracy = options.high_accuracy,
            "simulated watch started"
        );

        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut rng = StdRng::seed_from_u64(route.seed ^ id.0);
            loop {
                ticker.tick().await;
                let step = steps.fetch_add(1, Ordering::SeqCst);
                let fix = route.fix_at(step, base, &mut rng);
                if sink.send(LocationEvent::fix(id, fix)).is_err() {
                    break;
                }
            }
        });

        self.watches.insert(id, handle);
        Ok(id)
    }

    fn clear_watch(&mut self, id: WatchId) {
        if let Some(handle) = self.watches.remove(&id) {
            handle.abort();
            tracing::debug!(watch = id.0, "simulated watch cleared");
        }
    }
}

impl Drop for SimulatedSource {
    fn drop(&mut self) {
        for (_, handle) in self.watches.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_moves_at_speed() {
        let route = SimulatedRoute {
            jitter_m: 0.0,
            bad_fix_probability: 0.0,
            ..SimulatedRoute::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let a = route.fix_at(0, 0, &mut rng);
        let b = route.fix_at(10, 0, &mut rng);

        assert_eq!(b.timestamp_ms, 10_000);
        assert!((a.distance_to(&b) - 110.0).abs() < 0.5);
    }

    #[test]
    fn test_watch_without_runtime_fails() {
        let mut source = SimulatedSource::new(SimulatedRoute::default());
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        assert_eq!(
            source.watch(TrackingOptions::default(), tx),
            Err(LocationError::NoRuntime)
        );
    }

    #[test]
    fn test_permission_denied() {
        let mut source = SimulatedSource::new(SimulatedRoute::default()).permission_denied();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        assert_eq!(
            source.watch(TrackingOptions::default(), tx),
            Err(LocationError::PermissionDenied)
        );
    }
}
