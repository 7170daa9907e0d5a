#![allow(dead_code)]

use driverdash_core::error::{DashError, DashResult};
use driverdash_core::geo::LocationFix;
use driverdash_core::history::KeyValueStore;
use driverdash_core::location::{
    LocationError, LocationEvent, LocationSink, LocationSource, TrackingOptions, WatchId,
};
use driverdash_core::session::SessionController;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;

/// Meters per degree of latitude on the 6371 km sphere
pub const METERS_PER_DEG: f64 = 111_194.926_644_558_73;
pub const BASE_LAT: f64 = -23.55;
pub const BASE_LON: f64 = -46.63;

/// Fix `north_m` meters north of the base point
pub fn fix_north(north_m: f64, timestamp_ms: i64, accuracy_m: Option<f64>) -> LocationFix {
    LocationFix::new(
        BASE_LAT + north_m / METERS_PER_DEG,
        BASE_LON,
        timestamp_ms,
        accuracy_m,
    )
}

#[derive(Default)]
pub struct MockState {
    next_id: u64,
    active: Option<(WatchId, LocationSink)>,
    pub started: usize,
    pub cleared: Vec<WatchId>,
    pub options: Vec<TrackingOptions>,
}

/// Mock location source; clones share state so tests can drive it after
/// handing it to a controller
#[derive(Clone)]
pub struct MockSource {
    state: Arc<Mutex<MockState>>,
    available: bool,
    deny_permission: bool,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            available: true,
            deny_permission: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn denied() -> Self {
        Self {
            deny_permission: true,
            ..Self::new()
        }
    }

    /// Push a fix on the active watch. Returns false when no watch is open.
    pub fn emit(&self, fix: LocationFix) -> bool {
        let state = self.state.lock().unwrap();
        match &state.active {
            Some((id, sink)) => sink.send(LocationEvent::fix(*id, fix)).is_ok(),
            None => false,
        }
    }

    pub fn emit_error(&self, message: &str) -> bool {
        let state = self.state.lock().unwrap();
        match &state.active {
            Some((id, sink)) => sink.send(LocationEvent::error(*id, message)).is_ok(),
            None => false,
        }
    }

    pub fn active_watch(&self) -> Option<WatchId> {
        self.state.lock().unwrap().active.as_ref().map(|(id, _)| *id)
    }

    pub fn started(&self) -> usize {
        self.state.lock().unwrap().started
    }

    pub fn cleared(&self) -> Vec<WatchId> {
        self.state.lock().unwrap().cleared.clone()
    }

    pub fn last_options(&self) -> Option<TrackingOptions> {
        self.state.lock().unwrap().options.last().copied()
    }
}

impl LocationSource for MockSource {
    fn is_available(&self) -> bool {
        self.available
    }

    fn watch(
        &mut self,
        options: TrackingOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationError> {
        if self.deny_permission {
            return Err(LocationError::PermissionDenied);
        }
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = WatchId(state.next_id);
        state.active = Some((id, sink));
        state.started += 1;
        state.options.push(options);
        Ok(id)
    }

    fn clear_watch(&mut self, id: WatchId) {
        let mut state = self.state.lock().unwrap();
        if state.active.as_ref().map(|(active, _)| *active) == Some(id) {
            state.active = None;
        }
        state.cleared.push(id);
    }
}

/// Store that reads nothing and refuses every write
#[derive(Debug, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, key: &str, _value: &str) -> DashResult<()> {
        Err(DashError::Persist {
            key: key.to_string(),
            reason: "disk full".to_string(),
        })
    }
}

/// Feed every queued event to the controller
pub fn pump<S: LocationSource>(
    controller: &mut SessionController<S>,
    events: &mut UnboundedReceiver<LocationEvent>,
) {
    while let Ok(event) = events.try_recv() {
        controller.handle_location(event);
    }
}
