//! Location Sources
//!
//! Abstraction over the device positioning service. A source is asked to
//! start a watch, pushes fixes or error messages into a channel tagged with
//! the watch id, and is told to clear the watch when tracking stops.

mod simulated;

pub use simulated::{SimulatedRoute, SimulatedSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::geo::LocationFix;

/// Options passed through to the positioning service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingOptions {
    /// Ask for the most accurate positioning available
    pub high_accuracy: bool,
    /// Oldest cached fix the service may hand back, in ms
    pub max_fix_age_ms: u64,
    /// How long the service may take per fix, in ms
    pub timeout_ms: u64,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_fix_age_ms: 1000,
            timeout_ms: 15000,
        }
    }
}

/// Handle identifying one active watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchId(pub u64);

/// Payload of a location event
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEventKind {
    /// A new position sample
    Fix(LocationFix),
    /// The service reported a runtime error
    Error(String),
}

/// Event pushed by a source for a given watch
#[derive(Debug, Clone, PartialEq)]
pub struct LocationEvent {
    /// Watch that produced the event
    pub watch: WatchId,
    /// Fix or error
    pub kind: LocationEventKind,
}

impl LocationEvent {
    /// Fix event
    pub fn fix(watch: WatchId, fix: LocationFix) -> Self {
        Self {
            watch,
            kind: LocationEventKind::Fix(fix),
        }
    }

    /// Error event
    pub fn error(watch: WatchId, message: impl Into<String>) -> Self {
        Self {
            watch,
            kind: LocationEventKind::Error(message.into()),
        }
    }
}

/// Channel a source pushes events into
pub type LocationSink = UnboundedSender<LocationEvent>;

/// Errors starting or running a watch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location is not available on this device: {0}")]
    Unavailable(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location service error: {0}")]
    Runtime(String),

    #[error("No async runtime available to drive the location watch")]
    NoRuntime,
}

/// Device positioning service
pub trait LocationSource: Send {
    /// Whether positioning exists at all on this device
    fn is_available(&self) -> bool;

    /// Start continuous tracking. Events for the returned watch go to `sink`.
    fn watch(
        &mut self,
        options: TrackingOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationError>;

    /// Stop a watch. Unknown ids are ignored.
    fn clear_watch(&mut self, id: WatchId);
}

impl<S: LocationSource + ?Sized> LocationSource for Box<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn watch(
        &mut self,
        options: TrackingOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationError> {
        (**self).watch(options, sink)
    }

    fn clear_watch(&mut self, id: WatchId) {
        (**self).clear_watch(id)
    }
}

/// Create the channel a controller hands to its source
pub fn location_channel() -> (LocationSink, tokio::sync::mpsc::UnboundedReceiver<LocationEvent>) {
    tokio::sync::mpsc::unbounded_channel()
}
