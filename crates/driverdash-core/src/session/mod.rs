//! Live Session
//!
//! The controller state machine tying timer, location filter, distance and
//! metrics together, and an async runner that feeds it ticks, location
//! events and commands on a tokio task.

mod controller;
mod runner;

pub use controller::SessionController;
pub use runner::{SessionCommand, SessionHandle, SessionRunner};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::LocationError;
use crate::metrics::Metrics;
use crate::timer::SessionPhase;

/// Location tracking status shown to the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpsStatus {
    /// No watch running
    Stopped,
    /// Watch requested, no fix yet
    RequestingPermission,
    /// Fixes arriving
    Active,
    /// Device has no positioning
    Unsupported,
    /// Start failure or runtime error reported by the service
    Error(String),
}

impl From<&LocationError> for GpsStatus {
    fn from(err: &LocationError) -> Self {
        match err {
            LocationError::Unavailable(_) => GpsStatus::Unsupported,
            other => GpsStatus::Error(other.to_string()),
        }
    }
}

impl fmt::Display for GpsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsStatus::Stopped => write!(f, "GPS stopped"),
            GpsStatus::RequestingPermission => write!(f, "Requesting GPS permission..."),
            GpsStatus::Active => write!(f, "GPS active"),
            GpsStatus::Unsupported => write!(f, "This device has no GPS"),
            GpsStatus::Error(msg) => write!(f, "GPS error: {}", msg),
        }
    }
}

/// Everything the presentation layer renders, captured at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Session phase
    pub phase: SessionPhase,
    /// Active time in ms
    pub elapsed_ms: u64,
    /// Active time as `HHhMMmSSs`
    pub elapsed_display: String,
    /// Session distance in km
    pub distance_km: f64,
    /// Earnings entered by the driver
    pub earnings: f64,
    /// Daily rental cost
    pub rental_cost: f64,
    /// Other daily costs
    pub other_costs: f64,
    /// Derived figures
    pub metrics: Metrics,
    /// GPS status text
    pub gps_status: String,
    /// Last reported accuracy in meters
    pub gps_accuracy_m: Option<f64>,
    /// Records in the history, `None` when no log is wired
    pub history_len: Option<usize>,
}
