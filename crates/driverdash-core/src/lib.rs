//! # DriverDash Core Library
//!
//! Core functionality for the DriverDash live earnings dashboard.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Location fix filtering and session distance
//! - A pause-aware session stopwatch
//! - Live cost and profit metrics per vehicle profile
//! - A session controller and async runner wiring it all together
//! - A bounded, persisted history of finished sessions
//!
//! ## Example
//!
//! ```rust,ignore
//! use driverdash_core::prelude::*;
//!
//! let config = DashboardConfig::load(default_config_path())?;
//! let store = FileStore::open(default_data_dir())?;
//! let log = SessionLog::open(Box::new(store), config.log_capacity);
//!
//! let (sink, events) = location_channel();
//! let controller = SessionController::new(SimulatedSource::new(SimulatedRoute::default()), sink, &config)
//!     .with_log(log);
//! let handle = SessionRunner::spawn(controller, events, Duration::from_millis(config.tick_interval_ms));
//!
//! handle.start()?;
//! handle.set_earnings(42.0)?;
//! let record = handle.stop().await?;
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod history;
pub mod location;
pub mod metrics;
pub mod session;
pub mod timer;
pub mod vehicle;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{default_config_path, default_data_dir, DashboardConfig};
    pub use crate::error::{DashError, DashResult};
    pub use crate::geo::{FilterConfig, FilterVerdict, GeoFilter, LocationFix};
    pub use crate::history::{FileStore, KeyValueStore, MemoryStore, SessionLog, SessionRecord};
    pub use crate::location::{
        location_channel, LocationError, LocationEvent, LocationSource, SimulatedRoute,
        SimulatedSource, TrackingOptions, WatchId,
    };
    pub use crate::metrics::{Metrics, MetricsInput};
    pub use crate::session::{
        DashboardSnapshot, GpsStatus, SessionCommand, SessionController, SessionHandle,
        SessionRunner,
    };
    pub use crate::timer::{Clock, ManualClock, SessionPhase, SessionTimer, SystemClock};
    pub use crate::vehicle::{VehicleKind, VehicleProfile, VehicleSettings};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
