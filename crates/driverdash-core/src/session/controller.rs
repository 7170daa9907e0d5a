//! Session controller
//!
//! Owns the timer, the location filter and the distance total, and keeps the
//! location watch lifecycle attached 1:1 to the timer: start and resume open
//! a watch, pause and stop clear it. Dropping the controller clears any watch
//! still open.

use chrono::Utc;
use uuid::Uuid;

use super::{DashboardSnapshot, GpsStatus};
use crate::config::{DashboardConfig, MeaningfulSessionRule};
use crate::error::DashResult;
use crate::format::format_elapsed;
use crate::geo::{DistanceAccumulator, FilterVerdict, GeoFilter};
use crate::history::{SessionLog, SessionRecord};
use crate::location::{
    LocationEvent, LocationEventKind, LocationSink, LocationSource, TrackingOptions, WatchId,
};
use crate::metrics::{self, Metrics, MetricsInput};
use crate::timer::{Clock, SessionPhase, SessionTimer, SystemClock};
use crate::vehicle::{VehicleKind, VehicleProfile, VehicleSettings};

/// Live session state machine
pub struct SessionController<S: LocationSource> {
    source: S,
    sink: LocationSink,
    clock: Box<dyn Clock>,
    tracking: TrackingOptions,
    meaningful: MeaningfulSessionRule,

    timer: SessionTimer,
    filter: GeoFilter,
    distance: DistanceAccumulator,

    vehicles: VehicleSettings,
    earnings: f64,
    rental_cost: f64,
    other_costs: f64,

    log: Option<SessionLog>,

    watch: Option<WatchId>,
    gps_status: GpsStatus,
    gps_accuracy: Option<f64>,
    metrics: Metrics,
}

impl<S: LocationSource> SessionController<S> {
    /// Create an idle controller without history
    pub fn new(source: S, sink: LocationSink, config: &DashboardConfig) -> Self {
        let mut controller = Self {
            source,
            sink,
            clock: Box::new(SystemClock),
            tracking: config.tracking,
            meaningful: config.meaningful,
            timer: SessionTimer::new(),
            filter: GeoFilter::new(config.filter),
            distance: DistanceAccumulator::new(),
            vehicles: config.vehicles,
            earnings: 0.0,
            rental_cost: config.rental_cost,
            other_costs: config.other_costs,
            log: None,
            watch: None,
            gps_status: GpsStatus::Stopped,
            gps_accuracy: None,
            metrics: metrics::compute(&MetricsInput {
                elapsed_ms: 0,
                distance_km: 0.0,
                profile: config.vehicles.active(),
                earnings: 0.0,
                rental_cost: config.rental_cost,
                other_costs: config.other_costs,
            }),
        };
        controller.recompute();
        controller
    }

    /// Persist finished sessions into `log`
    pub fn with_log(mut self, log: SessionLog) -> Self {
        self.log = Some(log);
        self.recompute();
        self
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Idle -> Running. Resets distance and the filter, opens a watch.
    pub fn start(&mut self) -> bool {
        let now = self.clock.now_ms();
        if !self.timer.start(now) {
            return false;
        }
        self.filter.reset();
        self.distance.reset();
        self.gps_accuracy = None;
        self.start_tracking();
        self.recompute();
        tracing::info!(vehicle = %self.vehicles.selected, "session started");
        true
    }

    /// Running -> Paused. Clears the watch and the reference fix so resuming
    /// doesn't count a jump across the gap.
    pub fn pause(&mut self) -> bool {
        let now = self.clock.now_ms();
        if !self.timer.pause(now) {
            return false;
        }
        self.stop_tracking();
        self.recompute();
        tracing::info!(elapsed_ms = self.timer.elapsed_ms(), "session paused");
        true
    }

    /// Paused -> Running. Reopens the watch.
    pub fn resume(&mut self) -> bool {
        let now = self.clock.now_ms();
        if !self.timer.resume(now) {
            return false;
        }
        self.start_tracking();
        self.recompute();
        tracing::info!("session resumed");
        true
    }

    /// Running|Paused -> Idle.
    ///
    /// Always halts the timer and the watch. Returns the finalized record when
    /// the session was meaningful; the record is appended to the log if one
    /// is wired.
    pub fn stop(&mut self) -> Option<SessionRecord> {
        let now = self.clock.now_ms();
        let elapsed = self.timer.stop(now)?;
        self.stop_tracking();
        self.recompute();

        let distance_km = self.distance.total_km();
        if !self
            .meaningful
            .is_meaningful(self.earnings, distance_km, elapsed)
        {
            tracing::info!(elapsed_ms = elapsed, distance_km, "session discarded");
            return None;
        }

        let record = SessionRecord::new(Utc::now(), &self.metrics_input(), &self.metrics);
        tracing::info!(
            id = %record.id,
            elapsed_ms = elapsed,
            distance_km,
            profit = record.final_profit,
            "session finalized"
        );

        if let Some(log) = self.log.as_mut() {
            if let Err(e) = log.append(record.clone()) {
                tracing::warn!(error = %e, "failed to persist session record");
            }
        }
        Some(record)
    }

    /// Periodic recompute of elapsed time
    pub fn tick(&mut self) -> u64 {
        let elapsed = self.timer.tick(self.clock.now_ms());
        self.recompute();
        elapsed
    }

    /// Feed one event from the location source.
    ///
    /// Events from anything but the current watch are ignored. Returns the
    /// filter verdict for fixes that were processed.
    pub fn handle_location(&mut self, event: LocationEvent) -> Option<FilterVerdict> {
        if self.watch != Some(event.watch) {
            tracing::debug!(watch = event.watch.0, "ignoring event from stale watch");
            return None;
        }

        match event.kind {
            LocationEventKind::Fix(fix) => {
                self.gps_accuracy = fix.accuracy_m;
                self.gps_status = GpsStatus::Active;

                let verdict = self.filter.process(&fix);
                self.distance.add(verdict.distance_m());
                tracing::debug!(?verdict, total_km = self.distance.total_km(), "fix classified");

                self.recompute();
                Some(verdict)
            }
            LocationEventKind::Error(message) => {
                tracing::warn!(%message, "location service error");
                self.gps_status = GpsStatus::Error(message);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Update the driver's earnings
    pub fn set_earnings(&mut self, earnings: f64) {
        self.earnings = earnings;
        self.recompute();
    }

    /// Update the daily rental cost
    pub fn set_rental_cost(&mut self, cost: f64) {
        self.rental_cost = cost;
        self.recompute();
    }

    /// Update other daily costs
    pub fn set_other_costs(&mut self, cost: f64) {
        self.other_costs = cost;
        self.recompute();
    }

    /// Store a profile's figures and make it active
    pub fn set_vehicle(&mut self, profile: VehicleProfile) {
        self.vehicles.apply(profile);
        self.recompute();
    }

    /// Switch to another kind, keeping its stored figures
    pub fn select_vehicle(&mut self, kind: VehicleKind) {
        self.vehicles.selected = kind;
        self.recompute();
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Re-read the log from its store
    pub fn reload_history(&mut self) {
        if let Some(log) = self.log.as_mut() {
            log.reload();
        }
        self.recompute();
    }

    /// Delete a record. Returns whether something was removed.
    pub fn remove_record(&mut self, id: Uuid) -> DashResult<bool> {
        match self.log.as_mut() {
            Some(log) => log.remove(id),
            None => Ok(false),
        }
    }

    /// Delete every record
    pub fn clear_history(&mut self) -> DashResult<()> {
        match self.log.as_mut() {
            Some(log) => log.clear(),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Location watch
    // ------------------------------------------------------------------

    fn start_tracking(&mut self) {
        if let Some(id) = self.watch.take() {
            self.source.clear_watch(id);
        }
        if !self.source.is_available() {
            self.gps_status = GpsStatus::Unsupported;
            tracing::warn!("location unavailable, distance will not accrue");
            return;
        }

        self.gps_status = GpsStatus::RequestingPermission;
        match self.source.watch(self.tracking, self.sink.clone()) {
            Ok(id) => {
                tracing::debug!(watch = id.0, "location watch started");
                self.watch = Some(id);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to start location watch");
                self.gps_status = GpsStatus::from(&e);
            }
        }
    }

    fn stop_tracking(&mut self) {
        if let Some(id) = self.watch.take() {
            self.source.clear_watch(id);
            tracing::debug!(watch = id.0, "location watch cleared");
        }
        self.filter.reset();
        self.gps_status = GpsStatus::Stopped;
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    fn recompute(&mut self) {
        self.metrics = metrics::compute(&self.metrics_input());
    }

    /// Current inputs to the metrics calculation
    pub fn metrics_input(&self) -> MetricsInput {
        MetricsInput {
            elapsed_ms: self.timer.elapsed_ms(),
            distance_km: self.distance.total_km(),
            profile: self.vehicles.active(),
            earnings: self.earnings,
            rental_cost: self.rental_cost,
            other_costs: self.other_costs,
        }
    }

    /// Capture everything the presentation layer renders
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            phase: self.timer.phase(),
            elapsed_ms: self.timer.elapsed_ms(),
            elapsed_display: format_elapsed(self.timer.elapsed_ms() as i64),
            distance_km: self.distance.total_km(),
            earnings: self.earnings,
            rental_cost: self.rental_cost,
            other_costs: self.other_costs,
            metrics: self.metrics.clone(),
            gps_status: self.gps_status.to_string(),
            gps_accuracy_m: self.gps_accuracy,
            history_len: self.log.as_ref().map(|log| log.len()),
        }
    }

    /// Session phase
    pub fn phase(&self) -> SessionPhase {
        self.timer.phase()
    }

    /// Last computed elapsed time
    pub fn elapsed_ms(&self) -> u64 {
        self.timer.elapsed_ms()
    }

    /// Session distance in km
    pub fn distance_km(&self) -> f64 {
        self.distance.total_km()
    }

    /// Latest derived figures
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// GPS status
    pub fn gps_status(&self) -> &GpsStatus {
        &self.gps_status
    }

    /// Last reported accuracy
    pub fn gps_accuracy(&self) -> Option<f64> {
        self.gps_accuracy
    }

    /// Id of the open watch
    pub fn active_watch(&self) -> Option<WatchId> {
        self.watch
    }

    /// Vehicle settings
    pub fn vehicles(&self) -> &VehicleSettings {
        &self.vehicles
    }

    /// Session history, if wired
    pub fn log(&self) -> Option<&SessionLog> {
        self.log.as_ref()
    }
}

impl<S: LocationSource> Drop for SessionController<S> {
    fn drop(&mut self) {
        if let Some(id) = self.watch.take() {
            self.source.clear_watch(id);
        }
    }
}
