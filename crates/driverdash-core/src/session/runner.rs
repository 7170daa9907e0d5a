//! Async session runner
//!
//! Runs a [`SessionController`] on a tokio task. Commands, location events and
//! timer ticks are handled one at a time, each to completion, and a fresh
//! snapshot is published after every one of them.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use uuid::Uuid;

use super::{DashboardSnapshot, SessionController};
use crate::error::{DashError, DashResult};
use crate::history::SessionRecord;
use crate::location::{LocationEvent, LocationSource};
use crate::timer::SessionPhase;
use crate::vehicle::{VehicleKind, VehicleProfile};

/// Commands accepted by the runner
#[derive(Debug)]
pub enum SessionCommand {
    /// Start a new session
    Start,
    /// Pause the running session
    Pause,
    /// Resume the paused session
    Resume,
    /// Stop and finalize; the reply carries the saved record, if any
    Stop(oneshot::Sender<Option<SessionRecord>>),
    /// Update earnings
    SetEarnings(f64),
    /// Update the daily rental cost
    SetRentalCost(f64),
    /// Update other daily costs
    SetOtherCosts(f64),
    /// Store a vehicle profile and make it active
    SetVehicle(VehicleProfile),
    /// Switch vehicle kind
    SelectVehicle(VehicleKind),
    /// Re-read history from the store
    ReloadHistory,
    /// Delete one history record
    RemoveRecord(Uuid),
    /// Delete all history
    ClearHistory,
    /// Fetch the history records, newest first
    History(oneshot::Sender<Vec<SessionRecord>>),
    /// Stop the runner
    Shutdown,
}

/// Spawns controllers onto tokio tasks
pub struct SessionRunner;

impl SessionRunner {
    /// Spawn `controller` on the current runtime.
    ///
    /// `events` must be the receiving half of the channel whose sender the
    /// controller hands to its location source.
    pub fn spawn<S>(
        controller: SessionController<S>,
        events: mpsc::UnboundedReceiver<LocationEvent>,
        tick_interval: Duration,
    ) -> SessionHandle
    where
        S: LocationSource + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

        let task = tokio::spawn(run(controller, command_rx, events, snapshot_tx, tick_interval));

        SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        }
    }
}

/// Client side of a running session
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<DashboardSnapshot>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Queue a command
    pub fn send(&self, command: SessionCommand) -> DashResult<()> {
        self.commands
            .send(command)
            .map_err(|_| DashError::RunnerClosed)
    }

    /// Start a session
    pub fn start(&self) -> DashResult<()> {
        self.send(SessionCommand::Start)
    }

    /// Pause the session
    pub fn pause(&self) -> DashResult<()> {
        self.send(SessionCommand::Pause)
    }

    /// Resume the session
    pub fn resume(&self) -> DashResult<()> {
        self.send(SessionCommand::Resume)
    }

    /// Stop the session and wait for the finalized record
    pub async fn stop(&self) -> DashResult<Option<SessionRecord>> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Stop(tx))?;
        rx.await.map_err(|_| DashError::RunnerClosed)
    }

    /// Update earnings
    pub fn set_earnings(&self, earnings: f64) -> DashResult<()> {
        self.send(SessionCommand::SetEarnings(earnings))
    }

    /// Fetch history records
    pub async fn history(&self) -> DashResult<Vec<SessionRecord>> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::History(tx))?;
        rx.await.map_err(|_| DashError::RunnerClosed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every new snapshot
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the runner and wait for it to finish. Any open watch is cleared.
    pub async fn shutdown(self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "session runner ended abnormally");
        }
    }
}

async fn run<S: LocationSource>(
    mut controller: SessionController<S>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    mut events: mpsc::UnboundedReceiver<LocationEvent>,
    snapshots: watch::Sender<DashboardSnapshot>,
    tick_interval: Duration,
) {
    let mut ticker: Option<Interval> = None;

    loop {
        sync_ticker(controller.phase(), &mut ticker, tick_interval);

        tokio::select! {
            command = commands.recv() => match command {
                None | Some(SessionCommand::Shutdown) => break,
                Some(command) => apply(&mut controller, command),
            },
            Some(event) = events.recv() => {
                controller.handle_location(event);
            }
            _ = next_tick(&mut ticker) => {
                controller.tick();
            }
        }

        // No receivers left is fine; the handle may only be sending commands
        let _ = snapshots.send(controller.snapshot());
    }

    tracing::debug!("session runner stopped");
    // Dropping the controller clears any open watch
}

fn apply<S: LocationSource>(controller: &mut SessionController<S>, command: SessionCommand) {
    match command {
        SessionCommand::Start => {
            controller.start();
        }
        SessionCommand::Pause => {
            controller.pause();
        }
        SessionCommand::Resume => {
            controller.resume();
        }
        SessionCommand::Stop(reply) => {
            let record = controller.stop();
            let _ = reply.send(record);
        }
        SessionCommand::SetEarnings(v) => controller.set_earnings(v),
        SessionCommand::SetRentalCost(v) => controller.set_rental_cost(v),
        SessionCommand::SetOtherCosts(v) => controller.set_other_costs(v),
        SessionCommand::SetVehicle(profile) => controller.set_vehicle(profile),
        SessionCommand::SelectVehicle(kind) => controller.select_vehicle(kind),
        SessionCommand::ReloadHistory => controller.reload_history(),
        SessionCommand::RemoveRecord(id) => {
            if let Err(e) = controller.remove_record(id) {
                tracing::warn!(%id, error = %e, "failed to persist record removal");
            }
        }
        SessionCommand::ClearHistory => {
            if let Err(e) = controller.clear_history() {
                tracing::warn!(error = %e, "failed to persist cleared history");
            }
        }
        SessionCommand::History(reply) => {
            let records = controller
                .log()
                .map(|log| log.records().to_vec())
                .unwrap_or_default();
            let _ = reply.send(records);
        }
        SessionCommand::Shutdown => {}
    }
}

/// The ticker only exists while running
fn sync_ticker(phase: SessionPhase, ticker: &mut Option<Interval>, period: Duration) {
    match (phase, ticker.is_some()) {
        (SessionPhase::Running, false) => {
            let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            *ticker = Some(interval);
        }
        (SessionPhase::Running, true) => {}
        (_, true) => *ticker = None,
        (_, false) => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
