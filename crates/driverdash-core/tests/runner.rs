mod common;

use std::time::Duration;

use common::{fix_north, FailingStore, MockSource};
use driverdash_core::config::DashboardConfig;
use driverdash_core::history::{MemoryStore, SessionLog};
use driverdash_core::location::location_channel;
use driverdash_core::session::{
    DashboardSnapshot, SessionCommand, SessionController, SessionHandle, SessionRunner,
};
use driverdash_core::timer::{ManualClock, SessionPhase};
use driverdash_core::vehicle::VehicleKind;
use tokio::sync::watch;
use tokio::time::timeout;

const T0: i64 = 1_767_000_000_000;

fn spawn(source: MockSource, clock: ManualClock) -> SessionHandle {
    let config = DashboardConfig::default();
    let (sink, events) = location_channel();
    let log = SessionLog::open(Box::new(MemoryStore::new()), config.log_capacity);
    let controller = SessionController::new(source, sink, &config)
        .with_log(log)
        .with_clock(clock);
    SessionRunner::spawn(
        controller,
        events,
        Duration::from_millis(config.tick_interval_ms),
    )
}

async fn wait_until<F>(rx: &mut watch::Receiver<DashboardSnapshot>, predicate: F)
where
    F: FnMut(&DashboardSnapshot) -> bool,
{
    timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("runner stopped");
}

#[tokio::test(start_paused = true)]
async fn test_stop_returns_saved_record() {
    let clock = ManualClock::new(T0);
    let handle = spawn(MockSource::new(), clock.clone());
    let mut snapshots = handle.subscribe();

    handle.start().unwrap();
    handle.set_earnings(35.0).unwrap();
    wait_until(&mut snapshots, |s| {
        s.phase == SessionPhase::Running && s.earnings == 35.0
    })
    .await;

    clock.advance(90_000);
    let record = handle.stop().await.unwrap().expect("session saved");
    assert_eq!(record.elapsed_ms, 90_000);
    assert_eq!(record.earnings, 35.0);

    let history = handle.history().await.unwrap();
    assert_eq!(history, vec![record]);
    assert_eq!(handle.snapshot().history_len, Some(1));
    assert_eq!(handle.snapshot().phase, SessionPhase::Idle);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_ticks_only_while_running() {
    let clock = ManualClock::new(T0);
    let handle = spawn(MockSource::new(), clock.clone());
    let mut snapshots = handle.subscribe();

    handle.start().unwrap();
    wait_until(&mut snapshots, |s| s.phase == SessionPhase::Running).await;

    clock.advance(5_000);
    tokio::time::sleep(Duration::from_millis(300)).await;
    wait_until(&mut snapshots, |s| s.elapsed_ms == 5_000).await;
    assert_eq!(handle.snapshot().elapsed_display, "00h00m05s");

    handle.pause().unwrap();
    wait_until(&mut snapshots, |s| s.phase == SessionPhase::Paused).await;

    // paused: no ticker, wall time moving on changes nothing
    clock.advance(60_000);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(handle.snapshot().elapsed_ms, 5_000);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_location_events_reach_the_controller() {
    let source = MockSource::new();
    let handle = spawn(source.clone(), ManualClock::new(T0));
    let mut snapshots = handle.subscribe();

    handle.start().unwrap();
    wait_until(&mut snapshots, |s| s.phase == SessionPhase::Running).await;
    assert!(source.active_watch().is_some());

    for (i, north) in [0.0, 25.0, 50.0, 75.0].into_iter().enumerate() {
        assert!(source.emit(fix_north(north, T0 + i as i64 * 2_000, Some(6.0))));
    }
    wait_until(&mut snapshots, |s| (s.distance_km - 0.075).abs() < 1e-6).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.gps_status, "GPS active");
    assert_eq!(snapshot.gps_accuracy_m, Some(6.0));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_input_commands_update_snapshot() {
    let handle = spawn(MockSource::new(), ManualClock::new(T0));
    let mut snapshots = handle.subscribe();

    handle.send(SessionCommand::SetRentalCost(20.0)).unwrap();
    handle.send(SessionCommand::SetOtherCosts(5.0)).unwrap();
    handle
        .send(SessionCommand::SelectVehicle(VehicleKind::Gasoline))
        .unwrap();
    handle.set_earnings(100.0).unwrap();

    wait_until(&mut snapshots, |s| s.earnings == 100.0).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.metrics.vehicle, VehicleKind::Gasoline);
    assert_eq!(snapshot.metrics.total_costs, 25.0);
    assert_eq!(snapshot.metrics.final_profit, 75.0);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_history_commands() {
    let clock = ManualClock::new(T0);
    let handle = spawn(MockSource::new(), clock.clone());

    for _ in 0..2 {
        handle.start().unwrap();
        // commands are handled in order, so the reply means Start has run
        handle.history().await.unwrap();
        clock.advance(120_000);
        assert!(handle.stop().await.unwrap().is_some());
    }
    let history = handle.history().await.unwrap();
    assert_eq!(history.len(), 2);

    handle
        .send(SessionCommand::RemoveRecord(history[0].id))
        .unwrap();
    assert_eq!(handle.history().await.unwrap(), vec![history[1].clone()]);

    handle.send(SessionCommand::ClearHistory).unwrap();
    assert!(handle.history().await.unwrap().is_empty());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_clears_watch() {
    let source = MockSource::new();
    let handle = spawn(source.clone(), ManualClock::new(T0));
    let mut snapshots = handle.subscribe();

    handle.start().unwrap();
    wait_until(&mut snapshots, |s| s.phase == SessionPhase::Running).await;
    assert!(source.active_watch().is_some());

    handle.shutdown().await;
    assert_eq!(source.active_watch(), None);
    assert_eq!(source.cleared().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_persist_failures_keep_runner_alive() {
    let clock = ManualClock::new(T0);
    let config = DashboardConfig::default();
    let (sink, events) = location_channel();
    let controller = SessionController::new(MockSource::new(), sink, &config)
        .with_log(SessionLog::open(Box::new(FailingStore), config.log_capacity))
        .with_clock(clock.clone());
    let handle = SessionRunner::spawn(controller, events, Duration::from_millis(250));

    handle.start().unwrap();
    handle.history().await.unwrap();
    clock.advance(120_000);
    let record = handle.stop().await.unwrap().expect("record returned");
    assert_eq!(handle.history().await.unwrap(), vec![record.clone()]);

    handle.send(SessionCommand::RemoveRecord(record.id)).unwrap();
    assert!(handle.history().await.unwrap().is_empty());
    handle.send(SessionCommand::ClearHistory).unwrap();

    // still answering after both failed writes
    handle.start().unwrap();
    assert!(handle.history().await.unwrap().is_empty());
    assert_eq!(handle.snapshot().phase, SessionPhase::Running);

    handle.shutdown().await;
}
