//! Simulated Shift
//!
//! Runs a short session against the simulated location source and prints the
//! dashboard once a second, then stops and lists the saved history.
//!
//! Usage:
//!   cargo run --example simulated_shift -- [OPTIONS]
//!
//! Options:
//!   --seconds N       Driving time before stopping (default: 15)
//!   --pause-at N      Pause for 3 s after N seconds (default: off)
//!   --earnings V      Earnings to enter (default: 42.5)
//!   --data-dir PATH   History directory (default: a temporary directory)
//!
//! Set RUST_LOG=driverdash_core=debug to see every filter verdict.

use anyhow::Context;
use driverdash_core::prelude::*;
use driverdash_core::format::{format_number, format_optional};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut seconds = 15u64;
    let mut pause_at: Option<u64> = None;
    let mut earnings = 42.5f64;
    let mut data_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--seconds" => seconds = value.context("--seconds needs a value")?.parse()?,
            "--pause-at" => pause_at = Some(value.context("--pause-at needs a value")?.parse()?),
            "--earnings" => earnings = value.context("--earnings needs a value")?.parse()?,
            "--data-dir" => data_dir = Some(value.context("--data-dir needs a value")?.into()),
            other => anyhow::bail!("unknown option: {}", other),
        }
        i += 2;
    }

    let temp = tempfile::tempdir()?;
    let dir = data_dir.unwrap_or_else(|| temp.path().to_path_buf());
    let config = DashboardConfig::load(dir.join("config.json"))?;
    let log = SessionLog::open(Box::new(FileStore::open(&dir)?), config.log_capacity);
    println!("History in {}", dir.display());
    for kind in VehicleKind::ALL {
        let marker = if kind == config.vehicles.selected { "*" } else { " " };
        let input = MetricsInput {
            elapsed_ms: 0,
            distance_km: 100.0,
            profile: config.vehicles.profile(kind),
            earnings: 0.0,
            rental_cost: 0.0,
            other_costs: 0.0,
        };
        let per_100km = driverdash_core::metrics::compute(&input);
        println!(
            "{} {:<8} {:>14}  {} per 100 km",
            marker,
            kind,
            per_100km.consumption_label,
            format_number(per_100km.energy_spend, 2)
        );
    }

    let (sink, events) = location_channel();
    let source = SimulatedSource::new(SimulatedRoute::default());
    let controller = SessionController::new(source, sink, &config).with_log(log);
    let handle = SessionRunner::spawn(
        controller,
        events,
        Duration::from_millis(config.tick_interval_ms),
    );

    handle.start()?;
    handle.set_earnings(earnings)?;

    for second in 1..=seconds {
        tokio::time::sleep(Duration::from_secs(1)).await;
        print_snapshot(&handle.snapshot());

        if pause_at == Some(second) {
            handle.pause()?;
            println!("-- paused --");
            tokio::time::sleep(Duration::from_secs(3)).await;
            print_snapshot(&handle.snapshot());
            handle.resume()?;
            println!("-- resumed --");
        }
    }

    match handle.stop().await? {
        Some(record) => println!(
            "Saved session {}: {} km, profit {}",
            record.id,
            format_number(record.distance_km, 3),
            format_number(record.final_profit, 2)
        ),
        None => println!("Session too short, nothing saved"),
    }

    for record in handle.history().await? {
        println!(
            "  {}  {:>8}  {:>8} km  {:>8}",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.vehicle,
            format_number(record.distance_km, 2),
            format_number(record.final_profit, 2)
        );
    }

    handle.shutdown().await;
    Ok(())
}

fn print_snapshot(s: &DashboardSnapshot) {
    println!(
        "{} {:<8} {:>7} km  {}/h  cost/km {}  profit {}  [{}{}]",
        s.elapsed_display,
        s.phase.label(),
        format_number(s.distance_km, 3),
        format_number(s.metrics.hourly_rate, 2),
        format_optional(s.metrics.cost_per_km, 3),
        format_number(s.metrics.final_profit, 2),
        s.gps_status,
        s.gps_accuracy_m
            .map(|a| format!(", ±{} m", format_number(a, 0)))
            .unwrap_or_default()
    );
}
