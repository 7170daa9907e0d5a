//! Dashboard configuration stored as JSON
//!
//! Every field has a default so partial files (or none at all) load cleanly.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DashError, DashResult};
use crate::geo::FilterConfig;
use crate::history::DEFAULT_LOG_CAPACITY;
use crate::location::TrackingOptions;
use crate::timer::DEFAULT_TICK_INTERVAL_MS;
use crate::vehicle::VehicleSettings;

/// Config file name inside the data directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Thresholds deciding whether a stopped session is worth saving
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeaningfulSessionRule {
    /// Distance strictly above this (km) makes a session meaningful
    pub min_distance_km: f64,
    /// Elapsed time at or above this (ms) makes a session meaningful
    pub min_elapsed_ms: u64,
}

impl Default for MeaningfulSessionRule {
    fn default() -> Self {
        Self {
            min_distance_km: 0.05,
            min_elapsed_ms: 60_000,
        }
    }
}

impl MeaningfulSessionRule {
    /// Any earnings, real distance, or a minute of activity counts
    pub fn is_meaningful(&self, earnings: f64, distance_km: f64, elapsed_ms: u64) -> bool {
        (earnings.is_finite() && earnings > 0.0)
            || (distance_km.is_finite() && distance_km > self.min_distance_km)
            || elapsed_ms >= self.min_elapsed_ms
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Location fix filter thresholds
    pub filter: FilterConfig,
    /// Options passed to the location service
    pub tracking: TrackingOptions,
    /// Elapsed-time recompute period while running
    pub tick_interval_ms: u64,
    /// Maximum number of sessions kept in history
    pub log_capacity: usize,
    /// Rule for saving stopped sessions
    pub meaningful: MeaningfulSessionRule,
    /// Per-kind vehicle settings
    pub vehicles: VehicleSettings,
    /// Daily rental cost
    pub rental_cost: f64,
    /// Other daily costs
    pub other_costs: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            tracking: TrackingOptions::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            log_capacity: DEFAULT_LOG_CAPACITY,
            meaningful: MeaningfulSessionRule::default(),
            vehicles: VehicleSettings::default(),
            rental_cost: 0.0,
            other_costs: 0.0,
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> DashResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DashError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save as pretty JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> DashResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Per-user data directory (`<data dir>/driverdash`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("driverdash")
}

/// Default config file path
pub fn default_config_path() -> PathBuf {
    default_data_dir().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{ "tick_interval_ms": 500, "filter": { "min_step_m": 5.0 } }"#)
                .unwrap();
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.filter.min_step_m, 5.0);
        assert_eq!(config.filter.max_accuracy_m, 35.0);
        assert_eq!(config.log_capacity, 60);
        assert!(config.tracking.high_accuracy);
    }

    #[test]
    fn test_meaningful_rule() {
        let rule = MeaningfulSessionRule::default();
        assert!(!rule.is_meaningful(0.0, 0.01, 10_000));
        assert!(rule.is_meaningful(0.0, 0.0, 61_000));
        assert!(rule.is_meaningful(0.0, 0.0, 60_000));
        assert!(rule.is_meaningful(12.5, 0.0, 0));
        assert!(rule.is_meaningful(0.0, 0.051, 0));
        assert!(!rule.is_meaningful(0.0, 0.05, 0));
        assert!(!rule.is_meaningful(f64::NAN, f64::NAN, 0));
    }
}
