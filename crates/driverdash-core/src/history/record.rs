//! Finalized session records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::{Metrics, MetricsInput};
use crate::vehicle::VehicleKind;

/// One finished session as stored in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Unique id
    pub id: Uuid,
    /// When the session was finalized
    pub created_at: DateTime<Utc>,
    /// Vehicle kind active at finalize time
    pub vehicle: VehicleKind,
    /// Distance in km
    pub distance_km: f64,
    /// Active duration in ms
    pub elapsed_ms: u64,
    /// Earnings entered by the driver
    pub earnings: f64,
    /// Energy/fuel spend
    pub energy_spend: f64,
    /// Daily rental cost
    pub rental_cost: f64,
    /// Other daily costs
    pub other_costs: f64,
    /// earnings - (energy_spend + other_costs + rental_cost)
    pub final_profit: f64,
}

impl SessionRecord {
    /// Build a record from the inputs and metrics of a finished session
    pub fn new(created_at: DateTime<Utc>, input: &MetricsInput, metrics: &Metrics) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            id: Uuid::new_v4(),
            created_at,
            vehicle: metrics.vehicle,
            distance_km: finite(input.distance_km).max(0.0),
            elapsed_ms: input.elapsed_ms,
            earnings: finite(input.earnings),
            energy_spend: metrics.energy_spend,
            rental_cost: finite(input.rental_cost),
            other_costs: finite(input.other_costs),
            final_profit: metrics.final_profit,
        }
    }

    /// Total costs charged against the session
    pub fn total_costs(&self) -> f64 {
        self.energy_spend + self.other_costs + self.rental_cost
    }
}
