//! Live Metrics
//!
//! Pure derivation of cost and profit figures from the session's elapsed
//! time, distance, vehicle profile and entered amounts. Called after every
//! event that touches one of the inputs; holds no state of its own.

use serde::{Deserialize, Serialize};

use crate::format::format_number;
use crate::vehicle::{VehicleKind, VehicleProfile};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Inputs to the metrics calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsInput {
    /// Active time in milliseconds
    pub elapsed_ms: u64,
    /// Distance driven in kilometers
    pub distance_km: f64,
    /// Active vehicle profile
    pub profile: VehicleProfile,
    /// Earnings entered by the driver
    pub earnings: f64,
    /// Daily rental cost
    pub rental_cost: f64,
    /// Other daily costs (tolls, washing, ...)
    pub other_costs: f64,
}

/// Derived figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Active time in hours
    pub hours: f64,
    /// Earnings per active hour, zero before any time has elapsed
    pub hourly_rate: f64,
    /// Energy/fuel cost per km. `None` when the economy figure makes it undefined.
    pub cost_per_km: Option<f64>,
    /// kWh or liters consumed over the session distance
    pub energy_used: f64,
    /// Money spent on energy/fuel
    pub energy_spend: f64,
    /// Energy spend plus fixed costs
    pub total_costs: f64,
    /// Earnings minus total costs
    pub final_profit: f64,
    /// Vehicle kind the figures were computed for
    pub vehicle: VehicleKind,
    /// Human-readable economy, e.g. "15 kWh/100km"
    pub consumption_label: String,
}

impl Metrics {
    /// Unit of `energy_used`
    pub fn energy_unit(&self) -> &'static str {
        self.vehicle.energy_unit()
    }
}

/// Replace NaN and infinities with zero
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Compute the live metrics
pub fn compute(input: &MetricsInput) -> Metrics {
    let hours = input.elapsed_ms as f64 / MS_PER_HOUR;
    let distance_km = finite_or_zero(input.distance_km);
    let earnings = finite_or_zero(input.earnings);
    let rental = finite_or_zero(input.rental_cost);
    let other = finite_or_zero(input.other_costs);

    let (cost_per_km, energy_used, energy_spend, consumption_label) = match input.profile {
        VehicleProfile::Electric {
            price_per_kwh,
            kwh_per_100km,
        } => {
            let price = finite_or_zero(price_per_kwh);
            let kwh_per_100km = finite_or_zero(kwh_per_100km);
            let kwh_per_km = kwh_per_100km / 100.0;
            let kwh_used = distance_km * kwh_per_km;
            (
                Some(price * kwh_per_km),
                kwh_used,
                kwh_used * price,
                format!(
                    "{} {}",
                    format_number(kwh_per_100km, 2),
                    VehicleKind::Electric.economy_unit()
                ),
            )
        }
        VehicleProfile::Gasoline {
            price_per_liter,
            km_per_liter,
        }
        | VehicleProfile::Ethanol {
            price_per_liter,
            km_per_liter,
        } => {
            let price = finite_or_zero(price_per_liter);
            let km_per_liter = finite_or_zero(km_per_liter);
            let (cost_per_km, liters) = if km_per_liter > 0.0 {
                (Some(price / km_per_liter), distance_km / km_per_liter)
            } else {
                (None, 0.0)
            };
            (
                cost_per_km,
                liters,
                liters * price,
                format!(
                    "{} {}",
                    format_number(km_per_liter, 2),
                    input.profile.kind().economy_unit()
                ),
            )
        }
    };

    let hourly_rate = if hours > 0.0 { earnings / hours } else { 0.0 };
    let total_costs = energy_spend + other + rental;

    Metrics {
        hours,
        hourly_rate,
        cost_per_km,
        energy_used,
        energy_spend,
        total_costs,
        final_profit: earnings - total_costs,
        vehicle: input.profile.kind(),
        consumption_label,
    }
}
