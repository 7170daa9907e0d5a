//! Location fix filter
//!
//! Classifies each raw fix against the last reference fix. Rejected fixes
//! contribute no distance; most of them still re-anchor the reference so a
//! single bad sample can't poison every following delta.

use serde::{Deserialize, Serialize};

use super::LocationFix;

/// Default accuracy threshold in meters
pub const DEFAULT_MAX_ACCURACY_M: f64 = 35.0;
/// Default maximum plausible speed in m/s (216 km/h)
pub const DEFAULT_MAX_SPEED_MPS: f64 = 60.0;
/// Default noise floor in meters
pub const DEFAULT_MIN_STEP_M: f64 = 8.0;

/// Filter thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Fixes reporting a finite accuracy worse than this are dropped
    pub max_accuracy_m: f64,
    /// Implied speeds above this are treated as position jumps
    pub max_speed_mps: f64,
    /// Displacements below this are treated as jitter
    pub min_step_m: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: DEFAULT_MAX_ACCURACY_M,
            max_speed_mps: DEFAULT_MAX_SPEED_MPS,
            min_step_m: DEFAULT_MIN_STEP_M,
        }
    }
}

/// Outcome of classifying one fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FilterVerdict {
    /// Latitude or longitude is not a finite number. Reference unchanged.
    RejectedInvalidPosition,
    /// Accuracy estimate worse than the threshold. Reference unchanged.
    RejectedLowAccuracy,
    /// No reference yet; the fix becomes the reference.
    AcceptedFirstFix,
    /// Timestamp did not advance past the reference.
    RejectedNonPositiveInterval,
    /// Implied speed above the plausible maximum.
    RejectedSpeedSpike,
    /// Displacement below the noise floor.
    RejectedBelowNoiseFloor,
    /// Real movement, in meters.
    AcceptedDistance(f64),
}

impl FilterVerdict {
    /// Distance contributed by this verdict in meters
    pub fn distance_m(&self) -> f64 {
        match self {
            FilterVerdict::AcceptedDistance(meters) => *meters,
            _ => 0.0,
        }
    }

    /// Whether the fix was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            FilterVerdict::AcceptedFirstFix | FilterVerdict::AcceptedDistance(_)
        )
    }

    /// Whether the incoming fix replaces the reference
    pub fn updates_reference(&self) -> bool {
        !matches!(
            self,
            FilterVerdict::RejectedInvalidPosition | FilterVerdict::RejectedLowAccuracy
        )
    }
}

/// Classify `incoming` against `previous`.
///
/// Returns the verdict together with the reference fix to use for the next
/// call. The function is pure; callers own the reference.
pub fn classify(
    config: &FilterConfig,
    previous: Option<&LocationFix>,
    incoming: &LocationFix,
) -> (FilterVerdict, Option<LocationFix>) {
    if !incoming.latitude.is_finite() || !incoming.longitude.is_finite() {
        return (FilterVerdict::RejectedInvalidPosition, previous.copied());
    }

    if let Some(accuracy) = incoming.accuracy_m {
        if accuracy.is_finite() && accuracy > config.max_accuracy_m {
            return (FilterVerdict::RejectedLowAccuracy, previous.copied());
        }
    }

    let Some(last) = previous else {
        return (FilterVerdict::AcceptedFirstFix, Some(*incoming));
    };

    let dt_ms = incoming.timestamp_ms.saturating_sub(last.timestamp_ms);
    if dt_ms <= 0 {
        return (FilterVerdict::RejectedNonPositiveInterval, Some(*incoming));
    }

    let distance = last.distance_to(incoming);
    let speed = distance / (dt_ms as f64 / 1000.0);

    let verdict = if speed > config.max_speed_mps {
        FilterVerdict::RejectedSpeedSpike
    } else if distance < config.min_step_m {
        FilterVerdict::RejectedBelowNoiseFloor
    } else {
        FilterVerdict::AcceptedDistance(distance)
    };

    (verdict, Some(*incoming))
}

/// Stateful wrapper holding the current reference fix
#[derive(Debug, Clone, Default)]
pub struct GeoFilter {
    config: FilterConfig,
    reference: Option<LocationFix>,
}

impl GeoFilter {
    /// Create a filter with the given thresholds and no reference
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            reference: None,
        }
    }

    /// Classify a fix and advance the reference
    pub fn process(&mut self, fix: &LocationFix) -> FilterVerdict {
        let (verdict, reference) = classify(&self.config, self.reference.as_ref(), fix);
        self.reference = reference;
        verdict
    }

    /// Drop the reference fix
    pub fn reset(&mut self) {
        self.reference = None;
    }

    /// Current reference fix
    pub fn reference(&self) -> Option<&LocationFix> {
        self.reference.as_ref()
    }
}
