//! Session stopwatch
//!
//! Tracks active time across start/pause/resume/stop. Elapsed time is always
//! derived from the wall clock (`now - start + accumulated`), never by adding
//! up ticks, so a missed or late tick can't introduce drift.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Default recompute period while running
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 250;

/// Source of wall-clock time in milliseconds since the Unix epoch
pub trait Clock: Send {
    /// Current time in milliseconds
    fn now_ms(&self) -> i64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock reading `start_ms`
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Timer / session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session
    Idle,
    /// Timing active
    Running,
    /// Timing suspended
    Paused,
}

impl SessionPhase {
    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Stopped",
            SessionPhase::Running => "Running",
            SessionPhase::Paused => "Paused",
        }
    }
}

/// Stopwatch state
#[derive(Debug, Clone)]
pub struct SessionTimer {
    phase: SessionPhase,
    start_epoch_ms: Option<i64>,
    paused_accumulated_ms: u64,
    elapsed_ms: u64,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimer {
    /// Create an idle timer
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            start_epoch_ms: None,
            paused_accumulated_ms: 0,
            elapsed_ms: 0,
        }
    }

    /// Idle -> Running. Returns false if not idle.
    pub fn start(&mut self, now_ms: i64) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.phase = SessionPhase::Running;
        self.paused_accumulated_ms = 0;
        self.start_epoch_ms = Some(now_ms);
        self.elapsed_ms = 0;
        true
    }

    /// Running -> Paused. Folds the running stretch into the accumulated total.
    pub fn pause(&mut self, now_ms: i64) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.paused_accumulated_ms = self.compute(now_ms);
        self.elapsed_ms = self.paused_accumulated_ms;
        self.phase = SessionPhase::Paused;
        true
    }

    /// Paused -> Running. Only rebases the start; the accumulated total carries over.
    pub fn resume(&mut self, now_ms: i64) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        self.start_epoch_ms = Some(now_ms);
        self.phase = SessionPhase::Running;
        true
    }

    /// Running|Paused -> Idle. Returns the final duration, or `None` when idle.
    ///
    /// A running timer takes one last reading at `now_ms` before freezing.
    pub fn stop(&mut self, now_ms: i64) -> Option<u64> {
        match self.phase {
            SessionPhase::Idle => return None,
            SessionPhase::Running => self.elapsed_ms = self.compute(now_ms),
            SessionPhase::Paused => {}
        }
        self.phase = SessionPhase::Idle;
        self.start_epoch_ms = None;
        Some(self.elapsed_ms)
    }

    /// Periodic recompute. No-op unless running.
    pub fn tick(&mut self, now_ms: i64) -> u64 {
        if self.phase == SessionPhase::Running {
            self.elapsed_ms = self.compute(now_ms);
        }
        self.elapsed_ms
    }

    fn compute(&self, now_ms: i64) -> u64 {
        let base = self.start_epoch_ms.unwrap_or(now_ms);
        // A clock stepping backwards must not make elapsed negative
        let running = now_ms.saturating_sub(base).max(0) as u64;
        running + self.paused_accumulated_ms
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Last computed elapsed time
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Active time banked before the current running stretch
    pub fn paused_accumulated_ms(&self) -> u64 {
        self.paused_accumulated_ms
    }

    /// Start of the current running stretch
    pub fn start_epoch_ms(&self) -> Option<i64> {
        self.start_epoch_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards() {
        let mut timer = SessionTimer::new();
        assert!(!timer.pause(0));
        assert!(!timer.resume(0));
        assert_eq!(timer.stop(0), None);

        assert!(timer.start(0));
        assert!(!timer.start(10));
        assert!(!timer.resume(10));
        assert!(timer.pause(100));
        assert!(!timer.pause(200));
        assert_eq!(timer.elapsed_ms(), 100);
    }

    #[test]
    fn test_tick_is_absolute() {
        let mut timer = SessionTimer::new();
        timer.start(1_000);
        // skipped ticks don't matter
        assert_eq!(timer.tick(1_250), 250);
        assert_eq!(timer.tick(9_000), 8_000);
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(5);
        let other = clock.clone();
        clock.advance(10);
        assert_eq!(other.now_ms(), 15);
        other.set(100);
        assert_eq!(clock.now_ms(), 100);
    }
}
