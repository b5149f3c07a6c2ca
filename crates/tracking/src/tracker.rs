//! Per-source duration tracker

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Continuous-activity tracker for a single behavior source.
///
/// Timestamps are seconds on a caller-supplied clock that is expected to be
/// monotonically non-decreasing. Durations are never negative: a `now`
/// earlier than the start of the current run reports `0`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationTracker {
    /// Start of the current active run
    active_since: Option<f64>,

    /// Consecutive inactive ticks tolerated before the run is reset
    grace_ticks: u32,

    /// Consecutive inactive ticks seen inside the current run
    missed_ticks: u32,

    /// Most recent raw signal
    last_signal: bool,

    /// Reason supplied with the most recent active tick
    reason: Option<String>,

    /// Duration computed on the most recent update
    duration: f64,
}

impl DurationTracker {
    /// Create a tracker that resets on the first inactive tick
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker that tolerates up to `grace_ticks` consecutive
    /// inactive ticks before resetting
    pub fn with_grace(grace_ticks: u32) -> Self {
        Self {
            grace_ticks,
            ..Default::default()
        }
    }

    /// Feed one tick and return the current continuous duration.
    ///
    /// | `active_since` | `is_active` | Result |
    /// |----------------|-------------|--------|
    /// | unset | true | starts the run, `0` |
    /// | set | true | `now - active_since` |
    /// | set | false, within grace | `now - active_since` |
    /// | any | false | clears the run, `0` |
    pub fn update(&mut self, is_active: bool, now: f64) -> f64 {
        self.last_signal = is_active;

        let duration = if is_active {
            self.missed_ticks = 0;
            match self.active_since {
                Some(since) => elapsed(since, now),
                None => {
                    debug!("Run started at {:.3}", now);
                    self.active_since = Some(now);
                    0.0
                }
            }
        } else {
            self.reason = None;
            match self.active_since {
                Some(since) if self.missed_ticks < self.grace_ticks => {
                    self.missed_ticks += 1;
                    elapsed(since, now)
                }
                Some(since) => {
                    debug!("Run ended after {:.3}s", elapsed(since, now));
                    self.clear();
                    0.0
                }
                None => 0.0,
            }
        };

        self.duration = duration;
        duration
    }

    /// Feed one tick together with the display reason chosen upstream
    pub fn update_with_reason(&mut self, is_active: bool, reason: Option<String>, now: f64) -> f64 {
        let duration = self.update(is_active, now);
        if is_active {
            self.reason = reason;
        }
        duration
    }

    /// Whether the most recent signal was active
    pub fn is_active(&self) -> bool {
        self.last_signal
    }

    /// Start of the current run, if any
    pub fn active_since(&self) -> Option<f64> {
        self.active_since
    }

    /// Duration computed on the most recent update
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Reason from the most recent active tick
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Inactive ticks absorbed by the grace period in the current run
    pub fn missed_ticks(&self) -> u32 {
        self.missed_ticks
    }

    /// Reset to the idle state, keeping the grace configuration
    pub fn reset(&mut self) {
        self.clear();
        self.last_signal = false;
        self.reason = None;
    }

    fn clear(&mut self) {
        self.active_since = None;
        self.missed_ticks = 0;
        self.duration = 0.0;
    }
}

/// Clamped elapsed time; skewed clocks never produce negative durations
fn elapsed(since: f64, now: f64) -> f64 {
    (now - since).max(0.0)
}
