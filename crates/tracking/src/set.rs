//! Tracker set keyed by behavior source

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tracker::DurationTracker;

/// One source's reading for a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Source key (e.g. "posture", "phone")
    pub key: String,
    /// Bad behavior detected this tick
    pub active: bool,
    /// Display reason chosen by the detector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Signal {
    /// Active reading with a display reason
    pub fn active(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            active: true,
            reason: Some(reason.into()),
        }
    }

    /// Inactive reading
    pub fn inactive(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            active: false,
            reason: None,
        }
    }
}

/// Presentation view of one tracked source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStatus {
    pub key: String,
    pub is_active: bool,
    /// Continuous active duration (seconds)
    pub duration: f64,
    /// Alert threshold the duration is measured against (seconds)
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SourceStatus {
    /// Whether the source alone makes an alert eligible
    pub fn over_threshold(&self) -> bool {
        self.duration >= self.threshold
    }

    /// Seconds left before the threshold is reached
    pub fn remaining(&self) -> f64 {
        (self.threshold - self.duration).max(0.0)
    }
}

/// Duration trackers for every known source, in registration order
#[derive(Debug, Clone, Default)]
pub struct TrackerSet {
    trackers: Vec<(String, DurationTracker)>,
    grace_ticks: u32,
}

impl TrackerSet {
    /// Create an empty set with no grace period
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set whose trackers tolerate `grace_ticks` dropouts
    pub fn with_grace(grace_ticks: u32) -> Self {
        Self {
            trackers: Vec::new(),
            grace_ticks,
        }
    }

    /// Pre-register a source key. Registering twice is a no-op.
    pub fn register(&mut self, key: &str) {
        if self.get(key).is_none() {
            debug!("Registering tracker for source '{}'", key);
            self.trackers
                .push((key.to_string(), DurationTracker::with_grace(self.grace_ticks)));
        }
    }

    /// Update one source's tracker, creating it on first use.
    /// Returns the source's current duration.
    pub fn update(&mut self, key: &str, is_active: bool, reason: Option<String>, now: f64) -> f64 {
        self.register(key);
        match self.get_mut(key) {
            Some(tracker) => tracker.update_with_reason(is_active, reason, now),
            None => 0.0,
        }
    }

    /// Apply a full tick of readings.
    ///
    /// Registered sources with no reading this tick are treated as inactive;
    /// readings for unknown keys register a new tracker.
    pub fn apply(&mut self, signals: &[Signal], now: f64) {
        for signal in signals {
            self.register(&signal.key);
        }

        for (key, tracker) in &mut self.trackers {
            match signals.iter().find(|s| s.key == *key) {
                Some(signal) => {
                    tracker.update_with_reason(signal.active, signal.reason.clone(), now);
                }
                None => {
                    tracker.update(false, now);
                }
            }
        }
    }

    /// Look up a tracker
    pub fn get(&self, key: &str) -> Option<&DurationTracker> {
        self.trackers.iter().find(|(k, _)| k == key).map(|(_, t)| t)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut DurationTracker> {
        self.trackers
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, t)| t)
    }

    /// Current duration of every source, in registration order
    pub fn durations(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.trackers.iter().map(|(k, t)| (k.as_str(), t.duration()))
    }

    /// Registered source keys
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.trackers.iter().map(|(k, _)| k.as_str())
    }

    /// Number of tracked sources
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    /// Whether no source has been seen or registered yet
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Snapshot for presentation
    pub fn snapshot(&self, threshold: f64) -> Vec<SourceStatus> {
        self.trackers
            .iter()
            .map(|(key, tracker)| SourceStatus {
                key: key.clone(),
                is_active: tracker.is_active(),
                duration: tracker.duration(),
                threshold,
                reason: tracker.reason().map(str::to_owned),
            })
            .collect()
    }

    /// Reset every tracker to idle
    pub fn reset(&mut self) {
        for (_, tracker) in &mut self.trackers {
            tracker.reset();
        }
    }
}
