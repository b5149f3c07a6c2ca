//! Behavior Duration Tracking
//!
//! Turns a stream of per-tick boolean detection signals into continuous
//! "active since" durations:
//! - One tracker per behavior source key (e.g. `posture`, `phone`)
//! - Any inactive tick resets the duration (unless a grace period is configured)
//! - Read-only status snapshots for overlay rendering

mod set;
mod tracker;

pub use set::{Signal, SourceStatus, TrackerSet};
pub use tracker::DurationTracker;
