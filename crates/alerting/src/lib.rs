//! Alerting System
//!
//! Decides when sustained bad behavior turns into an alert, enforces one
//! global cooldown across all sources, and delivers fired alerts to sinks.

mod engine;
mod error;
mod sink;

pub use engine::{AlertClock, AlertEngine, AlertEvent, AlertPolicy};
pub use error::SinkError;
pub use sink::{select_sound, AlertSink, LogSink, PlayerCommand, SoundConfig, SoundSink};
