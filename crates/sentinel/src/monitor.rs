//! Tick-driven monitor

use alerting::{AlertClock, AlertEngine, AlertEvent, AlertPolicy, AlertSink};
use detection::{BehaviorSource, FrameAnalysis, PhoneDetector, PostureClassifier};
use tracing::{info, warn};
use tracking::{Signal, SourceStatus, TrackerSet};

use crate::{SentinelConfig, SentinelError};

/// Everything that changes from tick to tick
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub trackers: TrackerSet,
    pub clock: AlertClock,
}

impl MonitorState {
    pub fn new(grace_ticks: u32) -> Self {
        Self {
            trackers: TrackerSet::with_grace(grace_ticks),
            clock: AlertClock::new(),
        }
    }
}

/// Outcome of one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub now: f64,
    /// Per-source state for presentation
    pub statuses: Vec<SourceStatus>,
    /// Alert fired this tick, if any
    pub alert: Option<AlertEvent>,
}

impl TickReport {
    /// Whether any source saw its behavior this tick
    pub fn any_active(&self) -> bool {
        self.statuses.iter().any(|s| s.is_active)
    }
}

/// Owns the sources, the monitor state and the alert sink
pub struct Monitor {
    engine: AlertEngine,
    sources: Vec<Box<dyn BehaviorSource>>,
    sink: Box<dyn AlertSink>,
    state: MonitorState,
}

impl Monitor {
    /// Create a monitor with no sources
    pub fn new(policy: AlertPolicy, grace_ticks: u32, sink: Box<dyn AlertSink>) -> Self {
        Self {
            engine: AlertEngine::new(policy),
            sources: Vec::new(),
            sink,
            state: MonitorState::new(grace_ticks),
        }
    }

    /// Create a monitor watching posture and phone use
    pub fn from_config(config: &SentinelConfig, sink: Box<dyn AlertSink>) -> Result<Self, SentinelError> {
        config.validate()?;
        let monitor = Self::new(config.policy(), config.grace_ticks, sink)
            .with_source(Box::new(PostureClassifier::new(&config.detection)))
            .with_source(Box::new(PhoneDetector::new(&config.detection)));
        Ok(monitor)
    }

    /// Add a behavior source; its tracker is registered up front
    pub fn with_source(mut self, source: Box<dyn BehaviorSource>) -> Self {
        info!("Monitoring source '{}'", source.key());
        self.state.trackers.register(source.key());
        self.sources.push(source);
        self
    }

    /// Run every source over an analyzed frame, then decide
    pub fn tick(&mut self, frame: &FrameAnalysis, now: f64) -> TickReport {
        let signals: Vec<Signal> = self
            .sources
            .iter()
            .map(|source| {
                let observation = source.observe(frame);
                Signal {
                    key: source.key().to_string(),
                    active: observation.active,
                    reason: observation.reason,
                }
            })
            .collect();

        self.tick_signals(&signals, now)
    }

    /// Apply one tick of raw readings, then decide.
    ///
    /// Registered sources without a reading count as inactive.
    pub fn tick_signals(&mut self, signals: &[Signal], now: f64) -> TickReport {
        self.state.trackers.apply(signals, now);

        let alert = self
            .engine
            .evaluate(&mut self.state.clock, self.state.trackers.durations(), now);

        // Delivery outcome never feeds back into the decision
        if let Some(event) = &alert {
            if let Err(e) = self.sink.dispatch(event) {
                metrics::counter!("sentinel_sink_failures_total").increment(1);
                warn!("Alert delivery failed: {}", e);
            }
        }

        TickReport {
            now,
            statuses: self.state.trackers.snapshot(self.engine.policy().threshold_secs),
            alert,
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn policy(&self) -> &AlertPolicy {
        self.engine.policy()
    }

    /// Forget all runs and the last alert
    pub fn reset(&mut self) {
        self.state.trackers.reset();
        self.state.clock = AlertClock::new();
    }
}
