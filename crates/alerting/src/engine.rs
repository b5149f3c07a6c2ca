//! Alert Decision Engine

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Alert policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    /// Seconds of continuous bad behavior before an alert is eligible (default: 60)
    pub threshold_secs: f64,
    /// Seconds of silence enforced after any alert (default: 30)
    pub cooldown_secs: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            threshold_secs: 60.0,
            cooldown_secs: 30.0,
        }
    }
}

impl AlertPolicy {
    /// Create strict policy (alert sooner, repeat more often)
    pub fn strict() -> Self {
        Self {
            threshold_secs: 30.0,
            cooldown_secs: 15.0,
        }
    }

    /// Create lenient policy (tolerate longer lapses)
    pub fn lenient() -> Self {
        Self {
            threshold_secs: 120.0,
            cooldown_secs: 60.0,
        }
    }
}

/// Global alert clock shared by every source
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertClock {
    /// Tick time of the last fired alert
    last_alert: Option<f64>,
    /// Number of alerts fired
    fire_count: u64,
    /// Eligible ticks silenced by the cooldown
    suppressed_count: u64,
}

impl AlertClock {
    /// Clock that has never alerted
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick time of the last fired alert
    pub fn last_alert(&self) -> Option<f64> {
        self.last_alert
    }

    /// Number of alerts fired
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// Ticks over threshold that the cooldown kept silent
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed_count
    }

    /// Whether strictly more than `cooldown_secs` has passed since the last alert
    pub fn cooldown_elapsed(&self, now: f64, cooldown_secs: f64) -> bool {
        match self.last_alert {
            None => true,
            Some(last) => now - last > cooldown_secs,
        }
    }

    fn record_fire(&mut self, now: f64) {
        self.last_alert = Some(now);
        self.fire_count += 1;
    }
}

/// A fired alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Tick time the alert fired at
    pub at: f64,
    /// Sources over threshold when the alert fired, sorted
    pub sources: Vec<String>,
}

/// Threshold and cooldown gate over all tracked durations
#[derive(Debug, Clone)]
pub struct AlertEngine {
    policy: AlertPolicy,
}

impl AlertEngine {
    /// Create a new alert engine
    pub fn new(policy: AlertPolicy) -> Self {
        info!("Creating alert engine with policy: {:?}", policy);
        Self { policy }
    }

    /// Active threshold and cooldown
    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Decide whether this tick fires an alert.
    ///
    /// At most one alert fires per tick no matter how many sources are over
    /// threshold. The clock is only touched when an alert fires (or when an
    /// eligible tick is silenced by the cooldown, for bookkeeping).
    pub fn evaluate<'a, I>(&self, clock: &mut AlertClock, durations: I, now: f64) -> Option<AlertEvent>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut sources: Vec<String> = durations
            .into_iter()
            .filter(|(_, duration)| duration.max(0.0) >= self.policy.threshold_secs)
            .map(|(key, _)| key.to_string())
            .collect();

        if sources.is_empty() {
            return None;
        }

        if !clock.cooldown_elapsed(now, self.policy.cooldown_secs) {
            clock.suppressed_count += 1;
            metrics::counter!("sentinel_alerts_suppressed_total").increment(1);
            debug!("Alert suppressed: in cooldown period ({:?} over threshold)", sources);
            return None;
        }

        sources.sort();
        sources.dedup();
        clock.record_fire(now);
        metrics::counter!("sentinel_alerts_fired_total").increment(1);
        info!("Alert fired at {:.3}: {:?} (count: {})", now, sources, clock.fire_count);

        Some(AlertEvent { at: now, sources })
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(AlertPolicy::default())
    }
}
