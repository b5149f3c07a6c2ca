//! Posture Sentinel
//!
//! Per-frame monitoring loop: behavior sources feed duration trackers, the
//! alert engine gates on threshold and a global cooldown, and fired alerts
//! go to a best-effort sink.

pub mod config;
pub mod monitor;
pub mod overlay;
pub mod stream;

pub use self::config::SentinelConfig;
pub use monitor::{Monitor, MonitorState, TickReport};
pub use overlay::{format_time, render, StatusLevel, StatusLine};
pub use stream::{decode_line, run, run_until, FrameRecord, RunSummary};

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sentinel error types
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Detection config error: {0}")]
    Detection(#[from] detection::DetectionError),

    #[error("Undecodable frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics exporter error: {0}")]
    Metrics(String),
}

/// Initialize logging (`RUST_LOG` overrides the default `info` level)
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed by an embedding process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Serve Prometheus metrics on `addr`
pub fn install_metrics(addr: SocketAddr) -> Result<(), SentinelError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| SentinelError::Metrics(e.to_string()))?;
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
