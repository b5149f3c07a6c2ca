//! Posture Sentinel - Main Entry Point
//!
//! Reads analyzed frames as JSON lines on stdin and alerts on sustained
//! bad posture or phone use.

use std::path::PathBuf;

use alerting::{AlertSink, LogSink, SoundSink};
use sentinel::{init_logging, install_metrics, run_until, Monitor, SentinelConfig};
use tokio::runtime::{Builder, Handle};
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== Posture Sentinel v{} ===", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::var_os("SENTINEL_CONFIG").map(PathBuf::from);
    let config = SentinelConfig::load(config_path.as_deref())?;

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let result = runtime.block_on(serve(config));

    // Tokio reads stdin on a blocking thread that cannot be interrupted;
    // waiting for it here would keep the process alive after Ctrl-C
    runtime.shutdown_background();
    result
}

async fn serve(config: SentinelConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = config.metrics_addr {
        install_metrics(addr)?;
    }

    let sink: Box<dyn AlertSink> = if config.silent {
        Box::new(LogSink)
    } else {
        Box::new(SoundSink::new(config.sound_config(), Handle::current()))
    };
    let mut monitor = Monitor::from_config(&config, sink)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    info!("Sentinel running. Press Ctrl-C to quit.");
    run_until(&mut monitor, tokio::io::stdin(), shutdown).await?;

    Ok(())
}
