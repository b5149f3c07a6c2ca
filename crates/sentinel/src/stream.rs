//! Newline-delimited JSON frame stream
//!
//! Each line is one analyzed frame from the upstream inference stage:
//!
//! ```text
//! {"t": 12.5, "landmarks": [{"x": 0.5, "y": 0.3, "z": -0.2}, ...], "detections": []}
//! ```
//!
//! `t` (seconds) is optional; without it the tick is stamped with
//! monotonic time since the stream started.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use detection::FrameAnalysis;

use crate::monitor::Monitor;
use crate::overlay::{render, StatusLine};
use crate::SentinelError;

/// One line of the frame stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
    #[serde(flatten)]
    pub frame: FrameAnalysis,
}

/// Totals for a finished stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub alerts: u64,
    /// Lines that failed to decode and ran as empty frames
    pub undecodable: u64,
}

pub fn decode_line(line: &str) -> Result<FrameRecord, SentinelError> {
    Ok(serde_json::from_str(line)?)
}

/// Drive `monitor` with every frame in `reader` until EOF
pub async fn run<R>(monitor: &mut Monitor, reader: R) -> Result<RunSummary, SentinelError>
where
    R: AsyncRead + Unpin,
{
    let started = Instant::now();
    let mut lines = BufReader::new(reader).lines();
    let mut summary = RunSummary::default();
    let mut shown: Vec<StatusLine> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        // A frame we cannot read is a frame where nothing was detected
        let record = decode_line(&line).unwrap_or_else(|e| {
            warn!("Undecodable frame treated as empty: {}", e);
            summary.undecodable += 1;
            FrameRecord::default()
        });
        let now = record.t.unwrap_or_else(|| started.elapsed().as_secs_f64());

        let report = monitor.tick(&record.frame, now);
        summary.ticks += 1;
        if report.alert.is_some() {
            summary.alerts += 1;
        }

        let overlay = render(&report.statuses);
        if overlay != shown {
            for status in &overlay {
                info!("[{:?}] {}", status.level, status.text);
            }
            shown = overlay;
        } else {
            debug!("Tick {:.3}: unchanged", now);
        }
    }

    info!(
        "Frame stream ended: {} ticks, {} alerts, {} undecodable",
        summary.ticks, summary.alerts, summary.undecodable
    );
    Ok(summary)
}

/// Like [`run`], but stops as soon as `shutdown` resolves.
///
/// Returns `None` when interrupted. The reader is dropped without waiting
/// for its pending read, so a stalled producer cannot hold the caller.
pub async fn run_until<R, S>(
    monitor: &mut Monitor,
    reader: R,
    shutdown: S,
) -> Result<Option<RunSummary>, SentinelError>
where
    R: AsyncRead + Unpin,
    S: Future<Output = ()>,
{
    tokio::select! {
        summary = run(monitor, reader) => summary.map(Some),
        _ = shutdown => {
            info!("Interrupted, shutting down");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use alerting::{AlertPolicy, LogSink};
    use tokio::io::AsyncWriteExt;

    fn monitor(threshold_secs: f64, cooldown_secs: f64) -> Monitor {
        let config = crate::SentinelConfig {
            alert_threshold: threshold_secs,
            alert_cooldown: cooldown_secs,
            ..Default::default()
        };
        Monitor::from_config(&config, Box::new(LogSink)).unwrap()
    }

    fn phone_line(t: f64) -> String {
        format!(
            r#"{{"t": {}, "detections": [{{"class_id": 67, "confidence": 0.9, "bbox": {{"x1": 0, "y1": 0, "x2": 10, "y2": 10}}}}]}}"#,
            t
        )
    }

    #[test]
    fn test_decode_line() {
        let record = decode_line(&phone_line(3.5)).unwrap();
        assert_eq!(record.t, Some(3.5));
        assert_eq!(record.frame.detections.len(), 1);
        assert!(record.frame.landmarks.is_none());

        let record = decode_line("{}").unwrap();
        assert_eq!(record, FrameRecord::default());

        assert!(matches!(decode_line("not json"), Err(SentinelError::Decode(_))));
    }

    #[tokio::test]
    async fn test_run_counts_alerts() {
        let input: String = (0..=12).map(|t| phone_line(t as f64) + "\n").collect();
        let mut monitor = monitor(5.0, 4.0);

        let summary = run(&mut monitor, input.as_bytes()).await.unwrap();

        // Fires at 5 and 10; 9 is exactly the cooldown away
        assert_eq!(
            summary,
            RunSummary {
                ticks: 13,
                alerts: 2,
                undecodable: 0,
            }
        );
        assert_eq!(monitor.state().clock.last_alert(), Some(10.0));
    }

    #[tokio::test]
    async fn test_undecodable_line_resets_run() {
        let input = format!("{}\n{}\n\ngarbage\n{}\n", phone_line(0.0), phone_line(4.0), phone_line(6.0));
        let mut monitor = monitor(5.0, 30.0);

        let summary = run(&mut monitor, input.as_bytes()).await.unwrap();

        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.undecodable, 1);
        // The garbage line ran as an empty tick, so the run restarted at 6
        assert_eq!(summary.alerts, 0);
        assert_eq!(monitor.state().trackers.get("phone").and_then(|t| t.active_since()), Some(6.0));
        assert_eq!(monitor.policy(), &AlertPolicy { threshold_secs: 5.0, cooldown_secs: 30.0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_pending_read() {
        let (mut writer, reader) = tokio::io::duplex(1024);
        writer.write_all((phone_line(0.0) + "\n").as_bytes()).await.unwrap();
        let mut monitor = monitor(5.0, 30.0);

        // The writer stays open, so `run` alone would wait forever
        let shutdown = tokio::time::sleep(Duration::from_millis(50));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_until(&mut monitor, reader, shutdown),
        )
        .await;

        assert!(matches!(result, Ok(Ok(None))));
        assert_eq!(monitor.state().trackers.get("phone").and_then(|t| t.active_since()), Some(0.0));

        // The monitor keeps working after the stream is abandoned
        let report = monitor.tick(&FrameAnalysis::default(), 1.0);
        assert!(!report.any_active());
        drop(writer);
    }

    #[tokio::test]
    async fn test_run_until_returns_summary_at_eof() {
        let input: String = (0..=5).map(|t| phone_line(t as f64) + "\n").collect();
        let mut monitor = monitor(5.0, 30.0);

        let summary = run_until(&mut monitor, input.as_bytes(), std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.map(|s| s.alerts), Some(1));
    }
}
