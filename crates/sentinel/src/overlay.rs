//! Status overlay text

use serde::Serialize;
use tracking::SourceStatus;

/// Overlay line severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusLevel {
    /// Nothing detected
    Ok,
    /// Bad behavior under the alert threshold
    Warning,
    /// Bad behavior at or over the alert threshold
    Critical,
}

/// One rendered overlay line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusLine {
    pub text: String,
    pub level: StatusLevel,
}

/// Format seconds as `M:SS`
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Render one line per active source, or a single all-clear line
pub fn render(statuses: &[SourceStatus]) -> Vec<StatusLine> {
    let lines: Vec<StatusLine> = statuses
        .iter()
        .filter(|s| s.is_active)
        .map(|s| StatusLine {
            text: format!(
                "! {}: {}/{}",
                s.reason.as_deref().unwrap_or(&s.key),
                format_time(s.duration),
                format_time(s.threshold)
            ),
            level: if s.remaining() == 0.0 {
                StatusLevel::Critical
            } else {
                StatusLevel::Warning
            },
        })
        .collect();

    if lines.is_empty() {
        vec![StatusLine {
            text: "Good posture!".to_string(),
            level: StatusLevel::Ok,
        }]
    } else {
        lines
    }
}
