//! Behavior Sources
//!
//! Per-frame classification of monitored behaviors:
//! - Posture (forward slouch, sideways tilt) from pose landmarks
//! - Phone use from object detections
//!
//! Landmark extraction and object detection run upstream; sources only
//! interpret their output.

pub mod config;
pub mod frame;
pub mod phone;
pub mod posture;

pub use config::DetectionConfig;
pub use frame::{BoundingBox, Detection, FrameAnalysis, Landmark, PoseLandmarks};
pub use phone::PhoneDetector;
pub use posture::{PostureClassifier, PostureViolation};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source key for posture monitoring
pub const POSTURE_KEY: &str = "posture";

/// Source key for phone-use monitoring
pub const PHONE_KEY: &str = "phone";

/// Detection error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("Landmark {index} missing (got {available} landmarks)")]
    MissingLandmark { index: usize, available: usize },

    #[error("Invalid {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
}

/// One source's classification of a frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Bad behavior detected in this frame
    pub active: bool,

    /// Display reason when active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Region of interest for overlays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl Observation {
    /// Nothing detected
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Bad behavior detected with a display reason
    pub fn active(reason: impl Into<String>) -> Self {
        Self {
            active: true,
            reason: Some(reason.into()),
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// A monitored behavior category.
///
/// New categories plug in here without touching duration tracking or the
/// alert decision.
pub trait BehaviorSource: Send {
    /// Stable source key
    fn key(&self) -> &str;

    /// Classify one analyzed frame
    fn observe(&self, frame: &FrameAnalysis) -> Observation;
}
