//! Detection configuration

use serde::{Deserialize, Serialize};

use crate::DetectionError;

/// COCO class id for "cell phone"
pub const COCO_CELL_PHONE: u32 = 67;

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Forward lean (shoulder z minus nose z) above which the user is slouching
    pub slouch_threshold: f32,

    /// Shoulder height difference above which the user is tilting
    pub tilt_threshold: f32,

    /// Object class reported as a phone
    pub phone_class_id: u32,

    /// Minimum detection confidence for a phone
    pub phone_min_confidence: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            slouch_threshold: 0.1,
            tilt_threshold: 0.05,
            phone_class_id: COCO_CELL_PHONE,
            phone_min_confidence: 0.0,
        }
    }
}

impl DetectionConfig {
    /// Create strict config (lower thresholds)
    pub fn strict() -> Self {
        Self {
            slouch_threshold: 0.06,
            tilt_threshold: 0.03,
            ..Default::default()
        }
    }

    /// Create lenient config (higher thresholds)
    pub fn lenient() -> Self {
        Self {
            slouch_threshold: 0.15,
            tilt_threshold: 0.08,
            phone_min_confidence: 0.5,
            ..Default::default()
        }
    }

    /// Reject thresholds that can never be met sensibly
    pub fn validate(&self) -> Result<(), DetectionError> {
        check_non_negative("slouch_threshold", self.slouch_threshold)?;
        check_non_negative("tilt_threshold", self.tilt_threshold)?;
        if !(0.0..=1.0).contains(&self.phone_min_confidence) {
            return Err(DetectionError::InvalidThreshold {
                name: "phone_min_confidence",
                value: self.phone_min_confidence,
            });
        }
        Ok(())
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), DetectionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DetectionError::InvalidThreshold { name, value })
    }
}
