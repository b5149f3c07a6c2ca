//! Analyzed frame types produced by the upstream inference stage

use serde::{Deserialize, Serialize};

use crate::DetectionError;

/// Normalized pose landmark (x, y in image fractions, z relative depth)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Landmarks used for posture classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseLandmarks {
    pub nose: Landmark,
    pub left_shoulder: Landmark,
    pub right_shoulder: Landmark,
}

impl PoseLandmarks {
    /// Indices in the 33-point BlazePose topology
    pub const NOSE: usize = 0;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;

    /// Extract from a full BlazePose landmark list
    pub fn from_blazepose(landmarks: &[Landmark]) -> Result<Self, DetectionError> {
        let get = |index: usize| {
            landmarks
                .get(index)
                .copied()
                .ok_or(DetectionError::MissingLandmark {
                    index,
                    available: landmarks.len(),
                })
        };

        Ok(Self {
            nose: get(Self::NOSE)?,
            left_shoulder: get(Self::LEFT_SHOULDER)?,
            right_shoulder: get(Self::RIGHT_SHOULDER)?,
        })
    }
}

/// Pixel-space bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Object detection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Everything upstream inference produced for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Full pose landmark list, absent when no person was found
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,

    /// Object detections
    #[serde(default)]
    pub detections: Vec<Detection>,
}
