//! Posture classification from pose landmarks

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frame::{FrameAnalysis, PoseLandmarks};
use crate::{BehaviorSource, DetectionConfig, Observation, POSTURE_KEY};

/// Posture problems, in the order they are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostureViolation {
    /// Head ahead of the shoulders toward the camera
    SlouchingForward,
    /// Shoulders at uneven heights
    TiltingSideways,
}

impl fmt::Display for PostureViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostureViolation::SlouchingForward => write!(f, "Slouching forward"),
            PostureViolation::TiltingSideways => write!(f, "Tilting sideways"),
        }
    }
}

/// Threshold classifier over nose and shoulder landmarks
#[derive(Debug, Clone)]
pub struct PostureClassifier {
    slouch_threshold: f32,
    tilt_threshold: f32,
}

impl PostureClassifier {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            slouch_threshold: config.slouch_threshold,
            tilt_threshold: config.tilt_threshold,
        }
    }

    /// Check a pose. Slouching takes precedence over tilting.
    pub fn check(&self, pose: &PoseLandmarks) -> Option<PostureViolation> {
        let shoulder_z = (pose.left_shoulder.z + pose.right_shoulder.z) / 2.0;
        let forward_lean = shoulder_z - pose.nose.z;
        let tilt = (pose.left_shoulder.y - pose.right_shoulder.y).abs();

        if forward_lean > self.slouch_threshold {
            Some(PostureViolation::SlouchingForward)
        } else if tilt > self.tilt_threshold {
            Some(PostureViolation::TiltingSideways)
        } else {
            None
        }
    }
}

impl Default for PostureClassifier {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

impl BehaviorSource for PostureClassifier {
    fn key(&self) -> &str {
        POSTURE_KEY
    }

    fn observe(&self, frame: &FrameAnalysis) -> Observation {
        let Some(landmarks) = &frame.landmarks else {
            return Observation::inactive();
        };

        match PoseLandmarks::from_blazepose(landmarks) {
            Ok(pose) => match self.check(&pose) {
                Some(violation) => Observation::active(violation.to_string()),
                None => Observation::inactive(),
            },
            Err(e) => {
                debug!("Posture unavailable: {}", e);
                Observation::inactive()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Landmark;
    use proptest::prelude::*;

    fn pose(nose_z: f32, left_y: f32, right_y: f32) -> PoseLandmarks {
        PoseLandmarks {
            nose: Landmark::new(0.5, 0.3, nose_z),
            left_shoulder: Landmark::new(0.6, left_y, 0.0),
            right_shoulder: Landmark::new(0.4, right_y, 0.0),
        }
    }

    fn frame(pose: PoseLandmarks) -> FrameAnalysis {
        let mut landmarks = vec![Landmark::default(); 33];
        landmarks[PoseLandmarks::NOSE] = pose.nose;
        landmarks[PoseLandmarks::LEFT_SHOULDER] = pose.left_shoulder;
        landmarks[PoseLandmarks::RIGHT_SHOULDER] = pose.right_shoulder;
        FrameAnalysis {
            landmarks: Some(landmarks),
            detections: Vec::new(),
        }
    }

    #[test]
    fn test_good_posture() {
        let classifier = PostureClassifier::default();
        assert_eq!(classifier.check(&pose(-0.05, 0.6, 0.62)), None);
    }

    #[test]
    fn test_slouching() {
        let classifier = PostureClassifier::default();
        assert_eq!(
            classifier.check(&pose(-0.2, 0.6, 0.6)),
            Some(PostureViolation::SlouchingForward)
        );
    }

    #[test]
    fn test_tilting() {
        let classifier = PostureClassifier::default();
        assert_eq!(
            classifier.check(&pose(0.0, 0.6, 0.7)),
            Some(PostureViolation::TiltingSideways)
        );
    }

    #[test]
    fn test_slouch_takes_precedence() {
        let classifier = PostureClassifier::default();
        assert_eq!(
            classifier.check(&pose(-0.3, 0.5, 0.8)),
            Some(PostureViolation::SlouchingForward)
        );
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let classifier = PostureClassifier::new(&DetectionConfig {
            slouch_threshold: 0.25,
            tilt_threshold: 0.25,
            ..Default::default()
        });
        assert_eq!(classifier.check(&pose(-0.25, 0.5, 0.75)), None);
    }

    #[test]
    fn test_observe() {
        let classifier = PostureClassifier::default();

        let observation = classifier.observe(&frame(pose(-0.2, 0.6, 0.6)));
        assert!(observation.active);
        assert_eq!(observation.reason.as_deref(), Some("Slouching forward"));

        let observation = classifier.observe(&frame(pose(0.0, 0.6, 0.7)));
        assert_eq!(observation.reason.as_deref(), Some("Tilting sideways"));
    }

    #[test]
    fn test_observe_without_person() {
        let classifier = PostureClassifier::default();
        assert_eq!(classifier.observe(&FrameAnalysis::default()), Observation::inactive());

        let truncated = FrameAnalysis {
            landmarks: Some(vec![Landmark::default(); 5]),
            detections: Vec::new(),
        };
        assert!(!classifier.observe(&truncated).active);
    }

    proptest! {
        #[test]
        fn test_classification_follows_thresholds(
            slouch_threshold in 0.01f32..0.5,
            tilt_threshold in 0.01f32..0.5,
            nose_z in -1.0f32..1.0,
            left_y in 0.0f32..1.0,
            right_y in 0.0f32..1.0,
        ) {
            let classifier = PostureClassifier::new(&DetectionConfig {
                slouch_threshold,
                tilt_threshold,
                ..Default::default()
            });
            // Shoulders sit at z = 0, so the lean is exactly -nose_z
            let forward_lean = -nose_z;
            let tilt = (left_y - right_y).abs();

            let result = classifier.check(&pose(nose_z, left_y, right_y));

            if forward_lean > slouch_threshold {
                prop_assert_eq!(result, Some(PostureViolation::SlouchingForward));
            } else if tilt > tilt_threshold {
                prop_assert_eq!(result, Some(PostureViolation::TiltingSideways));
            } else {
                prop_assert_eq!(result, None);
            }
        }
    }
}
