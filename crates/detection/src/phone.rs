//! Phone-use detection from object detections

use crate::frame::{Detection, FrameAnalysis};
use crate::{BehaviorSource, DetectionConfig, Observation, PHONE_KEY};

/// Flags frames where the object detector reported a phone
#[derive(Debug, Clone)]
pub struct PhoneDetector {
    class_id: u32,
    min_confidence: f32,
}

impl PhoneDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            class_id: config.phone_class_id,
            min_confidence: config.phone_min_confidence,
        }
    }

    /// First detection that counts as a phone
    pub fn find<'a>(&self, detections: &'a [Detection]) -> Option<&'a Detection> {
        detections
            .iter()
            .find(|d| d.class_id == self.class_id && d.confidence >= self.min_confidence)
    }
}

impl Default for PhoneDetector {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

impl BehaviorSource for PhoneDetector {
    fn key(&self) -> &str {
        PHONE_KEY
    }

    fn observe(&self, frame: &FrameAnalysis) -> Observation {
        match self.find(&frame.detections) {
            Some(phone) => Observation::active("Phone detected").with_bbox(phone.bbox),
            None => Observation::inactive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::BoundingBox;

    fn detection(class_id: u32, confidence: f32, x1: i32) -> Detection {
        Detection {
            class_id,
            confidence,
            bbox: BoundingBox {
                x1,
                y1: 10,
                x2: x1 + 40,
                y2: 90,
            },
        }
    }

    fn frame(detections: Vec<Detection>) -> FrameAnalysis {
        FrameAnalysis {
            landmarks: None,
            detections,
        }
    }

    #[test]
    fn test_no_phone() {
        let detector = PhoneDetector::default();
        // 0 = person, 63 = laptop
        let observation = detector.observe(&frame(vec![detection(0, 0.9, 0), detection(63, 0.8, 100)]));
        assert_eq!(observation, Observation::inactive());
    }

    #[test]
    fn test_first_phone_box_reported() {
        let detector = PhoneDetector::default();
        let observation = detector.observe(&frame(vec![
            detection(0, 0.9, 0),
            detection(67, 0.4, 200),
            detection(67, 0.9, 300),
        ]));

        assert!(observation.active);
        assert_eq!(observation.reason.as_deref(), Some("Phone detected"));
        assert_eq!(observation.bbox.map(|b| b.x1), Some(200));
    }

    #[test]
    fn test_min_confidence() {
        let detector = PhoneDetector::new(&DetectionConfig {
            phone_min_confidence: 0.5,
            ..Default::default()
        });
        let observation = detector.observe(&frame(vec![detection(67, 0.4, 200), detection(67, 0.9, 300)]));
        assert_eq!(observation.bbox.map(|b| b.x1), Some(300));

        assert!(!detector.observe(&frame(vec![detection(67, 0.2, 0)])).active);
    }

    #[test]
    fn test_custom_class() {
        let detector = PhoneDetector::new(&DetectionConfig {
            phone_class_id: 5,
            ..Default::default()
        });
        assert!(detector.observe(&frame(vec![detection(5, 0.6, 0)])).active);
        assert!(!detector.observe(&frame(vec![detection(67, 0.6, 0)])).active);
    }
}
