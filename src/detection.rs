//! Predicted boxes produced by the detection / recognition pipeline.

use std::str::FromStr;

use crate::geometry::BBox;
use crate::{Error, Result};

/// The two detection classes this crate evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionKind {
    Vehicle,
    Plate,
}

impl FromStr for DetectionKind {
    type Err = Error;

    /// Parse a prediction-file keyword (`car` or `plate`, case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "car" => Ok(DetectionKind::Vehicle),
            "plate" => Ok(DetectionKind::Plate),
            other => Err(Error::InvalidDetection(format!(
                "unknown detection keyword '{}'",
                other
            ))),
        }
    }
}

/// A single predicted box.
///
/// `text` is the plate text read for this detection. `None` means no text
/// was read, which is distinct from `Some("")`.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub kind: DetectionKind,
    pub bbox: BBox,
    pub text: Option<String>,
}

impl Detection {
    pub fn new(kind: DetectionKind, bbox: BBox) -> Self {
        Self { kind, bbox, text: None }
    }

    /// Create a vehicle detection, optionally with the plate text read for it.
    pub fn vehicle(bbox: BBox, text: Option<&str>) -> Self {
        Self {
            kind: DetectionKind::Vehicle,
            bbox,
            text: text.map(str::to_string),
        }
    }

    /// Create a plate detection.
    pub fn plate(bbox: BBox) -> Self {
        Self::new(DetectionKind::Plate, bbox)
    }
}

/// All predictions for one frame, split by class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePredictions {
    pub vehicles: Vec<Detection>,
    pub plates: Vec<Detection>,
}

impl FramePredictions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detection to the list matching its kind.
    pub fn push(&mut self, detection: Detection) {
        match detection.kind {
            DetectionKind::Vehicle => self.vehicles.push(detection),
            DetectionKind::Plate => self.plates.push(detection),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty() && self.plates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len() + self.plates.len()
    }
}

impl FromIterator<Detection> for FramePredictions {
    fn from_iter<I: IntoIterator<Item = Detection>>(iter: I) -> Self {
        let mut predictions = Self::new();
        for detection in iter {
            predictions.push(detection);
        }
        predictions
    }
}
