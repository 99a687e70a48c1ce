//! Ground-truth annotations for one frame.

use crate::geometry::BBox;

/// A ground-truth licence plate box with its optional transcribed text.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruthPlate {
    pub bbox: BBox,
    pub text: Option<String>,
}

impl GroundTruthPlate {
    pub fn new(bbox: BBox, text: Option<&str>) -> Self {
        Self {
            bbox,
            text: text.map(str::to_string),
        }
    }
}

/// Ground truth for a single annotated frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruthFrame {
    /// Identifier assigned by the annotation tool.
    pub image_id: u64,
    /// Frame index parsed from the image file name. `None` when the name does
    /// not follow the `frame_NNNNNN.ext` pattern; such frames are skipped.
    pub frame_index: Option<u64>,
    /// Canvas `(width, height)` the boxes were drawn on, if known.
    pub canvas: Option<(u32, u32)>,
    pub vehicles: Vec<BBox>,
    pub plates: Vec<GroundTruthPlate>,
}

impl GroundTruthFrame {
    pub fn new(image_id: u64, frame_index: Option<u64>, canvas: Option<(u32, u32)>) -> Self {
        Self {
            image_id,
            frame_index,
            canvas,
            vehicles: Vec::new(),
            plates: Vec::new(),
        }
    }

    /// Plate boxes without their text, in annotation order.
    pub fn plate_boxes(&self) -> Vec<BBox> {
        self.plates.iter().map(|p| p.bbox).collect()
    }
}
