//! COCO ground-truth loader.
//!
//! Reads a COCO `instances.json` export (as written by CVAT) and groups the
//! `car` and `license_plate` annotations by image:
//!
//! ```json
//! {
//!   "images": [{"id": 1, "file_name": "frame_000000.png", "width": 3840, "height": 2160}],
//!   "categories": [{"id": 1, "name": "car"}, {"id": 2, "name": "license_plate"}],
//!   "annotations": [
//!     {"image_id": 1, "category_id": 2, "bbox": [10, 10, 30, 10], "attributes": {"value": "ABC123"}}
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::annotation::{GroundTruthFrame, GroundTruthPlate};
use crate::geometry::BBox;
use crate::{Error, Result};

/// COCO category name for vehicles.
pub const CAR_CATEGORY: &str = "car";
/// COCO category name for licence plates.
pub const PLATE_CATEGORY: &str = "license_plate";

#[derive(Debug, Deserialize)]
struct CocoFile {
    #[serde(default)]
    images: Vec<CocoImage>,
    #[serde(default)]
    annotations: Vec<CocoAnnotation>,
    #[serde(default)]
    categories: Vec<CocoCategory>,
}

#[derive(Debug, Deserialize)]
struct CocoImage {
    id: u64,
    #[serde(default)]
    file_name: String,
    width: Option<f64>,
    height: Option<f64>,
}

impl CocoImage {
    /// Image size in pixels. Exporters write either `3840` or `3840.0`.
    fn canvas(&self) -> Option<(u32, u32)> {
        let to_pixels = |v: f64| (v.is_finite() && v >= 1.0).then(|| v.round() as u32);
        Some((to_pixels(self.width?)?, to_pixels(self.height?)?))
    }
}

#[derive(Debug, Deserialize)]
struct CocoCategory {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CocoAnnotation {
    image_id: u64,
    category_id: u64,
    bbox: Vec<f64>,
    #[serde(default)]
    attributes: Option<HashMap<String, serde_json::Value>>,
}

impl CocoAnnotation {
    /// The `attributes.value` text, if present.
    fn plate_text(&self) -> Option<String> {
        let value = self.attributes.as_ref()?.get("value")?;
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Parse the frame index from a file name such as `frame_000042.png`.
///
/// Returns `None` when the name does not start with `frame_<digits>.<ext>`.
pub fn frame_index_from_file_name(file_name: &str) -> Option<u64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^frame_(\d+)\.\w+").unwrap_or_else(|e| unreachable!("invalid pattern: {}", e))
    });

    let captures = pattern.captures(file_name)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Load ground-truth frames from a COCO JSON file.
///
/// A missing file is a [`Error::MissingInput`]; the run cannot proceed.
pub fn load_coco<P: AsRef<Path>>(path: P) -> Result<Vec<GroundTruthFrame>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::MissingInput(format!(
            "COCO file not found: {}",
            path.display()
        )));
    }
    let file = File::open(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("failed to open COCO file '{}': {}", path.display(), e),
        ))
    })?;
    parse_coco(BufReader::new(file))
}

/// Parse ground-truth frames from COCO JSON.
///
/// Frames are returned in the order of the `images` array. Categories other
/// than `car` and `license_plate` are ignored, as are annotations that
/// reference an unknown image or carry a malformed box.
pub fn parse_coco<R: Read>(reader: R) -> Result<Vec<GroundTruthFrame>> {
    let coco: CocoFile = serde_json::from_reader(reader)?;

    let category_names: HashMap<u64, &str> = coco
        .categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut frames: Vec<GroundTruthFrame> = Vec::with_capacity(coco.images.len());
    let mut frame_by_image: HashMap<u64, usize> = HashMap::with_capacity(coco.images.len());

    for image in &coco.images {
        let canvas = image.canvas();
        let frame_index = frame_index_from_file_name(&image.file_name);
        if frame_by_image.insert(image.id, frames.len()).is_some() {
            return Err(Error::GroundTruth(format!("duplicate image id {}", image.id)));
        }
        frames.push(GroundTruthFrame::new(image.id, frame_index, canvas));
    }

    for ann in &coco.annotations {
        let category = category_names.get(&ann.category_id).copied().unwrap_or("");
        if category != CAR_CATEGORY && category != PLATE_CATEGORY {
            continue;
        }

        let Some(&frame_idx) = frame_by_image.get(&ann.image_id) else {
            log::warn!("annotation references unknown image id {}", ann.image_id);
            continue;
        };

        let Some(bbox) = BBox::from_xywh_slice(&ann.bbox) else {
            log::warn!(
                "skipping annotation on image {}: bbox has {} values, expected 4",
                ann.image_id,
                ann.bbox.len()
            );
            continue;
        };

        let frame = &mut frames[frame_idx];
        if category == CAR_CATEGORY {
            frame.vehicles.push(bbox);
        } else {
            frame.plates.push(GroundTruthPlate {
                bbox,
                text: ann.plate_text(),
            });
        }
    }

    Ok(frames)
}
