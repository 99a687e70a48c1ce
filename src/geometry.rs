//! Bounding box geometry: format conversion, IoU and resolution rescaling.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Axis-aligned box stored as (left, top, width, height).
///
/// Width and height are expected to be non-negative. Degenerate boxes are
/// allowed; they simply never overlap anything.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Build from a COCO-style `[x, y, w, h]` slice.
    pub fn from_xywh_slice(values: &[f64]) -> Option<Self> {
        match values {
            [x, y, w, h] => Some(Self::new(*x, *y, *w, *h)),
            _ => None,
        }
    }

    /// Convert to corner format `(x1, y1, x2, y2)`.
    pub fn to_xyxy(&self) -> (f64, f64, f64, f64) {
        (
            self.left,
            self.top,
            self.left + self.width,
            self.top + self.height,
        )
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Geometric centre `(cx, cy)`.
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Whether `(x, y)` lies inside the box, boundary included.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let (x1, y1, x2, y2) = self.to_xyxy();
        x1 <= x && x <= x2 && y1 <= y && y <= y2
    }

    /// Map a box from one image resolution into another.
    ///
    /// `left` and `width` are multiplied by `scale_x`, `top` and `height` by
    /// `scale_y`.
    pub fn rescale(&self, scale_x: f64, scale_y: f64) -> Self {
        Self {
            left: self.left * scale_x,
            top: self.top * scale_y,
            width: self.width * scale_x,
            height: self.height * scale_y,
        }
    }
}

/// Intersection over union of two boxes.
///
/// Returns exactly `0.0` when the boxes do not overlap (touching edges count
/// as no overlap) or when the union is empty.
pub fn iou(a: &BBox, b: &BBox) -> f64 {
    let (ax1, ay1, ax2, ay2) = a.to_xyxy();
    let (bx1, by1, bx2, by2) = b.to_xyxy();

    let inter_x1 = ax1.max(bx1);
    let inter_y1 = ay1.max(by1);
    let inter_x2 = ax2.min(bx2);
    let inter_y2 = ay2.min(by2);

    if inter_x2 <= inter_x1 || inter_y2 <= inter_y1 {
        return 0.0;
    }

    let inter_area = (inter_x2 - inter_x1) * (inter_y2 - inter_y1);
    let union_area = a.area() + b.area() - inter_area;

    if union_area > 0.0 {
        inter_area / union_area
    } else {
        0.0
    }
}

/// Compute the IoU matrix between two sets of boxes.
///
/// # Returns
/// Matrix of shape (preds.len(), gts.len()), entry (i, j) = iou(preds[i], gts[j])
pub fn iou_matrix(preds: &[BBox], gts: &[BBox]) -> DMatrix<f64> {
    let n = preds.len();
    let m = gts.len();

    if n == 0 || m == 0 {
        return DMatrix::zeros(n, m);
    }

    DMatrix::from_fn(n, m, |i, j| iou(&preds[i], &gts[j]))
}
