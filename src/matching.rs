//! Prediction-to-ground-truth box matching.
//!
//! The matcher is greedy: it repeatedly commits to the highest-IoU pair whose
//! prediction and ground truth are both still free. This is NOT a globally
//! optimal assignment. Do not swap it for the Hungarian algorithm (or any
//! other optimal bipartite matcher): that changes reported TP/FP/FN numbers
//! and breaks comparability with historical runs.

use crate::geometry::{iou_matrix, BBox};

/// Outcome of matching one set of predictions against one set of ground truth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    /// Accepted `(prediction_index, ground_truth_index)` pairs, in acceptance order.
    pub pairs: Vec<(usize, usize)>,
    /// Prediction indices not in any pair, ascending.
    pub unmatched_predictions: Vec<usize>,
    /// Ground truth indices not in any pair, ascending.
    pub unmatched_ground_truth: Vec<usize>,
}

impl MatchResult {
    /// All predictions and ground truth unmatched.
    fn all_unmatched(n_preds: usize, n_gts: usize) -> Self {
        Self {
            pairs: Vec::new(),
            unmatched_predictions: (0..n_preds).collect(),
            unmatched_ground_truth: (0..n_gts).collect(),
        }
    }

    pub fn true_positives(&self) -> usize {
        self.pairs.len()
    }

    pub fn false_positives(&self) -> usize {
        self.unmatched_predictions.len()
    }

    pub fn false_negatives(&self) -> usize {
        self.unmatched_ground_truth.len()
    }
}

/// Greedily match predicted boxes to ground-truth boxes by descending IoU.
///
/// Only pairs with `IoU >= iou_threshold` are candidates. Candidates are
/// enumerated prediction-major and stable-sorted by IoU descending, so ties
/// keep enumeration order and the result is fully deterministic.
pub fn match_boxes(preds: &[BBox], gts: &[BBox], iou_threshold: f64) -> MatchResult {
    let n_preds = preds.len();
    let n_gts = gts.len();

    if n_preds == 0 || n_gts == 0 {
        return MatchResult::all_unmatched(n_preds, n_gts);
    }

    let ious = iou_matrix(preds, gts);

    // Collect all valid (iou, pred_idx, gt_idx) candidates
    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for i in 0..n_preds {
        for j in 0..n_gts {
            let value = ious[(i, j)];
            if value >= iou_threshold {
                candidates.push((value, i, j));
            }
        }
    }

    // Stable sort, highest IoU first
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut used_preds = vec![false; n_preds];
    let mut used_gts = vec![false; n_gts];
    let mut pairs = Vec::new();

    for (_iou, pred_idx, gt_idx) in candidates {
        if used_preds[pred_idx] || used_gts[gt_idx] {
            continue;
        }

        used_preds[pred_idx] = true;
        used_gts[gt_idx] = true;
        pairs.push((pred_idx, gt_idx));
    }

    MatchResult {
        pairs,
        unmatched_predictions: get_unmatched(&used_preds),
        unmatched_ground_truth: get_unmatched(&used_gts),
    }
}

/// Indices whose `used` flag is false, ascending.
pub fn get_unmatched(used: &[bool]) -> Vec<usize> {
    used.iter()
        .enumerate()
        .filter(|&(_, &u)| !u)
        .map(|(i, _)| i)
        .collect()
}
