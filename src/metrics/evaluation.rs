//! Frame and run evaluation.

use crate::annotation::GroundTruthFrame;
use crate::association::associate_plates_to_cars;
use crate::config::EvaluationConfig;
use crate::detection::{Detection, FramePredictions};
use crate::geometry::BBox;
use crate::matching::match_boxes;
use crate::text::{character_error_rate, is_exact_match};
use crate::Result;

use super::accumulator::{DetectionCounts, EvaluationCounts};
use super::detection_parser::PredictionSource;
use super::summary::Summary;

/// Totals of a whole run plus bookkeeping about which frames took part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    pub counts: EvaluationCounts,
    /// Frames that contributed to `counts`.
    pub frames_evaluated: usize,
    /// Frames whose identifier could not be mapped to a prediction key.
    pub frames_skipped: usize,
}

impl EvaluationReport {
    pub fn summary(&self) -> Summary {
        Summary::from(&self.counts)
    }

    fn record(&mut self, frame: Option<EvaluationCounts>) {
        match frame {
            Some(counts) => {
                self.counts += counts;
                self.frames_evaluated += 1;
            }
            None => self.frames_skipped += 1,
        }
    }
}

/// Rescale every detection into ground-truth coordinates.
fn rescaled_boxes(detections: &[Detection], scale_x: f64, scale_y: f64) -> Vec<BBox> {
    detections
        .iter()
        .map(|d| d.bbox.rescale(scale_x, scale_y))
        .collect()
}

/// Score one frame's predictions against its ground truth.
///
/// `predictions` must be in the configured prediction resolution; they are
/// rescaled onto the frame's canvas (or the fallback canvas) before matching.
/// Vehicles and plates are matched independently. Plate text is scored only
/// for matched vehicles whose ground-truth car has an associated plate.
pub fn evaluate_frame(
    frame: &GroundTruthFrame,
    predictions: &FramePredictions,
    config: &EvaluationConfig,
) -> EvaluationCounts {
    let canvas = frame.canvas.unwrap_or(config.fallback_canvas);
    let (scale_x, scale_y) = config.scale_to(canvas);

    let pred_cars = rescaled_boxes(&predictions.vehicles, scale_x, scale_y);
    let pred_plates = rescaled_boxes(&predictions.plates, scale_x, scale_y);
    let gt_plates = frame.plate_boxes();

    let mut counts = EvaluationCounts::new();

    let car_match = match_boxes(&pred_cars, &frame.vehicles, config.iou_threshold);
    counts.car = DetectionCounts::from_match(&car_match);

    let plate_match = match_boxes(&pred_plates, &gt_plates, config.iou_threshold);
    counts.plate = DetectionCounts::from_match(&plate_match);

    let gt_car_to_plate = associate_plates_to_cars(&frame.plates, &frame.vehicles);

    for &(pred_idx, gt_idx) in &car_match.pairs {
        let Some(gt_text) = gt_car_to_plate.get(gt_idx).and_then(|text| text.as_deref()) else {
            continue;
        };
        let pred_text = predictions.vehicles[pred_idx].text.as_deref();

        counts.lpr.record(
            is_exact_match(pred_text, Some(gt_text)),
            character_error_rate(pred_text, Some(gt_text)),
        );
    }

    counts
}

/// Look up a frame's predictions and evaluate it.
///
/// Returns `None` when the frame has no usable identifier; such frames
/// contribute nothing to any total.
pub fn evaluate_source_frame<S: PredictionSource + ?Sized>(
    frame: &GroundTruthFrame,
    source: &S,
    config: &EvaluationConfig,
) -> Option<EvaluationCounts> {
    let Some(key) = frame.frame_index.and_then(|idx| config.prediction_key(idx)) else {
        log::debug!("skipping image {}: no frame index", frame.image_id);
        return None;
    };

    let predictions = source.frame_predictions(key);
    log::trace!(
        "image {} -> prediction frame {}: {} predictions",
        frame.image_id,
        key,
        predictions.len()
    );
    Some(evaluate_frame(frame, &predictions, config))
}

/// Evaluate every frame sequentially.
pub fn evaluate<S: PredictionSource + ?Sized>(
    frames: &[GroundTruthFrame],
    source: &S,
    config: &EvaluationConfig,
) -> Result<EvaluationReport> {
    config.validate()?;

    let mut report = EvaluationReport::default();
    for frame in frames {
        report.record(evaluate_source_frame(frame, source, config));
    }

    log_report(&report);
    Ok(report)
}

/// Evaluate frames on the rayon thread pool.
///
/// Frames are scored in parallel and their counts folded in frame order, so
/// the report is bit-for-bit the one [`evaluate`] produces.
#[cfg(feature = "parallel")]
pub fn evaluate_parallel<S: PredictionSource + Sync + ?Sized>(
    frames: &[GroundTruthFrame],
    source: &S,
    config: &EvaluationConfig,
) -> Result<EvaluationReport> {
    use rayon::prelude::*;

    config.validate()?;

    let per_frame: Vec<Option<EvaluationCounts>> = frames
        .par_iter()
        .map(|frame| evaluate_source_frame(frame, source, config))
        .collect();

    let mut report = EvaluationReport::default();
    for counts in per_frame {
        report.record(counts);
    }

    log_report(&report);
    Ok(report)
}

fn log_report(report: &EvaluationReport) {
    log::info!(
        "evaluated {} frames ({} skipped): car TP/FP/FN {}/{}/{}, plate TP/FP/FN {}/{}/{}, {} LPR pairs",
        report.frames_evaluated,
        report.frames_skipped,
        report.counts.car.tp,
        report.counts.car.fp,
        report.counts.car.fn_,
        report.counts.plate.tp,
        report.counts.plate.fp,
        report.counts.plate.fn_,
        report.counts.lpr.total,
    );
}
