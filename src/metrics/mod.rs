//! Evaluation against COCO ground truth.
//!
//! This module provides:
//!
//! - `load_coco` - Parse a COCO `instances.json` into per-frame ground truth
//! - `PredictionDirectory` - Read per-frame `frame_NNNNNN.txt` prediction files
//! - `evaluate` / `evaluate_frame` - Car, plate and LPR scoring
//! - `EvaluationCounts` - Additive TP/FP/FN and LPR counters
//! - `Summary` and report rendering

mod accumulator;
mod detection_parser;
mod evaluation;
mod ground_truth;
mod report;
mod summary;

pub use accumulator::{DetectionCounts, EvaluationCounts, LprCounts};
pub use detection_parser::{
    parse_detection_line, parse_predictions, InMemoryPredictions, PredictionDirectory,
    PredictionSource,
};
#[cfg(feature = "parallel")]
pub use evaluation::evaluate_parallel;
pub use evaluation::{evaluate, evaluate_frame, evaluate_source_frame, EvaluationReport};
pub use ground_truth::{frame_index_from_file_name, load_coco, parse_coco, CAR_CATEGORY, PLATE_CATEGORY};
pub use report::{render_summary, write_summary_json};
pub use summary::{DetectionSummary, LprSummary, Summary};
