//! # lpr-metrics - Detection and LPR evaluation
//!
//! Scores a vehicle / licence-plate detection pipeline against human-annotated
//! COCO ground truth, one frame at a time.
//!
//! Each run answers three questions:
//!
//! - How well are cars detected (precision / recall / F1)
//! - How well are licence plates detected
//! - How accurately is plate text read on correctly-detected cars
//!   (exact-match rate and mean character error rate)
//!
//! ## Example
//!
//! ```rust,ignore
//! use lpr_metrics::metrics::{evaluate, load_coco, PredictionDirectory};
//! use lpr_metrics::EvaluationConfig;
//!
//! let frames = load_coco("data/annotations/instances_default.json")?;
//! let predictions = PredictionDirectory::open("logs/detections")?;
//! let report = evaluate(&frames, &predictions, &EvaluationConfig::default())?;
//! println!("{}", lpr_metrics::metrics::render_summary(&report.summary()));
//! ```

// Public modules
pub mod geometry;
pub mod text;
pub mod detection;
pub mod annotation;
pub mod matching;
pub mod association;
pub mod config;
pub mod metrics;

// Re-exports for convenience
pub use geometry::{iou, BBox};
pub use detection::{Detection, DetectionKind, FramePredictions};
pub use annotation::{GroundTruthFrame, GroundTruthPlate};
pub use text::{character_error_rate, levenshtein_distance, normalize_plate_text};
pub use matching::{match_boxes, MatchResult};
pub use association::associate_plates_to_cars;
pub use config::EvaluationConfig;

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur while setting up or running an evaluation.
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid detection: {0}")]
        InvalidDetection(String),

        #[error("Required input not found: {0}")]
        MissingInput(String),

        #[error("Ground truth error: {0}")]
        GroundTruth(String),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),

        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),

        #[error("Config file error: {0}")]
        Toml(#[from] toml::de::Error),
    }

    /// Result type for lpr-metrics operations
    pub type Result<T> = std::result::Result<T, Error>;
}
