//! Evaluation run parameters.
//!
//! There is no global configuration: every run takes an [`EvaluationConfig`]
//! explicitly. Values come from [`EvaluationConfig::default`], optionally
//! overlaid by a TOML file (see [`EvaluationConfig::from_toml_file`]), and
//! finally by whatever the caller sets.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;
pub const DEFAULT_PREDICTION_WIDTH: u32 = 1920;
pub const DEFAULT_PREDICTION_HEIGHT: u32 = 1080;
pub const DEFAULT_FRAME_OFFSET: i64 = 1;
pub const DEFAULT_CANVAS_WIDTH: u32 = 3840;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 2160;

/// Parameters of a single evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// Minimum IoU for a prediction / ground-truth pair to match.
    pub iou_threshold: f64,
    /// Resolution the predictions were produced at.
    pub prediction_width: u32,
    pub prediction_height: u32,
    /// Prediction key = ground-truth frame index + this offset.
    pub frame_offset: i64,
    /// Ground-truth canvas used when a frame does not state its own size.
    pub fallback_canvas: (u32, u32),
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            prediction_width: DEFAULT_PREDICTION_WIDTH,
            prediction_height: DEFAULT_PREDICTION_HEIGHT,
            frame_offset: DEFAULT_FRAME_OFFSET,
            fallback_canvas: (DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct EvaluationConfigFile {
    iou_threshold: Option<f64>,
    frame_offset: Option<i64>,
    prediction: Option<ResolutionFile>,
    fallback_canvas: Option<ResolutionFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ResolutionFile {
    width: Option<u32>,
    height: Option<u32>,
}

impl EvaluationConfig {
    /// Load defaults overlaid with the keys present in a TOML file.
    ///
    /// ```toml
    /// iou_threshold = 0.5
    /// frame_offset = 1
    ///
    /// [prediction]
    /// width = 1920
    /// height = 1080
    ///
    /// [fallback_canvas]
    /// width = 3840
    /// height = 2160
    /// ```
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse a TOML document; see [`EvaluationConfig::from_toml_file`].
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: EvaluationConfigFile = toml::from_str(raw)?;
        let mut config = Self::default();

        if let Some(threshold) = file.iou_threshold {
            config.iou_threshold = threshold;
        }
        if let Some(offset) = file.frame_offset {
            config.frame_offset = offset;
        }
        if let Some(prediction) = file.prediction {
            config.prediction_width = prediction.width.unwrap_or(config.prediction_width);
            config.prediction_height = prediction.height.unwrap_or(config.prediction_height);
        }
        if let Some(canvas) = file.fallback_canvas {
            config.fallback_canvas = (
                canvas.width.unwrap_or(config.fallback_canvas.0),
                canvas.height.unwrap_or(config.fallback_canvas.1),
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters describe a runnable evaluation.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(Error::InvalidConfig(format!(
                "iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            )));
        }
        if self.prediction_width == 0 || self.prediction_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "prediction resolution must be positive, got {}x{}",
                self.prediction_width, self.prediction_height
            )));
        }
        if self.fallback_canvas.0 == 0 || self.fallback_canvas.1 == 0 {
            return Err(Error::InvalidConfig(format!(
                "fallback canvas must be positive, got {}x{}",
                self.fallback_canvas.0, self.fallback_canvas.1
            )));
        }
        Ok(())
    }

    /// Scale factors mapping prediction coordinates onto a ground-truth canvas.
    pub fn scale_to(&self, canvas: (u32, u32)) -> (f64, f64) {
        (
            canvas.0 as f64 / self.prediction_width as f64,
            canvas.1 as f64 / self.prediction_height as f64,
        )
    }

    /// Prediction-source key for a ground-truth frame index.
    ///
    /// Returns `None` when the offset would take the key below zero.
    pub fn prediction_key(&self, frame_index: u64) -> Option<u64> {
        let key = i128::from(frame_index) + i128::from(self.frame_offset);
        u64::try_from(key).ok()
    }
}
