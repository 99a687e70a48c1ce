//! Run summary: the plain nested data handed to report renderers.

use serde::{Deserialize, Serialize};

use super::accumulator::{DetectionCounts, EvaluationCounts, LprCounts};

/// Round to 4 decimal places, as reported.
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Detection metrics for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    /// Equal to `precision`.
    ///
    /// Predictions are evaluated at a single confidence operating point, so
    /// this is AP at IoU 0.5 only in that degenerate sense. It is not an
    /// average precision integrated over a confidence sweep. The name is kept
    /// for compatibility with existing reports.
    #[serde(rename = "mAP@0.5")]
    pub map_50: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    #[serde(rename = "TP")]
    pub tp: usize,
    #[serde(rename = "FP")]
    pub fp: usize,
    #[serde(rename = "FN")]
    pub fn_: usize,
}

impl From<&DetectionCounts> for DetectionSummary {
    fn from(counts: &DetectionCounts) -> Self {
        let precision = round4(counts.precision());
        Self {
            map_50: precision,
            precision,
            recall: round4(counts.recall()),
            f1: round4(counts.f1()),
            tp: counts.tp,
            fp: counts.fp,
            fn_: counts.fn_,
        }
    }
}

/// Plate text recognition metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LprSummary {
    pub exact_match_rate: f64,
    pub character_error_rate_mean: f64,
    pub pairs_evaluated: usize,
}

impl From<&LprCounts> for LprSummary {
    fn from(counts: &LprCounts) -> Self {
        Self {
            exact_match_rate: round4(counts.exact_match_rate()),
            character_error_rate_mean: round4(counts.mean_cer()),
            pairs_evaluated: counts.total,
        }
    }
}

/// Summary of a whole evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub car_detection: DetectionSummary,
    pub license_plate_detection: DetectionSummary,
    pub lpr: LprSummary,
}

impl From<&EvaluationCounts> for Summary {
    fn from(counts: &EvaluationCounts) -> Self {
        Self {
            car_detection: DetectionSummary::from(&counts.car),
            license_plate_detection: DetectionSummary::from(&counts.plate),
            lpr: LprSummary::from(&counts.lpr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(2.0 / 3.0), 0.6667);
        assert_eq!(round4(0.0), 0.0);
        assert_eq!(round4(1.0), 1.0);
    }

    #[test]
    fn test_map_equals_precision() {
        let summary = DetectionSummary::from(&DetectionCounts::new(2, 1, 5));
        assert_eq!(summary.map_50, summary.precision);
        assert_eq!(summary.precision, 0.6667);
    }

    #[test]
    fn test_serialized_keys() {
        let counts = EvaluationCounts {
            car: DetectionCounts::new(1, 0, 0),
            ..Default::default()
        };
        let value = serde_json::to_value(Summary::from(&counts)).unwrap();

        let car = &value["car_detection"];
        assert_eq!(car["mAP@0.5"], 1.0);
        assert_eq!(car["TP"], 1);
        assert_eq!(car["FP"], 0);
        assert_eq!(car["FN"], 0);
        assert_eq!(value["license_plate_detection"]["precision"], 0.0);
        assert_eq!(value["lpr"]["pairs_evaluated"], 0);
        assert_eq!(value["lpr"]["character_error_rate_mean"], 0.0);
    }
}
