//! End-to-end fixture test.
//!
//! Builds a small COCO export and a directory of prediction files on disk,
//! runs the full evaluation and compares against hand-computed totals.
//!
//! Run with: cargo test fixture

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use tempfile::TempDir;

use lpr_metrics::metrics::{self, DetectionCounts, PredictionDirectory};
use lpr_metrics::EvaluationConfig;

// ============================================================================
// Fixture
// ============================================================================

const COCO_JSON: &str = r#"{
    "images": [
        {"id": 10, "file_name": "frame_000000.png", "width": 3840, "height": 2160},
        {"id": 11, "file_name": "frame_000001.png", "width": 3840, "height": 2160},
        {"id": 12, "file_name": "bad_name.png", "width": 3840, "height": 2160},
        {"id": 13, "file_name": "frame_000003.png", "width": 3840, "height": 2160}
    ],
    "categories": [
        {"id": 1, "name": "car"},
        {"id": 2, "name": "license_plate"}
    ],
    "annotations": [
        {"id": 1, "image_id": 10, "category_id": 1, "bbox": [0, 0, 400, 200]},
        {"id": 2, "image_id": 10, "category_id": 1, "bbox": [1000, 1000, 400, 200]},
        {"id": 3, "image_id": 10, "category_id": 2, "bbox": [100, 100, 80, 40], "attributes": {"value": "ABC123"}},
        {"id": 4, "image_id": 10, "category_id": 2, "bbox": [1100, 1100, 80, 40], "attributes": {"value": "XYZ 789"}},
        {"id": 5, "image_id": 11, "category_id": 1, "bbox": [0, 0, 400, 200]},
        {"id": 6, "image_id": 12, "category_id": 1, "bbox": [0, 0, 400, 200]},
        {"id": 7, "image_id": 13, "category_id": 1, "bbox": [0, 0, 100, 100]},
        {"id": 8, "image_id": 13, "category_id": 2, "bbox": [10, 10, 20, 20]}
    ]
}"#;

/// Prediction files, keyed by COCO frame index + 1.
const PREDICTIONS: &[(&str, &str)] = &[
    (
        "frame_000001.txt",
        "car 0 0 200 100 abc123\n\
         car 500 500 200 100 XYZ789\n\
         plate 50 50 40 20\n\
         plate 900 900 10 10 -\n\
         car 1 2 3\n\
         bus 0 0 1 1\n",
    ),
    (
        "frame_000002.txt",
        "car 0 0 200 100 -\n\
         car 800 400 100 50 QQQ\n",
    ),
    // frame_000004.txt intentionally absent
];

fn write_fixture(dir: &Path) {
    fs::write(dir.join("instances.json"), COCO_JSON).unwrap();
    let detections = dir.join("detections");
    fs::create_dir_all(&detections).unwrap();
    for (name, body) in PREDICTIONS {
        fs::write(detections.join(name), body).unwrap();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_fixture_totals() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());

    let frames = metrics::load_coco(dir.path().join("instances.json")).unwrap();
    let source = PredictionDirectory::open(dir.path().join("detections")).unwrap();
    let report = metrics::evaluate(&frames, &source, &EvaluationConfig::default()).unwrap();

    assert_eq!(report.frames_evaluated, 3);
    assert_eq!(report.frames_skipped, 1);

    assert_eq!(report.counts.car, DetectionCounts::new(3, 1, 1));
    assert_eq!(report.counts.plate, DetectionCounts::new(1, 1, 2));

    // ABC123 exact; "XYZ789" vs "XYZ 789" is one insertion over 7 characters
    assert_eq!(report.counts.lpr.total, 2);
    assert_eq!(report.counts.lpr.exact, 1);
    assert_relative_eq!(report.counts.lpr.cer_sum, 1.0 / 7.0, epsilon = 1e-12);
}

#[test]
fn test_fixture_summary() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());

    let frames = metrics::load_coco(dir.path().join("instances.json")).unwrap();
    let source = PredictionDirectory::open(dir.path().join("detections")).unwrap();
    let summary = metrics::evaluate(&frames, &source, &EvaluationConfig::default())
        .unwrap()
        .summary();

    let car = &summary.car_detection;
    assert_relative_eq!(car.precision, 0.75, epsilon = 1e-12);
    assert_relative_eq!(car.recall, 0.75, epsilon = 1e-12);
    assert_relative_eq!(car.f1, 0.75, epsilon = 1e-12);
    assert_eq!(car.map_50, car.precision);

    let plate = &summary.license_plate_detection;
    assert_relative_eq!(plate.precision, 0.5, epsilon = 1e-12);
    assert_relative_eq!(plate.recall, 0.3333, epsilon = 1e-12);
    assert_relative_eq!(plate.f1, 0.4, epsilon = 1e-12);
    assert_eq!((plate.tp, plate.fp, plate.fn_), (1, 1, 2));

    assert_relative_eq!(summary.lpr.exact_match_rate, 0.5, epsilon = 1e-12);
    assert_relative_eq!(summary.lpr.character_error_rate_mean, 0.0714, epsilon = 1e-12);
    assert_eq!(summary.lpr.pairs_evaluated, 2);
}

#[cfg(feature = "parallel")]
#[test]
fn test_fixture_parallel_agrees() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());

    let frames = metrics::load_coco(dir.path().join("instances.json")).unwrap();
    let source = PredictionDirectory::open(dir.path().join("detections")).unwrap();
    let config = EvaluationConfig::default();

    let sequential = metrics::evaluate(&frames, &source, &config).unwrap();
    let parallel = metrics::evaluate_parallel(&frames, &source, &config).unwrap();
    assert_eq!(sequential.summary(), parallel.summary());
}

#[test]
fn test_fixture_json_output() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());

    let frames = metrics::load_coco(dir.path().join("instances.json")).unwrap();
    let source = PredictionDirectory::open(dir.path().join("detections")).unwrap();
    let summary = metrics::evaluate(&frames, &source, &EvaluationConfig::default())
        .unwrap()
        .summary();

    let out = dir.path().join("out").join("summary.json");
    metrics::write_summary_json(&summary, &out).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["car_detection"]["TP"], 3);
    assert_eq!(value["license_plate_detection"]["FN"], 2);
    assert_eq!(value["lpr"]["pairs_evaluated"], 2);
}
