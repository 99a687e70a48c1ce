//! Console rendering and JSON persistence of a run summary.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::summary::{DetectionSummary, Summary};
use crate::{Error, Result};

fn render_detection(title: &str, d: &DetectionSummary) -> String {
    format!(
        "## {}\n  mAP@0.5:   {:?}\n  Precision: {:?}\n  Recall:    {:?}\n  F1:        {:?}\n  TP/FP/FN:  {} / {} / {}\n\n",
        title, d.map_50, d.precision, d.recall, d.f1, d.tp, d.fp, d.fn_
    )
}

/// Render a summary as the human-readable report printed by `lpr-eval`.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();

    out.push_str(&render_detection("Car detection (vs COCO car)", &summary.car_detection));
    out.push_str(&render_detection(
        "License plate detection (vs COCO license_plate)",
        &summary.license_plate_detection,
    ));

    let lpr = &summary.lpr;
    out.push_str(&format!(
        "## LPR (plate text)\n  Exact match rate:  {:?}\n  CER (mean):        {:?}\n  Pairs evaluated:   {}\n",
        lpr.exact_match_rate, lpr.character_error_rate_mean, lpr.pairs_evaluated
    ));

    out
}

/// Write a summary as pretty-printed JSON, creating parent directories.
pub fn write_summary_json<P: AsRef<Path>>(summary: &Summary, path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to create output folder: {}", e),
            ))
        })?;
    }

    let file = File::create(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("failed to create output file: {}", e),
        ))
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush().map_err(Error::IoError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DetectionCounts, EvaluationCounts, LprCounts};
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn sample_summary() -> Summary {
        Summary::from(&EvaluationCounts {
            car: DetectionCounts::new(3, 1, 0),
            plate: DetectionCounts::new(1, 1, 1),
            lpr: LprCounts {
                exact: 2,
                total: 3,
                cer_sum: 0.5,
            },
        })
    }

    #[test]
    fn test_render_sections() {
        let text = render_summary(&sample_summary());
        assert!(text.contains("## Car detection (vs COCO car)"));
        assert!(text.contains("## License plate detection (vs COCO license_plate)"));
        assert!(text.contains("## LPR (plate text)"));
        assert!(text.contains("  Precision: 0.75"));
        assert!(text.contains("  Recall:    1.0"));
        assert!(text.contains("  TP/FP/FN:  3 / 1 / 0"));
        assert!(text.contains("  Exact match rate:  0.6667"));
        assert!(text.contains("  Pairs evaluated:   3"));
    }

    #[test]
    fn test_render_layout() {
        let text = render_summary(&sample_summary());
        let expected_car = "## Car detection (vs COCO car)\n  mAP@0.5:   0.75\n  Precision: 0.75\n  Recall:    1.0\n  F1:        0.8571\n  TP/FP/FN:  3 / 1 / 0\n\n";
        assert!(text.starts_with(expected_car));
        assert!(text.ends_with("  CER (mean):        0.1667\n  Pairs evaluated:   3\n"));
    }

    #[test]
    fn test_write_summary_json_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("summary.json");
        let summary = sample_summary();

        write_summary_json(&summary, &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let parsed: Summary = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.car_detection.tp, summary.car_detection.tp);
        assert_eq!(parsed.lpr.pairs_evaluated, 3);
        assert_relative_eq!(parsed.lpr.exact_match_rate, 0.6667, epsilon = 1e-9);
        assert!(raw.contains("\"mAP@0.5\""));
    }
}
