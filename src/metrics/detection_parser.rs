//! Per-frame prediction files.
//!
//! Each frame's predictions live in `frame_{key:06}.txt`, one detection per
//! line, in the pipeline's output resolution:
//!
//! ```text
//! car left top width height [plate text ...]
//! plate left top width height [plate text ...]
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::detection::{Detection, DetectionKind, FramePredictions};
use crate::geometry::BBox;
use crate::text::NO_PLATE_SENTINEL;
use crate::{Error, Result};

/// Supplies the predictions recorded for a frame.
///
/// A key with no recorded predictions yields empty lists, never an error.
pub trait PredictionSource {
    fn frame_predictions(&self, key: u64) -> FramePredictions;
}

/// Parse one prediction line.
///
/// Returns `None` for blank lines, lines with fewer than five fields, an
/// unknown keyword, or an unparseable number. Any fields after the box are
/// joined with single spaces to form the text; a missing text or a bare `-`
/// yields `None`.
pub fn parse_detection_line(line: &str) -> Option<Detection> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }

    let kind: DetectionKind = parts[0].parse().ok()?;

    let mut coords = [0.0f64; 4];
    for (slot, raw) in coords.iter_mut().zip(&parts[1..5]) {
        *slot = raw.parse().ok()?;
    }
    let bbox = BBox::new(coords[0], coords[1], coords[2], coords[3]);

    let text = parts[5..].join(" ");
    let text = if text.is_empty() || text == NO_PLATE_SENTINEL {
        None
    } else {
        Some(text)
    };

    Some(Detection { kind, bbox, text })
}

/// Parse every line of a prediction stream, discarding malformed lines.
pub fn parse_predictions<R: BufRead>(reader: R) -> Result<FramePredictions> {
    let mut predictions = FramePredictions::new();

    for (line_no, line_result) in reader.split(b'\n').enumerate() {
        let raw = line_result.map_err(Error::IoError)?;
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line,
            Err(_) => {
                log::debug!(
                    "discarding malformed prediction line {}: {:?}",
                    line_no + 1,
                    String::from_utf8_lossy(&raw)
                );
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_detection_line(line) {
            Some(detection) => predictions.push(detection),
            None => log::debug!("discarding malformed prediction line {}: {:?}", line_no + 1, line),
        }
    }

    Ok(predictions)
}

/// A directory of `frame_NNNNNN.txt` prediction files.
#[derive(Debug, Clone)]
pub struct PredictionDirectory {
    root: PathBuf,
}

impl PredictionDirectory {
    /// Open a prediction directory. Fails if the directory does not exist.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::MissingInput(format!(
                "detections dir not found: {}",
                root.display()
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Path of the prediction file for a key.
    pub fn frame_path(&self, key: u64) -> PathBuf {
        self.root.join(format!("frame_{:06}.txt", key))
    }

    /// Read one frame's predictions, propagating IO errors other than
    /// "file not found".
    pub fn read_frame(&self, key: u64) -> Result<FramePredictions> {
        let path = self.frame_path(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FramePredictions::new()),
            Err(e) => {
                return Err(Error::IoError(std::io::Error::new(
                    e.kind(),
                    format!("failed to open prediction file '{}': {}", path.display(), e),
                )))
            }
        };
        parse_predictions(BufReader::new(file))
    }
}

impl PredictionSource for PredictionDirectory {
    fn frame_predictions(&self, key: u64) -> FramePredictions {
        match self.read_frame(key) {
            Ok(predictions) => predictions,
            Err(e) => {
                log::warn!("treating frame {} as empty: {}", key, e);
                FramePredictions::new()
            }
        }
    }
}

/// Predictions held in memory, keyed like [`PredictionDirectory`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPredictions {
    frames: HashMap<u64, FramePredictions>,
}

impl InMemoryPredictions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: u64, predictions: FramePredictions) {
        self.frames.insert(key, predictions);
    }
}

impl PredictionSource for InMemoryPredictions {
    fn frame_predictions(&self, key: u64) -> FramePredictions {
        self.frames.get(&key).cloned().unwrap_or_default()
    }
}

impl<S: PredictionSource + ?Sized> PredictionSource for &S {
    fn frame_predictions(&self, key: u64) -> FramePredictions {
        (**self).frame_predictions(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_parse_car_with_text() {
        let det = parse_detection_line("car 10 20 100 50 ABC 123").unwrap();
        assert_eq!(det.kind, DetectionKind::Vehicle);
        assert_eq!(det.bbox, BBox::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(det.text.as_deref(), Some("ABC 123"));
    }

    #[test]
    fn test_parse_plate_without_text() {
        let det = parse_detection_line("PLATE 1.5 2.5 30 10").unwrap();
        assert_eq!(det.kind, DetectionKind::Plate);
        assert_eq!(det.text, None);
    }

    #[test]
    fn test_parse_sentinel_text() {
        let det = parse_detection_line("car 0 0 1 1 -").unwrap();
        assert_eq!(det.text, None);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_detection_line("").is_none());
        assert!(parse_detection_line("car 1 2 3").is_none());
        assert!(parse_detection_line("truck 1 2 3 4").is_none());
        assert!(parse_detection_line("car 1 two 3 4").is_none());
    }

    #[test]
    fn test_parse_predictions_skips_bad_lines() {
        let input = "car 0 0 10 10 AB1\n\ngarbage line\nplate 1 1 2 2\ncar x 0 1 1\n";
        let preds = parse_predictions(Cursor::new(input)).unwrap();
        assert_eq!(preds.vehicles.len(), 1);
        assert_eq!(preds.plates.len(), 1);
    }

    #[test]
    fn test_parse_predictions_skips_invalid_utf8() {
        let input: &[u8] = b"car 0 0 100 50 ABC123\r\nplate 1 1 2 2 \xff\xfe\nplate 10 10 30 10\n";
        let preds = parse_predictions(Cursor::new(input)).unwrap();
        assert_eq!(preds.vehicles.len(), 1);
        assert_eq!(preds.vehicles[0].text.as_deref(), Some("ABC123"));
        assert_eq!(preds.plates.len(), 1);
        assert_eq!(preds.plates[0].bbox, BBox::new(10.0, 10.0, 30.0, 10.0));
    }

    #[test]
    fn test_directory_keeps_valid_lines_around_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("frame_000001.txt"),
            b"car 0 0 100 50 ABC123\nplate 1 1 2 2 \xff\xfe\nplate 10 10 30 10\n",
        )
        .unwrap();

        let source = PredictionDirectory::open(dir.path()).unwrap();
        let preds = source.frame_predictions(1);
        assert_eq!(preds.vehicles.len(), 1);
        assert_eq!(preds.plates.len(), 1);
    }

    #[test]
    fn test_directory_missing() {
        assert!(matches!(
            PredictionDirectory::open("/nonexistent/detections"),
            Err(Error::MissingInput(_))
        ));
    }

    #[test]
    fn test_directory_reads_frames() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("frame_000007.txt"), "car 0 0 10 10 XYZ\n").unwrap();

        let source = PredictionDirectory::open(dir.path()).unwrap();
        assert_eq!(source.frame_path(7), dir.path().join("frame_000007.txt"));

        let preds = source.frame_predictions(7);
        assert_eq!(preds.vehicles.len(), 1);
        assert_eq!(preds.vehicles[0].text.as_deref(), Some("XYZ"));

        // Missing file behaves as an empty frame
        assert!(source.frame_predictions(8).is_empty());
    }

    #[test]
    fn test_in_memory_source() {
        let mut source = InMemoryPredictions::new();
        let mut preds = FramePredictions::new();
        preds.push(Detection::plate(BBox::new(0.0, 0.0, 1.0, 1.0)));
        source.insert(3, preds.clone());

        assert_eq!(source.frame_predictions(3), preds);
        assert!(source.frame_predictions(4).is_empty());
    }
}
