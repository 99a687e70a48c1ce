//! lpr-eval - compute car / plate detection and LPR metrics against COCO ground truth
//!
//! Each prediction file covers one frame at the detection resolution:
//!
//! ```text
//! car left top width height plate_text
//! plate left top width height plate_text
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use lpr_metrics::metrics::{self, EvaluationReport, PredictionDirectory};
use lpr_metrics::{Error, EvaluationConfig, GroundTruthFrame};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute detection and LPR metrics vs COCO ground truth.")]
struct Args {
    /// Path to COCO instances JSON.
    #[arg(long, default_value = "data/annotations/instances_default.json")]
    coco: PathBuf,
    /// Directory with frame_NNNNNN.txt prediction files.
    #[arg(long, default_value = "logs/detections")]
    detections_dir: PathBuf,
    /// Optional TOML file with evaluation parameters; flags override it.
    #[arg(long, env = "LPR_EVAL_CONFIG")]
    config: Option<PathBuf>,
    /// Detection frame number = COCO frame index + this (default 1).
    #[arg(long, allow_hyphen_values = true)]
    frame_offset: Option<i64>,
    /// Resolution width of predictions (default 1920).
    #[arg(long)]
    detection_width: Option<u32>,
    /// Resolution height of predictions (default 1080).
    #[arg(long)]
    detection_height: Option<u32>,
    /// IoU threshold for matching (default 0.5).
    #[arg(long)]
    iou_threshold: Option<f64>,
    /// Optional path to write the JSON summary.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Evaluate frames one at a time instead of in parallel.
    #[arg(long)]
    sequential: bool,
}

impl Args {
    fn evaluation_config(&self) -> Result<EvaluationConfig> {
        let mut config = match &self.config {
            Some(path) => EvaluationConfig::from_toml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EvaluationConfig::default(),
        };

        if let Some(offset) = self.frame_offset {
            config.frame_offset = offset;
        }
        if let Some(width) = self.detection_width {
            config.prediction_width = width;
        }
        if let Some(height) = self.detection_height {
            config.prediction_height = height;
        }
        if let Some(threshold) = self.iou_threshold {
            config.iou_threshold = threshold;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "parallel")]
fn evaluate_frames(
    frames: &[GroundTruthFrame],
    predictions: &PredictionDirectory,
    config: &EvaluationConfig,
    sequential: bool,
) -> lpr_metrics::Result<EvaluationReport> {
    if sequential {
        metrics::evaluate(frames, predictions, config)
    } else {
        metrics::evaluate_parallel(frames, predictions, config)
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_frames(
    frames: &[GroundTruthFrame],
    predictions: &PredictionDirectory,
    config: &EvaluationConfig,
    _sequential: bool,
) -> lpr_metrics::Result<EvaluationReport> {
    metrics::evaluate(frames, predictions, config)
}

fn run(args: &Args) -> Result<()> {
    let config = args.evaluation_config()?;

    let frames = metrics::load_coco(&args.coco)?;
    let predictions = PredictionDirectory::open(&args.detections_dir)?;
    log::info!(
        "loaded {} ground-truth frames from {}",
        frames.len(),
        args.coco.display()
    );

    let report = evaluate_frames(&frames, &predictions, &config, args.sequential)?;

    let summary = report.summary();
    print!("{}", metrics::render_summary(&summary));

    if let Some(output) = &args.output {
        metrics::write_summary_json(&summary, output)
            .with_context(|| format!("writing summary to {}", output.display()))?;
        println!("\nWrote summary to {}", output.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<Error>() {
                Some(Error::MissingInput(msg)) => eprintln!("{}", msg),
                _ => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
