// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photosift — finds the photographs on a scanned album page and saves each one
// as its own JPEG.
//
// Entry point. Initialises logging, parses the command line, and runs detect
// or extract. Results go to stdout as JSON; logs and errors go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use photosift_core::error::Result;
use photosift_core::human_errors::humanize_error;
use photosift_core::{Detection, DetectorConfig};
use photosift_vision::PhotoDetector;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "photosift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detect and extract photographs from scanned images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect photo regions and print them as JSON
    Detect {
        /// Scanned image to analyse
        image: PathBuf,

        /// JSON file overriding the default detector settings
        #[arg(long, env = "PHOTOSIFT_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Extract detected photos into a directory and print the report as JSON
    Extract {
        /// Scanned image to extract from
        image: PathBuf,

        /// Directory that receives the extracted JPEG files
        output_dir: PathBuf,

        /// JSON file overriding the default detector settings
        #[arg(long, env = "PHOTOSIFT_CONFIG")]
        config: Option<PathBuf>,

        /// Only extract detections scoring at least this confidence
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Detection list previously printed by `photosift detect`
        #[arg(long)]
        detections: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "photosift failed");
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("hint: {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Detect { image, config } => {
            let detector = PhotoDetector::new(load_config(config.as_deref())?)?;
            let detections = detector.detect(&image)?;
            print_json(&detections)
        }
        Commands::Extract {
            image,
            output_dir,
            config,
            min_confidence,
            detections,
        } => {
            let detector = PhotoDetector::new(load_config(config.as_deref())?)?;
            let detections = match detections {
                Some(path) => read_detections(&path)?,
                None => detector.detect(&image)?,
            };
            let selected = filter_by_confidence(detections, min_confidence);
            tracing::info!(selected = selected.len(), "Extracting photos");

            let report = detector.extract(&image, &output_dir, &selected)?;
            if !report.is_complete() {
                tracing::warn!(
                    unextracted = report.unextracted_count(),
                    detected = report.detected_count(),
                    "Some photos could not be extracted"
                );
            }
            print_json(&report)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DetectorConfig> {
    match path {
        Some(path) => DetectorConfig::from_json_file(path),
        None => Ok(DetectorConfig::default()),
    }
}

fn read_detections(path: &Path) -> Result<Vec<Detection>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Keep detections at or above `min_confidence`, preserving their order.
fn filter_by_confidence(detections: Vec<Detection>, min_confidence: Option<f64>) -> Vec<Detection> {
    match min_confidence {
        Some(min) => detections.into_iter().filter(|d| d.confidence >= min).collect(),
        None => detections,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use photosift_core::PhotosiftError;

    fn detection(confidence: f64) -> Detection {
        Detection {
            x: 20,
            y: 20,
            width: 300,
            height: 200,
            area: 60_000,
            confidence,
            aspect_ratio: 1.5,
            corners: Vec::new(),
            contour: Vec::new(),
        }
    }

    #[test]
    fn cli_arguments_parse() {
        let cli = Cli::try_parse_from([
            "photosift",
            "extract",
            "scan.jpg",
            "out",
            "--min-confidence",
            "0.6",
        ])
        .expect("parse");
        match cli.command {
            Commands::Extract {
                image,
                output_dir,
                min_confidence,
                detections,
                ..
            } => {
                assert_eq!(image, PathBuf::from("scan.jpg"));
                assert_eq!(output_dir, PathBuf::from("out"));
                assert_eq!(min_confidence, Some(0.6));
                assert!(detections.is_none());
            }
            Commands::Detect { .. } => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn confidence_filter_keeps_order() {
        let kept = filter_by_confidence(vec![detection(0.9), detection(0.4), detection(0.7)], Some(0.5));
        let scores: Vec<f64> = kept.iter().map(|d| d.confidence).collect();
        assert_eq!(scores, vec![0.9, 0.7]);
        assert_eq!(filter_by_confidence(vec![detection(0.1)], None).len(), 1);
    }

    #[test]
    fn saved_detections_are_read_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("detections.json");
        let saved = vec![detection(0.8)];
        std::fs::write(&path, serde_json::to_string(&saved).expect("json")).expect("write");

        assert_eq!(read_detections(&path).expect("read"), saved);
    }

    #[test]
    fn malformed_detections_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("detections.json");
        std::fs::write(&path, "[{\"x\": ").expect("write");
        assert!(matches!(read_detections(&path), Err(PhotosiftError::Serialization(_))));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        assert_eq!(load_config(None).expect("defaults"), DetectorConfig::default());
    }
}
