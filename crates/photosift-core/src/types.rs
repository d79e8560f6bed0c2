// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for photo detection and extraction.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A 2D integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = other.x as f64 - self.x as f64;
        let dy = other.y as f64 - self.y as f64;
        dx.hypot(dy)
    }
}

/// A candidate photograph found inside a scanned image.
///
/// `x`, `y`, `width`, and `height` describe the axis-aligned bounding box.
/// `corners`, when present, holds exactly four points ordered
/// `[top-left, top-right, bottom-right, bottom-left]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Bounding-box area in pixels.
    pub area: u64,
    /// Heuristic score in `[0.0, 1.0]`.
    pub confidence: f64,
    /// `width / height`.
    pub aspect_ratio: f64,
    pub corners: Vec<Point>,
    /// Simplified outer boundary. Empty when the caller built the detection
    /// without one; extraction then relies on `corners`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contour: Vec<Point>,
}

impl Detection {
    /// The stored corners, if there are exactly four of them.
    pub fn quad(&self) -> Option<[Point; 4]> {
        <[Point; 4]>::try_from(self.corners.as_slice()).ok()
    }
}

/// How an extracted region was rectified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionMethod {
    /// Warped through a four-point homography.
    Corrected,
    /// Axis-aligned crop of the bounding box with padding.
    CroppedFallback,
}

/// One successfully written photograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub source: Detection,
    /// 1-based position of the detection in the extraction batch.
    pub index: usize,
    pub file_name: String,
    pub file_path: PathBuf,
    pub extracted_width: u32,
    pub extracted_height: u32,
    pub confidence: f64,
    pub perspective_corrected: bool,
    pub method: CorrectionMethod,
}

/// Pipeline transition at which a single detection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStage {
    /// Neither the warp nor the crop fallback produced pixels.
    Rectification,
    Encode,
    Write,
}

impl std::fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Rectification => "rectification",
            Self::Encode => "encode",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// A detection that could not be extracted. Its siblings are unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub index: usize,
    pub detection: Detection,
    pub stage: ExtractionStage,
    pub reason: String,
}

/// Outcome of extracting a batch of detections from one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub results: Vec<ExtractionResult>,
    pub failures: Vec<ExtractionFailure>,
}

impl ExtractionReport {
    /// Number of detections handed to the extractor.
    pub fn detected_count(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Number of detections that produced no file.
    pub fn unextracted_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detection(corners: Vec<Point>) -> Detection {
        Detection {
            x: 100,
            y: 100,
            width: 600,
            height: 400,
            area: 240_000,
            confidence: 0.93,
            aspect_ratio: 1.5,
            corners,
            contour: Vec::new(),
        }
    }

    #[test]
    fn quad_requires_exactly_four_corners() {
        let four = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 5),
            Point::new(0, 5),
        ];
        assert!(sample_detection(four).quad().is_some());
        assert!(sample_detection(vec![Point::new(0, 0)]).quad().is_none());
    }

    #[test]
    fn point_distance_is_euclidean() {
        assert!((Point::new(0, 0).distance(&Point::new(3, 4)) - 5.0).abs() < 1e-12);
    }

    /// Detections travel between `detect` and `extract` as JSON; an empty
    /// contour is omitted and restored as empty.
    /// Points from a hand-edited detection file may sit at the ends of the
    /// coordinate range.
    #[test]
    fn point_distance_handles_extreme_coordinates() {
        let a = Point::new(i32::MIN, 0);
        let b = Point::new(i32::MAX, 0);
        assert_eq!(a.distance(&b), u32::MAX as f64);
        assert_eq!(b.distance(&a), u32::MAX as f64);
    }

    #[test]
    fn detection_json_omits_empty_contour() {
        let detection = sample_detection(vec![Point::new(1, 2); 4]);
        let json = serde_json::to_string(&detection).expect("serialize");
        assert!(!json.contains("contour"));

        let back: Detection = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, detection);
    }

    #[test]
    fn report_counts_unextracted() {
        let detection = sample_detection(Vec::new());
        let report = ExtractionReport {
            results: Vec::new(),
            failures: vec![ExtractionFailure {
                index: 1,
                detection,
                stage: ExtractionStage::Write,
                reason: "disk full".into(),
            }],
        };
        assert_eq!(report.detected_count(), 1);
        assert_eq!(report.unextracted_count(), 1);
        assert!(!report.is_complete());
    }
}
