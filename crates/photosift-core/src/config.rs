// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector configuration. Every heuristic threshold used by the pipeline
// lives here so it can be tuned without touching pipeline code.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PhotosiftError, Result};

/// Tuning knobs for photo detection and extraction.
///
/// The defaults were tuned empirically against real scans. In particular the
/// confidence threshold and the common aspect-ratio list change recall and
/// precision, so retune them only against a labelled corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    // -- Loader guard --
    /// Pixel budget (`width * height`) for `detect`.
    pub max_detect_pixels: u64,
    /// Pixel budget for `extract`.
    pub max_extract_pixels: u64,

    // -- Preprocessing --
    /// Bilateral filter window diameter in pixels.
    pub bilateral_diameter: u32,
    /// Bilateral range (intensity) sigma.
    pub bilateral_sigma_color: f32,
    /// Bilateral spatial sigma.
    pub bilateral_sigma_space: f32,
    /// CLAHE clip limit, relative to a uniform histogram.
    pub clahe_clip_limit: f32,
    /// CLAHE tiles per axis.
    pub clahe_tile_grid: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Side of the square closing element.
    pub close_kernel: u32,
    /// Side of the square dilation element.
    pub dilate_kernel: u32,
    pub dilate_iterations: u32,

    // -- Contour extraction --
    /// Minimum contour area as a fraction of the whole image.
    pub contour_area_threshold: f64,
    /// Largest contours kept for validation.
    pub max_contours: usize,

    // -- Region validation and scoring --
    /// Minimum bounding-box area in pixels.
    pub min_photo_area: u64,
    /// Maximum bounding-box area as a fraction of the image.
    pub max_photo_area_ratio: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Regions closer than this to the top or left border are rejected.
    pub border_margin: u32,
    /// Aspect ratios of common print formats, used for the shape bonus.
    pub common_aspect_ratios: Vec<f64>,
    /// Exclusive bounds of the "typical photo size" bonus.
    pub typical_area_min: u64,
    pub typical_area_max: u64,
    /// Detections must score strictly above this.
    pub min_confidence: f64,
    pub max_detections: usize,

    // -- Corner resolution --
    /// Polygon approximation tolerance as a fraction of the perimeter.
    pub polygon_epsilon_ratio: f64,

    // -- Extraction --
    pub enable_perspective_correction: bool,
    pub enable_edge_refinement: bool,
    /// Crop fallback padding as a fraction of `min(width, height)`.
    pub fallback_padding_ratio: f64,
    pub fallback_min_padding: u32,
    /// Border trimmed by the edge refiner.
    pub refine_border: u32,
    /// JPEG quality for written photos (1-100).
    pub jpeg_quality: u8,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_detect_pixels: 25_000_000,
            max_extract_pixels: 30_000_000,
            bilateral_diameter: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            clahe_clip_limit: 2.0,
            clahe_tile_grid: 8,
            canny_low: 40.0,
            canny_high: 120.0,
            close_kernel: 5,
            dilate_kernel: 3,
            dilate_iterations: 2,
            contour_area_threshold: 0.005,
            max_contours: 20,
            min_photo_area: 3000,
            max_photo_area_ratio: 0.90,
            min_aspect_ratio: 0.20,
            max_aspect_ratio: 5.0,
            border_margin: 10,
            common_aspect_ratios: vec![4.0 / 3.0, 3.0 / 2.0, 16.0 / 9.0, 5.0 / 4.0, 1.0],
            typical_area_min: 20_000,
            typical_area_max: 500_000,
            min_confidence: 0.20,
            max_detections: 10,
            polygon_epsilon_ratio: 0.02,
            enable_perspective_correction: true,
            enable_edge_refinement: true,
            fallback_padding_ratio: 0.02,
            fallback_min_padding: 5,
            refine_border: 2,
            jpeg_quality: 95,
        }
    }
}

impl DetectorConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is internally consistent.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(PhotosiftError::InvalidConfig(msg.to_owned()));

        if self.max_detect_pixels == 0 || self.max_extract_pixels == 0 {
            return invalid("pixel budgets must be positive");
        }
        if self.bilateral_diameter == 0 {
            return invalid("bilateral_diameter must be positive");
        }
        if self.bilateral_sigma_color <= 0.0 || self.bilateral_sigma_space <= 0.0 {
            return invalid("bilateral sigmas must be positive");
        }
        if self.clahe_clip_limit <= 0.0 || self.clahe_tile_grid == 0 {
            return invalid("CLAHE clip limit and tile grid must be positive");
        }
        if self.canny_low < 0.0 || self.canny_low > self.canny_high {
            return invalid("canny_low must be within [0, canny_high]");
        }
        if self.close_kernel == 0 || self.dilate_kernel == 0 {
            return invalid("morphology kernels must be positive");
        }
        if !(0.0..1.0).contains(&self.contour_area_threshold) {
            return invalid("contour_area_threshold must be within [0, 1)");
        }
        if self.max_photo_area_ratio <= 0.0 || self.max_photo_area_ratio > 1.0 {
            return invalid("max_photo_area_ratio must be within (0, 1]");
        }
        if self.min_aspect_ratio <= 0.0 || self.min_aspect_ratio > self.max_aspect_ratio {
            return invalid("aspect ratio bounds must satisfy 0 < min <= max");
        }
        if self.common_aspect_ratios.is_empty() {
            return invalid("common_aspect_ratios must not be empty");
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return invalid("min_confidence must be within [0, 1]");
        }
        if self.polygon_epsilon_ratio <= 0.0 {
            return invalid("polygon_epsilon_ratio must be positive");
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return invalid("jpeg_quality must be within 1..=100");
        }
        Ok(())
    }
}
