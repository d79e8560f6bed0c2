// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extractor/writer — rectifies, refines, encodes, and writes each selected
// detection as its own JPEG file. A failing detection is recorded and skipped;
// it never aborts the rest of the batch.

use std::path::{Path, PathBuf};

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use photosift_core::error::{PhotosiftError, Result};
use photosift_core::{
    CorrectionMethod, Detection, DetectorConfig, ExtractionFailure, ExtractionReport, ExtractionResult,
    ExtractionStage,
};
use tracing::{debug, info, instrument, warn};

use crate::raster::RawImage;
use crate::scan::corners::resolve_corners;
use crate::scan::perspective::{Rectification, rectify};
use crate::scan::refine::refine_edges;

/// Output file name for the `index`-th (1-based) photo of `base`.
///
/// `{base}_photo_{index:02}_conf{confidence:.2}.jpg`
pub fn output_file_name(base: &str, index: usize, confidence: f64) -> String {
    format!("{base}_photo_{index:02}_conf{confidence:.2}.jpg")
}

/// Encode an RGB image as JPEG bytes with the given quality (1-100).
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image.write_with_encoder(encoder)?;
    Ok(buffer)
}

/// Writes the photos of one source image into one output directory.
pub struct PhotoWriter<'a> {
    config: &'a DetectorConfig,
    output_dir: &'a Path,
    base_name: String,
}

impl<'a> PhotoWriter<'a> {
    /// Prepare to write photos of `source` into `output_dir`, creating the
    /// directory if needed.
    pub fn new(config: &'a DetectorConfig, source: &Path, output_dir: &'a Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir).map_err(|err| {
            PhotosiftError::Extraction(format!(
                "cannot create output directory {}: {}",
                output_dir.display(),
                err
            ))
        })?;

        let base_name = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "image".to_owned());

        Ok(Self {
            config,
            output_dir,
            base_name,
        })
    }

    /// Extract every detection in order. Per-item failures end up in
    /// `ExtractionReport::failures`.
    #[instrument(skip_all, fields(base = %self.base_name, detections = detections.len()))]
    pub fn write_all(&self, image: &RawImage, detections: &[Detection]) -> ExtractionReport {
        let rgb = image.as_dynamic().to_rgb8();
        let mut report = ExtractionReport::default();

        for (i, detection) in detections.iter().enumerate() {
            let index = i + 1;
            match self.write_one(&rgb, detection, index) {
                Ok(result) => {
                    info!(
                        index,
                        file = %result.file_name,
                        width = result.extracted_width,
                        height = result.extracted_height,
                        method = ?result.method,
                        "Extracted photo"
                    );
                    report.results.push(result);
                }
                Err(failure) => {
                    warn!(
                        index,
                        stage = %failure.stage,
                        reason = %failure.reason,
                        "Failed to extract photo"
                    );
                    report.failures.push(failure);
                }
            }
        }

        info!(
            extracted = report.results.len(),
            failed = report.failures.len(),
            "Extraction finished"
        );
        report
    }

    /// Run one detection through corners → rectification → refinement →
    /// encode → write.
    fn write_one(
        &self,
        rgb: &RgbImage,
        detection: &Detection,
        index: usize,
    ) -> std::result::Result<ExtractionResult, ExtractionFailure> {
        let fail = |stage: ExtractionStage, reason: String| ExtractionFailure {
            index,
            detection: detection.clone(),
            stage,
            reason,
        };

        let corners = if detection.contour.is_empty() {
            detection.quad()
        } else {
            resolve_corners(&detection.contour, self.config.polygon_epsilon_ratio)
        };
        debug!(index, resolved = corners.is_some(), "Corners resolved");

        let (region, method) = match rectify(rgb, detection, corners, self.config) {
            Rectification::Corrected(warped) => (warped, CorrectionMethod::Corrected),
            Rectification::CroppedFallback { image, reason } => {
                debug!(index, %reason, "Using crop fallback");
                (image, CorrectionMethod::CroppedFallback)
            }
            Rectification::Failed(reason) => return Err(fail(ExtractionStage::Rectification, reason)),
        };

        let region = if self.config.enable_edge_refinement {
            refine_edges(region, self.config)
        } else {
            region
        };

        let bytes = encode_jpeg(&region, self.config.jpeg_quality)
            .map_err(|err| fail(ExtractionStage::Encode, err.to_string()))?;

        let file_name = output_file_name(&self.base_name, index, detection.confidence);
        let file_path: PathBuf = self.output_dir.join(&file_name);
        std::fs::write(&file_path, &bytes).map_err(|err| {
            fail(
                ExtractionStage::Write,
                format!("cannot write {}: {}", file_path.display(), err),
            )
        })?;

        Ok(ExtractionResult {
            source: detection.clone(),
            index,
            file_name,
            file_path,
            extracted_width: region.width(),
            extracted_height: region.height(),
            confidence: detection.confidence,
            perspective_corrected: method == CorrectionMethod::Corrected,
            method,
        })
    }
}
