// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PhotoDetector — the public entry point tying the loader, detection stages,
// and extractor together.

use std::path::Path;

use photosift_core::error::{PhotosiftError, Result};
use photosift_core::{Detection, DetectorConfig, ExtractionReport};
use tracing::{info, instrument};

use crate::extract::PhotoWriter;
use crate::raster::{RawImage, loader};
use crate::scan::contours::find_photo_contours;
use crate::scan::preprocess::edge_map;
use crate::scan::scoring::score_contours;

/// Finds photographs in scanned images and writes them out as separate files.
///
/// Holds only an immutable configuration, so a single detector can be shared
/// across threads; every call owns its own buffers.
#[derive(Debug, Clone, Default)]
pub struct PhotoDetector {
    config: DetectorConfig,
}

impl PhotoDetector {
    // -- Construction ---------------------------------------------------------

    /// Create a detector, rejecting an inconsistent configuration.
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    // -- Detection ------------------------------------------------------------

    /// Detect photo regions in the image at `path`.
    ///
    /// Images over `max_detect_pixels` are refused before decoding. An image
    /// with no photo-like regions yields an empty list, not an error.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn detect(&self, path: impl AsRef<Path>) -> Result<Vec<Detection>> {
        let image = loader::load(path, self.config.max_detect_pixels)?;
        self.detect_image(&image)
    }

    /// Detect photo regions in an already-decoded image.
    ///
    /// Returns `Detection` for a raster the stages cannot work on (zero width
    /// or height). The stages are total over every non-empty raster within
    /// the pixel budget; a panic inside them is a bug and is not converted
    /// into an error.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect_image(&self, image: &RawImage) -> Result<Vec<Detection>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PhotosiftError::Detection(format!(
                "image has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }
        loader::check_pixel_budget(image.width(), image.height(), self.config.max_detect_pixels)?;

        let edges = edge_map(image, &self.config);
        let contours = find_photo_contours(&edges, self.config.contour_area_threshold, self.config.max_contours);
        let detections = score_contours(&contours, image.width(), image.height(), &self.config);

        info!(
            contours = contours.len(),
            detections = detections.len(),
            "Photo detection complete"
        );
        Ok(detections)
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract `detections` from the image at `path` into `output_dir`.
    ///
    /// Whole-call errors (unreadable source, oversized image, output directory
    /// that cannot be created) are returned as `Err`; per-detection problems
    /// are collected in the report while the remaining detections are still
    /// written.
    #[instrument(
        skip_all,
        fields(path = %path.as_ref().display(), output = %output_dir.as_ref().display())
    )]
    pub fn extract(
        &self,
        path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        detections: &[Detection],
    ) -> Result<ExtractionReport> {
        let path = path.as_ref();
        let image = loader::load(path, self.config.max_extract_pixels)?;
        self.extract_image(&image, path, output_dir.as_ref(), detections)
    }

    /// Extract from an already-decoded image. `source` only names the output
    /// files.
    pub fn extract_image(
        &self,
        image: &RawImage,
        source: &Path,
        output_dir: &Path,
        detections: &[Detection],
    ) -> Result<ExtractionReport> {
        loader::check_pixel_budget(image.width(), image.height(), self.config.max_extract_pixels)?;
        let writer = PhotoWriter::new(&self.config, source, output_dir)?;
        Ok(writer.write_all(image, detections))
    }

    /// Detect and extract in one pass, decoding the source only once.
    ///
    /// The stricter of the two pixel limits applies.
    pub fn detect_and_extract(
        &self,
        path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<(Vec<Detection>, ExtractionReport)> {
        let path = path.as_ref();
        let limit = self.config.max_detect_pixels.min(self.config.max_extract_pixels);
        let image = loader::load(path, limit)?;
        let detections = self.detect_image(&image)?;
        let report = self.extract_image(&image, path, output_dir.as_ref(), &detections)?;
        Ok((detections, report))
    }
}
