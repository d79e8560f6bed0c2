// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// photosift-vision — Photo-region detection and extraction for scanned images.
//
// Provides the image loader and pixel guard, the edge/contour detection
// stages, region scoring, perspective correction with a crop fallback, and
// the JPEG writer behind `PhotoDetector`.

pub mod detector;
pub mod extract;
pub mod raster;
pub mod scan;

// Re-export the primary types so callers can use `photosift_vision::PhotoDetector` etc.
pub use detector::PhotoDetector;
pub use raster::RawImage;
pub use scan::{EdgeMap, Rectification};
