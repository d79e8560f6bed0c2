// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge refinement — smooths an extracted photo and trims the thin sliver of
// scan background the warp or crop leaves along its border.

use image::RgbImage;
use photosift_core::DetectorConfig;
use thiserror::Error;
use tracing::{debug, warn};

use crate::raster::filters::bilateral_rgb;

#[derive(Debug, Error)]
enum RefineError {
    #[error("{width}x{height} image is too small to trim a {border}px border")]
    TooSmall { width: u32, height: u32, border: u32 },
}

/// Smooth `image` with the bilateral filter and trim `refine_border` pixels
/// from every side.
///
/// Best-effort: if refinement is not possible the input is returned
/// unchanged.
pub fn refine_edges(image: RgbImage, config: &DetectorConfig) -> RgbImage {
    match try_refine(&image, config) {
        Ok(refined) => refined,
        Err(err) => {
            warn!(error = %err, "Edge refinement skipped; keeping unrefined image");
            image
        }
    }
}

fn try_refine(image: &RgbImage, config: &DetectorConfig) -> Result<RgbImage, RefineError> {
    let (width, height) = image.dimensions();
    let border = config.refine_border;
    if width <= 2 * border || height <= 2 * border {
        return Err(RefineError::TooSmall {
            width,
            height,
            border,
        });
    }

    let filtered = bilateral_rgb(
        image,
        config.bilateral_diameter,
        config.bilateral_sigma_color,
        config.bilateral_sigma_space,
    );
    let trimmed =
        image::imageops::crop_imm(&filtered, border, border, width - 2 * border, height - 2 * border).to_image();

    debug!(
        from_w = width,
        from_h = height,
        to_w = trimmed.width(),
        to_h = trimmed.height(),
        "Edges refined"
    );
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn trims_two_pixels_per_side() {
        let img = RgbImage::from_pixel(50, 30, Rgb([120, 130, 140]));
        let out = refine_edges(img, &DetectorConfig::default());
        assert_eq!(out.dimensions(), (46, 26));
        assert_eq!(out.get_pixel(10, 10), &Rgb([120, 130, 140]));
    }

    /// A black sliver along the left edge is removed by the trim.
    #[test]
    fn removes_border_sliver() {
        let mut img = RgbImage::from_pixel(40, 40, Rgb([200, 200, 200]));
        for y in 0..40 {
            img.put_pixel(0, y, Rgb([0, 0, 0]));
            img.put_pixel(1, y, Rgb([0, 0, 0]));
        }
        let out = refine_edges(img, &DetectorConfig::default());
        assert!(out.get_pixel(0, 20).0[0] > 150, "sliver survived: {:?}", out.get_pixel(0, 20));
    }

    #[test]
    fn tiny_image_returned_unchanged() {
        let img = RgbImage::from_pixel(4, 9, Rgb([1, 2, 3]));
        let out = refine_edges(img.clone(), &DetectorConfig::default());
        assert_eq!(out, img);
    }
}
