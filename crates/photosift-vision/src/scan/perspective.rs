// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective correction — warps a detected quadrilateral into an upright
// rectangle, with an axis-aligned crop as the fallback.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use photosift_core::{Detection, DetectorConfig, Point};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a quadrilateral could not be warped.
#[derive(Debug, Error, PartialEq)]
pub enum WarpError {
    #[error("degenerate quadrilateral: target size {width}x{height}")]
    Degenerate { width: i64, height: i64 },

    #[error("target size {width}x{height} exceeds the {limit} pixel limit")]
    TooLarge { width: i64, height: i64, limit: u64 },

    #[error("no projective transform maps the corners onto the target rectangle")]
    Unsolvable,
}

/// Outcome of rectifying one detection.
#[derive(Debug)]
pub enum Rectification {
    /// Warped through the four-corner homography.
    Corrected(RgbImage),
    /// The warp was unavailable; this is a padded axis-aligned crop.
    CroppedFallback { image: RgbImage, reason: String },
    /// Neither the warp nor the crop produced pixels.
    Failed(String),
}

/// Output size of the warp: the longer of each pair of opposite edges,
/// truncated to whole pixels.
pub fn target_size(corners: &[Point; 4]) -> (i64, i64) {
    let [tl, tr, br, bl] = corners;
    let width = tl.distance(tr).max(bl.distance(br));
    let height = tl.distance(bl).max(tr.distance(br));
    (width as i64, height as i64)
}

/// Warp the quadrilateral `corners` (ordered `[tl, tr, br, bl]`) of `image`
/// into an upright rectangle using bilinear resampling.
pub fn warp_quad(image: &RgbImage, corners: &[Point; 4], max_pixels: u64) -> Result<RgbImage, WarpError> {
    let (width, height) = target_size(corners);
    if width <= 0 || height <= 0 {
        return Err(WarpError::Degenerate { width, height });
    }
    if (width as u64).saturating_mul(height as u64) > max_pixels {
        return Err(WarpError::TooLarge {
            width,
            height,
            limit: max_pixels,
        });
    }

    let (w, h) = ((width - 1) as f32, (height - 1) as f32);
    let src = corners.map(|p| (p.x as f32, p.y as f32));
    let dest = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

    let projection = Projection::from_control_points(src, dest).ok_or(WarpError::Unsolvable)?;

    let mut output = RgbImage::new(width as u32, height as u32);
    warp_into(image, &projection, Interpolation::Bilinear, Rgb([0, 0, 0]), &mut output);
    debug!(width, height, "Perspective warp applied");
    Ok(output)
}

/// Axis-aligned crop of the detection box, padded by `padding_ratio` of its
/// shorter side (at least `min_padding`) and clamped to the image. `None` if
/// the box lies entirely outside the image.
pub fn crop_with_padding(
    image: &RgbImage,
    detection: &Detection,
    padding_ratio: f64,
    min_padding: u32,
) -> Option<RgbImage> {
    let padding = ((detection.width.min(detection.height) as f64 * padding_ratio) as u32).max(min_padding);

    let x0 = detection.x.saturating_sub(padding);
    let y0 = detection.y.saturating_sub(padding);
    let x1 = detection
        .x
        .saturating_add(detection.width)
        .saturating_add(padding)
        .min(image.width());
    let y1 = detection
        .y
        .saturating_add(detection.height)
        .saturating_add(padding)
        .min(image.height());

    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some(image::imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image())
}

/// Rectify one detection: warp through `corners` when available and enabled,
/// otherwise (or when the warp fails) fall back to a padded crop.
pub fn rectify(
    image: &RgbImage,
    detection: &Detection,
    corners: Option<[Point; 4]>,
    config: &DetectorConfig,
) -> Rectification {
    let reason = match corners {
        Some(_) if !config.enable_perspective_correction => "perspective correction disabled".to_owned(),
        Some(quad) => match warp_quad(image, &quad, config.max_extract_pixels) {
            Ok(warped) => return Rectification::Corrected(warped),
            Err(err) => {
                warn!(error = %err, "Perspective correction failed; using crop fallback");
                err.to_string()
            }
        },
        None => "no usable corners".to_owned(),
    };

    match crop_with_padding(
        image,
        detection,
        config.fallback_padding_ratio,
        config.fallback_min_padding,
    ) {
        Some(cropped) => Rectification::CroppedFallback {
            image: cropped,
            reason,
        },
        None => Rectification::Failed(format!("{reason}; crop region lies outside the image")),
    }
}
