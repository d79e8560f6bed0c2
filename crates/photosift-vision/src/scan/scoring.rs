// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region validation and confidence scoring — turns contours into ranked
// photo detections.

use photosift_core::{Detection, DetectorConfig};
use tracing::{debug, info, instrument};

use super::contours::{BoundingRect, Contour};
use super::corners::resolve_corners;

/// Why a candidate region was rejected by a geometric gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Bounding box below the minimum photo area.
    TooSmall,
    /// Bounding box covers almost the whole scan.
    TooLarge,
    /// Aspect ratio outside the permitted range.
    AspectRatio,
    /// Touches the top or left border margin.
    Margin,
}

/// Apply the area, aspect-ratio, and margin gates in that order.
pub fn validate_region(rect: &BoundingRect, image_area: u64, config: &DetectorConfig) -> Result<(), Rejection> {
    let area = rect.area();
    if area < config.min_photo_area {
        return Err(Rejection::TooSmall);
    }
    if area as f64 > image_area as f64 * config.max_photo_area_ratio {
        return Err(Rejection::TooLarge);
    }

    let aspect = rect.aspect_ratio();
    if aspect < config.min_aspect_ratio || aspect > config.max_aspect_ratio {
        return Err(Rejection::AspectRatio);
    }

    // Scanned photos are expected to sit inside a margin; only the top and
    // left edges are checked.
    if rect.x < config.border_margin || rect.y < config.border_margin {
        return Err(Rejection::Margin);
    }
    Ok(())
}

/// Heuristic confidence in `[0, 1]` that a region is a photograph.
///
/// - up to 0.6 for rectangularity (contour area over bounding-box area),
/// - up to 0.3 for closeness to a common print aspect ratio,
/// - 0.1 when the box is of typical photo size.
pub fn confidence(contour_area: f64, rect: &BoundingRect, config: &DetectorConfig) -> f64 {
    let bbox_area = rect.area();
    let area_ratio = if bbox_area > 0 {
        contour_area / bbox_area as f64
    } else {
        0.0
    };
    let mut score = area_ratio * 0.6;

    let aspect = rect.aspect_ratio();
    let ratio_diff = config
        .common_aspect_ratios
        .iter()
        .map(|r| (aspect - r).abs())
        .fold(f64::INFINITY, f64::min);
    score += (1.0 - ratio_diff).max(0.0) * 0.3;

    if config.typical_area_min < bbox_area && bbox_area < config.typical_area_max {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

/// Validate and score `contours` from a `width` x `height` image.
///
/// Returns detections scoring above `min_confidence`, best first, capped at
/// `max_detections`.
#[instrument(skip(contours, config), fields(candidates = contours.len()))]
pub fn score_contours(contours: &[Contour], width: u32, height: u32, config: &DetectorConfig) -> Vec<Detection> {
    let image_area = width as u64 * height as u64;
    let mut detections = Vec::new();

    for (i, contour) in contours.iter().enumerate() {
        let Some(rect) = contour.bounding_rect() else {
            continue;
        };

        if let Err(rejection) = validate_region(&rect, image_area, config) {
            debug!(
                contour = i + 1,
                ?rejection,
                x = rect.x,
                y = rect.y,
                w = rect.width,
                h = rect.height,
                "Contour rejected by region validation"
            );
            continue;
        }

        let score = confidence(contour.area(), &rect, config);
        if score <= config.min_confidence {
            debug!(
                contour = i + 1,
                confidence = score,
                w = rect.width,
                h = rect.height,
                "Contour rejected: low confidence"
            );
            continue;
        }

        info!(
            confidence = score,
            x = rect.x,
            y = rect.y,
            w = rect.width,
            h = rect.height,
            "Photo detected"
        );

        let corners = resolve_corners(contour.points(), config.polygon_epsilon_ratio)
            .map(|quad| quad.to_vec())
            .unwrap_or_default();

        detections.push(Detection {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            area: rect.area(),
            confidence: score,
            aspect_ratio: rect.aspect_ratio(),
            corners,
            contour: contour.points().to_vec(),
        });
    }

    // Stable: equal scores keep contour (area) order.
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    if detections.len() > config.max_detections {
        debug!(
            found = detections.len(),
            kept = config.max_detections,
            "Limiting detections to the highest-confidence photos"
        );
        detections.truncate(config.max_detections);
    }
    detections
}
