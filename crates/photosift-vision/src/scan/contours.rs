// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour extraction — outer borders of the edge map, largest first.

use imageproc::contours::{BorderType, find_contours};
use photosift_core::Point;
use tracing::{debug, instrument};

use super::preprocess::EdgeMap;

/// Axis-aligned bounding rectangle with inclusive pixel extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRect {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// A closed outer boundary traced from the edge map.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Point>,
    area: f64,
}

impl Contour {
    /// Build a contour from boundary points in tracing order. Collinear runs
    /// are collapsed to their end points; the enclosed area is unaffected.
    pub fn new(points: Vec<Point>) -> Self {
        let points = compress_chain(points);
        let area = polygon_area(&points);
        Self { points, area }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Area enclosed by the boundary (shoelace formula).
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Bounding rectangle of the boundary points. `None` for an empty contour.
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(BoundingRect {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }
}

/// Find candidate photo boundaries in `edges`.
///
/// Only outermost borders are kept (no holes, nothing nested inside another
/// border). Borders enclosing no more than `area_threshold` of the image are
/// dropped, the rest are sorted by area, largest first, and capped at
/// `max_contours`.
#[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
pub fn find_photo_contours(edges: &EdgeMap, area_threshold: f64, max_contours: usize) -> Vec<Contour> {
    let min_area = edges.pixel_count() as f64 * area_threshold;

    let traced = find_contours::<i32>(edges.as_gray());
    let traced_count = traced.len();

    let mut candidates: Vec<Contour> = traced
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| Contour::new(c.points.into_iter().map(|p| Point::new(p.x, p.y)).collect()))
        .filter(|c| c.area() > min_area)
        .collect();

    // Stable sort keeps tracing order among equal areas.
    candidates.sort_by(|a, b| b.area().total_cmp(&a.area()));
    candidates.truncate(max_contours);

    debug!(
        traced = traced_count,
        kept = candidates.len(),
        min_area,
        "Contours extracted"
    );
    candidates
}

/// Absolute polygon area via the shoelace formula.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    twice_area.abs() as f64 / 2.0
}

/// Drop points lying strictly inside straight runs of a closed chain.
fn compress_chain(points: Vec<Point>) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points;
    }
    let mut kept = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        let (ax, ay) = (cur.x as i64 - prev.x as i64, cur.y as i64 - prev.y as i64);
        let (bx, by) = (next.x as i64 - cur.x as i64, next.y as i64 - cur.y as i64);
        let cross = ax as i128 * by as i128 - ay as i128 * bx as i128;
        let dot = ax as i128 * bx as i128 + ay as i128 * by as i128;
        // Collinear and continuing in the same direction: redundant.
        if cross == 0 && dot > 0 {
            continue;
        }
        kept.push(cur);
    }
    if kept.is_empty() { points } else { kept }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};
    use photosift_core::DetectorConfig;

    use crate::raster::RawImage;
    use crate::scan::preprocess::{binary_edges, edge_map};

    fn ring_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point> {
        let mut pts = Vec::new();
        for x in x0..=x1 {
            pts.push(Point::new(x, y0));
        }
        for y in y0 + 1..=y1 {
            pts.push(Point::new(x1, y));
        }
        for x in (x0..x1).rev() {
            pts.push(Point::new(x, y1));
        }
        for y in (y0 + 1..y1).rev() {
            pts.push(Point::new(x0, y));
        }
        pts
    }

    #[test]
    fn compressed_rectangle_keeps_only_corners() {
        let contour = Contour::new(ring_points(10, 20, 50, 40));
        assert_eq!(contour.points().len(), 4);
        assert!((contour.area() - 40.0 * 20.0).abs() < 1e-9);

        let rect = contour.bounding_rect().expect("rect");
        assert_eq!(rect, BoundingRect { x: 10, y: 20, width: 41, height: 21 });
    }

    #[test]
    fn shoelace_area_of_triangle() {
        let tri = [Point::new(0, 0), Point::new(4, 0), Point::new(0, 3)];
        assert!((polygon_area(&tri) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn empty_edge_map_yields_no_contours() {
        let edges = binary_edges(&GrayImage::new(50, 50), &DetectorConfig::default());
        assert!(find_photo_contours(&edges, 0.005, 20).is_empty());
    }

    /// Two separate squares yield two outer contours, bigger first; nothing
    /// is reported for the ring's inner hole.
    #[test]
    fn squares_sorted_by_area() {
        let mut img = GrayImage::from_pixel(300, 200, Luma([0u8]));
        for y in 30..90 {
            for x in 30..90 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        for y in 40..180 {
            for x in 150..280 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let raw = RawImage::from_dynamic(DynamicImage::ImageLuma8(img));
        let map = edge_map(&raw, &DetectorConfig::default());
        let contours = find_photo_contours(&map, 0.005, 20);

        assert_eq!(contours.len(), 2, "got {:?}", contours.iter().map(Contour::area).collect::<Vec<_>>());
        assert!(contours[0].area() > contours[1].area());
        let big = contours[0].bounding_rect().expect("rect");
        assert!(big.x.abs_diff(150) <= 4 && big.width.abs_diff(130) <= 8, "{big:?}");
    }

    #[test]
    fn cap_limits_contour_count() {
        let mut img = GrayImage::from_pixel(400, 100, Luma([0u8]));
        for i in 0..5u32 {
            let x0 = 20 + i * 75;
            for y in 20..80 {
                for x in x0..x0 + 50 {
                    img.put_pixel(x, y, Luma([255u8]));
                }
            }
        }
        let raw = RawImage::from_dynamic(DynamicImage::ImageLuma8(img));
        let map = edge_map(&raw, &DetectorConfig::default());
        assert_eq!(find_photo_contours(&map, 0.005, 3).len(), 3);
    }
}
