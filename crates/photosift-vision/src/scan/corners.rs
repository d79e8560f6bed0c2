// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner resolution — reduces a contour to the four ordered corners used for
// perspective correction.

use imageproc::geometry::{arc_length, min_area_rect};
use imageproc::point::Point as ImgPoint;
use photosift_core::Point;
use tracing::debug;

/// Reduce a closed contour to exactly four corners ordered
/// `[top-left, top-right, bottom-right, bottom-left]`.
///
/// The contour is simplified with Douglas–Peucker at a tolerance of
/// `epsilon_ratio` times its perimeter. A quadrilateral result is used as is;
/// anything else falls back to the contour's minimum-area bounding rectangle.
/// Returns `None` for contours with fewer than three distinct points.
pub fn resolve_corners(contour: &[Point], epsilon_ratio: f64) -> Option<[Point; 4]> {
    let mut distinct = contour.to_vec();
    distinct.sort_by_key(|p| (p.x, p.y));
    distinct.dedup();
    if distinct.len() < 3 {
        return None;
    }

    let img_points: Vec<ImgPoint<i32>> = contour.iter().map(|p| ImgPoint::new(p.x, p.y)).collect();
    let epsilon = epsilon_ratio * arc_length(&img_points, true);
    let approx = approximate_closed_polygon(contour, epsilon);

    let quad = match <[Point; 4]>::try_from(approx.as_slice()) {
        Ok(quad) => quad,
        Err(_) => {
            debug!(
                vertices = approx.len(),
                "Polygon is not a quadrilateral; using minimum-area rectangle"
            );
            min_area_rect(&img_points).map(|p| Point::new(p.x, p.y))
        }
    };
    Some(order_corners(quad))
}

/// Order four points as `[top-left, top-right, bottom-right, bottom-left]`:
/// the two smallest `y` form the top pair, each pair is then sorted by `x`.
pub fn order_corners(points: [Point; 4]) -> [Point; 4] {
    let mut sorted = points;
    sorted.sort_by_key(|p| p.y);
    let (mut top, mut bottom) = ([sorted[0], sorted[1]], [sorted[2], sorted[3]]);
    top.sort_by_key(|p| p.x);
    bottom.sort_by_key(|p| p.x);
    [top[0], top[1], bottom[1], bottom[0]]
}

/// Douglas–Peucker simplification of a closed curve.
///
/// The curve is split at two mutually distant points (both are kept, being
/// extreme points of the shape) and each half is simplified as an open chain.
pub fn approximate_closed_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let far_from = |origin: Point| {
        (0..n)
            .max_by(|&a, &b| {
                points[a]
                    .distance(&origin)
                    .total_cmp(&points[b].distance(&origin))
                    .then(b.cmp(&a))
            })
            .unwrap_or(0)
    };
    let start = far_from(points[0]);
    let other = far_from(points[start]);

    // Rotate so the curve starts at `start`, and close it.
    let mut chain: Vec<Point> = points[start..].iter().chain(points[..start].iter()).copied().collect();
    chain.push(points[start]);
    let split = (other + n - start) % n;

    let mut keep = vec![false; chain.len()];
    keep[0] = true;
    keep[split] = true;
    mark_chain(&chain, 0, split, epsilon, &mut keep);
    mark_chain(&chain, split, n, epsilon, &mut keep);

    // The closing duplicate of the start point is not part of the result.
    chain[..n]
        .iter()
        .zip(keep.iter())
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

/// Mark the points of `chain[first..=last]` that Douglas–Peucker retains.
fn mark_chain(chain: &[Point], first: usize, last: usize, epsilon: f64, keep: &mut [bool]) {
    let mut stack = vec![(first, last)];
    while let Some((a, b)) = stack.pop() {
        if b <= a + 1 {
            continue;
        }
        let (index, dmax) = (a + 1..b)
            .map(|i| (i, segment_distance(chain[i], chain[a], chain[b])))
            .fold((a, 0.0f64), |best, cur| if cur.1 > best.1 { cur } else { best });
        if dmax > epsilon {
            keep[index] = true;
            stack.push((a, index));
            stack.push((index, b));
        }
    }
}

/// Distance from `p` to the line through `a` and `b` (or to `a` when the two
/// coincide).
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x as f64 - a.x as f64;
    let dy = b.y as f64 - a.y as f64;
    let len = dx.hypot(dy);
    if len == 0.0 {
        return p.distance(&a);
    }
    ((p.x as f64 - a.x as f64) * dy - (p.y as f64 - a.y as f64) * dx).abs() / len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_outline(x0: i32, y0: i32, x1: i32, y1: i32, step: i32) -> Vec<Point> {
        let mut pts = Vec::new();
        let mut x = x0;
        while x < x1 {
            pts.push(Point::new(x, y0));
            x += step;
        }
        let mut y = y0;
        while y < y1 {
            pts.push(Point::new(x1, y));
            y += step;
        }
        let mut x = x1;
        while x > x0 {
            pts.push(Point::new(x, y1));
            x -= step;
        }
        let mut y = y1;
        while y > y0 {
            pts.push(Point::new(x0, y));
            y -= step;
        }
        pts
    }

    #[test]
    fn order_corners_from_shuffled_points() {
        let shuffled = [
            Point::new(90, 80),
            Point::new(10, 12),
            Point::new(12, 78),
            Point::new(88, 10),
        ];
        assert_eq!(
            order_corners(shuffled),
            [
                Point::new(10, 12),
                Point::new(88, 10),
                Point::new(90, 80),
                Point::new(12, 78),
            ]
        );
    }

    /// The simplified outline of a densely sampled rectangle is its four
    /// corners, wherever the trace happens to start.
    #[test]
    fn rectangle_outline_resolves_to_its_corners() {
        let mut outline = rect_outline(20, 30, 220, 130, 5);
        outline.rotate_left(13);

        let corners = resolve_corners(&outline, 0.02).expect("corners");
        assert_eq!(
            corners,
            [
                Point::new(20, 30),
                Point::new(220, 30),
                Point::new(220, 130),
                Point::new(20, 130),
            ]
        );
    }

    /// A tilted quadrilateral keeps its own corners rather than the bounding box.
    #[test]
    fn tilted_quad_keeps_vertices() {
        let quad = [
            Point::new(50, 20),
            Point::new(200, 40),
            Point::new(180, 160),
            Point::new(30, 140),
        ];
        let mut outline = Vec::new();
        for i in 0..4 {
            let a = quad[i];
            let b = quad[(i + 1) % 4];
            for t in 0..20 {
                let f = t as f64 / 20.0;
                outline.push(Point::new(
                    (a.x as f64 + (b.x - a.x) as f64 * f).round() as i32,
                    (a.y as f64 + (b.y - a.y) as f64 * f).round() as i32,
                ));
            }
        }
        assert_eq!(resolve_corners(&outline, 0.02), Some(quad));
    }

    /// A circle never simplifies to four vertices, so the minimum-area
    /// rectangle supplies the corners.
    #[test]
    fn circle_falls_back_to_min_area_rect() {
        let outline: Vec<Point> = (0..72)
            .map(|i| {
                let a = (i as f64 * 5.0).to_radians();
                Point::new((100.0 + 50.0 * a.cos()).round() as i32, (100.0 + 50.0 * a.sin()).round() as i32)
            })
            .collect();
        let corners = resolve_corners(&outline, 0.005).expect("corners");
        let width = corners[0].distance(&corners[1]);
        let height = corners[0].distance(&corners[3]);
        assert!((width - 100.0).abs() < 4.0, "width {width}");
        assert!((height - 100.0).abs() < 4.0, "height {height}");
    }

    #[test]
    fn too_few_points_unresolved() {
        assert!(resolve_corners(&[Point::new(1, 1), Point::new(2, 2)], 0.02).is_none());
        assert!(resolve_corners(&[Point::new(4, 4); 6], 0.02).is_none());
    }
}
