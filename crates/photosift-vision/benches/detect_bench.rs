// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the photosift-vision crate: full detection on a
// synthetic album page, and the edge-map stage on its own.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use photosift_core::DetectorConfig;
use photosift_vision::scan::preprocess::edge_map;
use photosift_vision::{PhotoDetector, RawImage};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 900x600 dark page holding two bright prints, one landscape and one
/// portrait.
fn album_page() -> RawImage {
    let mut img = RgbImage::from_pixel(900, 600, Rgb([20, 20, 20]));
    for (x0, y0, w, h) in [(50u32, 50u32, 300u32, 200u32), (500, 150, 250, 350)] {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, Rgb([230, 225, 215]));
            }
        }
    }
    RawImage::from_dynamic(DynamicImage::ImageRgb8(img))
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_detect(c: &mut Criterion) {
    let detector = PhotoDetector::default();
    let page = album_page();

    c.bench_function("detect_image (900x600, 2 photos)", |b| {
        b.iter(|| black_box(detector.detect_image(black_box(&page))));
    });
}

/// Preprocessing dominates detection time; bench it separately.
fn bench_edge_map(c: &mut Criterion) {
    let config = DetectorConfig::default();
    let page = album_page();

    c.bench_function("edge_map (900x600)", |b| {
        b.iter(|| black_box(edge_map(black_box(&page), &config)));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_detect, bench_edge_map
}
criterion_main!(benches);
