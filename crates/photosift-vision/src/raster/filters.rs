// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour bilateral filter and contrast-limited adaptive histogram
// equalization (CLAHE). Grayscale bilateral smoothing comes from
// `imageproc::filter::bilateral_filter`.

use image::{GrayImage, Luma, Rgb, RgbImage};

// -- Bilateral filter ---------------------------------------------------------

/// Precomputed spatial taps of a circular bilateral window.
struct SpatialKernel {
    /// `(dx, dy, weight)` for every offset within the window radius.
    taps: Vec<(i32, i32, f32)>,
}

impl SpatialKernel {
    fn new(diameter: u32, sigma_space: f32) -> Self {
        let radius = (diameter / 2).max(1) as i32;
        let coeff = -0.5 / (sigma_space * sigma_space);
        let mut taps = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let dist_sq = (dx * dx + dy * dy) as f32;
                if dist_sq.sqrt() > radius as f32 {
                    continue;
                }
                taps.push((dx, dy, (dist_sq * coeff).exp()));
            }
        }
        Self { taps }
    }
}

/// Gaussian range weights indexed by absolute intensity difference.
fn range_weights(len: usize, sigma_color: f32) -> Vec<f32> {
    let coeff = -0.5 / (sigma_color * sigma_color);
    (0..len)
        .map(|d| {
            let d = d as f32;
            (d * d * coeff).exp()
        })
        .collect()
}

/// Bilateral filter on an RGB image.
///
/// Each output pixel is the weighted mean of its circular neighbourhood, where
/// a neighbour's weight is the product of a Gaussian on its distance and a
/// Gaussian on its colour difference. Neighbours outside the image are
/// skipped. The range distance between two pixels is the sum of absolute channel
/// differences, so all three channels share one weight per neighbour.
pub fn bilateral_rgb(
    image: &RgbImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> RgbImage {
    let (width, height) = image.dimensions();
    let kernel = SpatialKernel::new(diameter, sigma_space);
    let range = range_weights(3 * 255 + 1, sigma_color);

    RgbImage::from_fn(width, height, |x, y| {
        let Rgb(center) = *image.get_pixel(x, y);
        let mut sums = [0.0f32; 3];
        let mut weight_sum = 0.0f32;

        for &(dx, dy, spatial) in &kernel.taps {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                continue;
            }
            let Rgb(neighbour) = *image.get_pixel(nx as u32, ny as u32);
            let dist: u32 = center
                .iter()
                .zip(neighbour.iter())
                .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
                .sum();
            let weight = spatial * range[dist as usize];
            for (acc, &channel) in sums.iter_mut().zip(neighbour.iter()) {
                *acc += weight * channel as f32;
            }
            weight_sum += weight;
        }

        Rgb(sums.map(|s| (s / weight_sum).round().clamp(0.0, 255.0) as u8))
    })
}

// -- CLAHE --------------------------------------------------------------------

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into a `tile_grid` x `tile_grid` grid. Each tile gets
/// an equalization lookup table built from its histogram, with bins clipped at
/// `clip_limit` times the uniform bin height and the clipped excess spread
/// evenly over all bins. Output pixels blend the lookup tables of the four
/// nearest tile centres bilinearly, so there are no seams at tile borders.
pub fn clahe(image: &GrayImage, clip_limit: f32, tile_grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = tile_grid.clamp(1, width);
    let tiles_y = tile_grid.clamp(1, height);
    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        let y0 = ty * height / tiles_y;
        let y1 = (ty + 1) * height / tiles_y;
        for tx in 0..tiles_x {
            let x0 = tx * width / tiles_x;
            let x1 = (tx + 1) * width / tiles_x;
            luts.push(tile_lut(image, x0, y0, x1, y1, clip_limit));
        }
    }

    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles_x + tx) as usize];

    GrayImage::from_fn(width, height, |x, y| {
        let value = image.get_pixel(x, y).0[0] as usize;

        let (tx0, tx1, ax) = neighbour_tiles(x, tile_w, tiles_x);
        let (ty0, ty1, ay) = neighbour_tiles(y, tile_h, tiles_y);

        let top = lut_at(tx0, ty0)[value] * (1.0 - ax) + lut_at(tx1, ty0)[value] * ax;
        let bottom = lut_at(tx0, ty1)[value] * (1.0 - ax) + lut_at(tx1, ty1)[value] * ax;
        let blended = top * (1.0 - ay) + bottom * ay;

        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// The two tile indices whose centres bracket `coord`, and the blend weight
/// of the second one.
fn neighbour_tiles(coord: u32, tile_size: f32, tiles: u32) -> (u32, u32, f32) {
    let pos = (coord as f32 + 0.5) / tile_size - 0.5;
    if pos <= 0.0 {
        return (0, 0, 0.0);
    }
    let first = (pos.floor() as u32).min(tiles - 1);
    let second = (first + 1).min(tiles - 1);
    let weight = if first == second { 0.0 } else { pos - first as f32 };
    (first, second, weight)
}

/// Build the clipped-equalization lookup table of one tile.
fn tile_lut(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [f32; 256] {
    let mut histogram = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            histogram[image.get_pixel(x, y).0[0] as usize] += 1;
        }
    }

    let area = ((x1 - x0) * (y1 - y0)).max(1);
    let clip = ((clip_limit * area as f32 / 256.0) as u32).max(1);

    let mut excess = 0u32;
    for bin in histogram.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }

    let bonus = excess / 256;
    let residual = (excess % 256) as usize;
    for bin in histogram.iter_mut() {
        *bin += bonus;
    }
    if residual > 0 {
        let step = (256 / residual).max(1);
        for bin in histogram.iter_mut().step_by(step).take(residual) {
            *bin += 1;
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0.0f32; 256];
    let mut cumulative = 0u32;
    for (entry, &count) in lut.iter_mut().zip(histogram.iter()) {
        cumulative += count;
        *entry = cumulative as f32 * scale;
    }
    lut
}
