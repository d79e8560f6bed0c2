// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing — turns a scan into a binary edge map whose photo borders
// form closed loops.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::bilateral_filter;
use imageproc::morphology::{close, dilate};
use photosift_core::DetectorConfig;
use tracing::{debug, instrument};

use crate::raster::RawImage;
use crate::raster::filters::clahe;

/// Single-channel binary raster: 255 on edges, 0 elsewhere.
#[derive(Debug, Clone)]
pub struct EdgeMap {
    edges: GrayImage,
}

impl EdgeMap {
    pub fn width(&self) -> u32 {
        self.edges.width()
    }

    pub fn height(&self) -> u32 {
        self.edges.height()
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.edges
    }

    /// Number of pixels set in the map.
    pub fn edge_pixels(&self) -> usize {
        self.edges.pixels().filter(|p| p.0[0] > 0).count()
    }
}

/// Run the full preprocessing chain:
///
/// 1. Luminance conversion
/// 2. Bilateral smoothing (suppresses scan noise, keeps photo borders sharp)
/// 3. CLAHE (lets faded prints still produce borders)
/// 4. Canny edge detection
/// 5. Morphological close, then dilation, to bridge gaps in the borders
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn edge_map(image: &RawImage, config: &DetectorConfig) -> EdgeMap {
    let gray = image.as_dynamic().to_luma8();

    let denoised = denoise(&gray, config);
    debug!(diameter = config.bilateral_diameter, "Applied bilateral filter");

    let enhanced = clahe(&denoised, config.clahe_clip_limit, config.clahe_tile_grid);
    debug!(
        clip_limit = config.clahe_clip_limit,
        tile_grid = config.clahe_tile_grid,
        "Applied CLAHE"
    );

    binary_edges(&enhanced, config)
}

/// Edge-preserving bilateral smoothing with the configured window and sigmas.
pub fn denoise(gray: &GrayImage, config: &DetectorConfig) -> GrayImage {
    bilateral_filter(
        gray,
        config.bilateral_diameter,
        config.bilateral_sigma_color,
        config.bilateral_sigma_space,
    )
}

/// Canny plus morphology on an already-enhanced grayscale image.
pub fn binary_edges(enhanced: &GrayImage, config: &DetectorConfig) -> EdgeMap {
    let edges = canny(enhanced, config.canny_low, config.canny_high);

    // A square element of side 2k+1 is the L-infinity ball of radius k.
    let mut edges = close(&edges, Norm::LInf, kernel_radius(config.close_kernel));
    let dilate_radius = kernel_radius(config.dilate_kernel);
    for _ in 0..config.dilate_iterations {
        edges = dilate(&edges, Norm::LInf, dilate_radius);
    }

    let map = EdgeMap { edges };
    debug!(edge_pixels = map.edge_pixels(), "Edge map ready");
    map
}

fn kernel_radius(side: u32) -> u8 {
    (side / 2).min(u8::MAX as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Luma};

    #[test]
    fn blank_image_has_no_edges() {
        let raw = RawImage::from_dynamic(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            120,
            90,
            Luma([200u8]),
        )));
        let map = edge_map(&raw, &DetectorConfig::default());
        assert_eq!((map.width(), map.height()), (120, 90));
        assert_eq!(map.edge_pixels(), 0);
    }

    /// A bright square on a dark field becomes a thick closed ring; its
    /// interior stays empty.
    #[test]
    fn square_becomes_thick_ring() {
        let mut img = GrayImage::from_pixel(160, 160, Luma([10u8]));
        for y in 40..120 {
            for x in 40..120 {
                img.put_pixel(x, y, Luma([245u8]));
            }
        }
        let raw = RawImage::from_dynamic(DynamicImage::ImageLuma8(img));
        let map = edge_map(&raw, &DetectorConfig::default());
        let edges = map.as_gray();

        assert!(edges.get_pixel(40, 80).0[0] > 0 || edges.get_pixel(39, 80).0[0] > 0);
        assert_eq!(edges.get_pixel(80, 80).0[0], 0, "interior should be empty");
        assert_eq!(edges.get_pixel(5, 5).0[0], 0, "background should be empty");
        // Dilation thickens the border to several pixels.
        let ring_width = (30..50).filter(|&x| edges.get_pixel(x, 80).0[0] > 0).count();
        assert!(ring_width >= 3, "ring width {ring_width}");
    }

    #[test]
    fn denoise_keeps_uniform_image() {
        let img = GrayImage::from_pixel(20, 20, Luma([117u8]));
        let out = denoise(&img, &DetectorConfig::default());
        assert!(out.pixels().all(|p| p.0[0].abs_diff(117) <= 1));
    }

    /// A 210-level step is far outside the range sigma, so both sides keep
    /// their values right up to the edge.
    #[test]
    fn denoise_preserves_hard_edge() {
        let img = GrayImage::from_fn(40, 10, |x, _| if x < 20 { Luma([20u8]) } else { Luma([230u8]) });
        let out = denoise(&img, &DetectorConfig::default());
        assert!(out.get_pixel(19, 5).0[0] < 30, "dark side bled: {}", out.get_pixel(19, 5).0[0]);
        assert!(out.get_pixel(20, 5).0[0] > 220, "bright side bled: {}", out.get_pixel(20, 5).0[0]);
    }

    #[test]
    fn denoise_damps_small_noise() {
        let mut img = GrayImage::from_pixel(15, 15, Luma([100u8]));
        img.put_pixel(7, 7, Luma([120u8]));
        let v = denoise(&img, &DetectorConfig::default()).get_pixel(7, 7).0[0];
        assert!(v < 110, "noise spike should be damped, got {v}");
    }

    #[test]
    fn kernel_radius_maps_sides() {
        assert_eq!(kernel_radius(5), 2);
        assert_eq!(kernel_radius(3), 1);
        assert_eq!(kernel_radius(1), 0);
    }
}
