// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image loader and size guard. Dimensions are read from the file header and
// checked against the pixel budget before any pixel data is decoded.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{DynamicImage, ImageReader};
use photosift_core::error::{PhotosiftError, Result};
use tracing::{debug, info, instrument, warn};

/// A decoded raster owned by a single pipeline invocation.
#[derive(Debug, Clone)]
pub struct RawImage {
    image: DynamicImage,
}

impl RawImage {
    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Number of colour channels in the decoded buffer.
    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }
}

/// Load the image at `path`, rejecting it if it holds more than `max_pixels`.
///
/// Errors:
/// - `NotFound` when the path is not a readable file,
/// - `Decode` when the format is unknown or the data is corrupt,
/// - `TooLarge` when `width * height > max_pixels`.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>, max_pixels: u64) -> Result<RawImage> {
    let path = path.as_ref();
    if !path.is_file() {
        warn!("Image file not found");
        return Err(PhotosiftError::NotFound(path.to_path_buf()));
    }

    let (width, height) = open_reader(path)?
        .into_dimensions()
        .map_err(|err| decode_error(path, err))?;
    debug!(width, height, "Read image header");
    check_pixel_budget(width, height, max_pixels)?;

    let image = open_reader(path)?
        .decode()
        .map_err(|err| decode_error(path, err))?;

    info!(
        width = image.width(),
        height = image.height(),
        channels = image.color().channel_count(),
        "Image loaded"
    );
    Ok(RawImage { image })
}

/// Fail with `TooLarge` if a `width` x `height` raster exceeds `limit` pixels.
pub fn check_pixel_budget(width: u32, height: u32, limit: u64) -> Result<()> {
    let pixels = width as u64 * height as u64;
    if pixels > limit {
        warn!(width, height, limit, "Image exceeds pixel budget");
        return Err(PhotosiftError::TooLarge {
            width,
            height,
            limit,
        });
    }
    Ok(())
}

fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>> {
    let reader = ImageReader::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => PhotosiftError::NotFound(path.to_path_buf()),
        _ => PhotosiftError::Io(err),
    })?;
    Ok(reader.with_guessed_format()?)
}

fn decode_error(path: &Path, err: image::ImageError) -> PhotosiftError {
    PhotosiftError::Decode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
