// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Photosift.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Photosift operations.
///
/// Every variant describes a failure of a whole image. Failures of a single
/// detection during extraction are reported as
/// [`ExtractionFailure`](crate::types::ExtractionFailure) entries instead.
#[derive(Debug, Error)]
pub enum PhotosiftError {
    // -- Loader errors --
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("image too large: {width}x{height} pixels exceeds the {limit} pixel limit")]
    TooLarge { width: u32, height: u32, limit: u64 },

    // -- Pipeline errors --
    #[error("photo detection failed: {0}")]
    Detection(String),

    #[error("photo extraction failed: {0}")]
    Extraction(String),

    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PhotosiftError>;
