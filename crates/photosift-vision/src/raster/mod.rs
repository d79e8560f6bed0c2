// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — guarded image loading and pixel filters shared by the
// detection and extraction stages.

pub mod filters;
pub mod loader;

pub use loader::RawImage;
