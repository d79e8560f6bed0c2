// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection pipeline stages — edge map, contours, region scoring, corner
// resolution, perspective correction, and edge refinement.

pub mod contours;
pub mod corners;
pub mod perspective;
pub mod preprocess;
pub mod refine;
pub mod scoring;

pub use contours::{BoundingRect, Contour};
pub use perspective::Rectification;
pub use preprocess::EdgeMap;
