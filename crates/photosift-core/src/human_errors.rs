// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for hosts that show errors to end users.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::PhotosiftError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary condition (disk busy, interrupted write) — retrying may help.
    Transient,
    /// The user must do something (pick another file, free disk space).
    ActionRequired,
    /// Retrying the same input will fail the same way.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the host may retry automatically.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `PhotosiftError` into a `HumanError`.
pub fn humanize_error(err: &PhotosiftError) -> HumanError {
    match err {
        PhotosiftError::NotFound(path) => HumanError {
            message: "We couldn't find that image.".into(),
            suggestion: format!(
                "Check that the file still exists and try uploading it again. ({})",
                path.display()
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PhotosiftError::Decode { .. } => HumanError {
            message: "This file doesn't look like an image we can read.".into(),
            suggestion: "Try saving the scan as JPEG or PNG, then upload it again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PhotosiftError::TooLarge { width, height, .. } => HumanError {
            message: "This scan is too large to process.".into(),
            suggestion: format!(
                "Scan at a lower resolution (this one is {width}x{height} pixels) and try again."
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PhotosiftError::Detection(detail) => HumanError {
            message: "We couldn't look for photos in this scan.".into(),
            suggestion: format!("Try again with a different scan. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PhotosiftError::Extraction(detail) => HumanError {
            message: "We found photos but couldn't save them.".into(),
            suggestion: format!("Make sure there is free storage space, then try again. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        PhotosiftError::InvalidConfig(detail) => HumanError {
            message: "Photo detection is misconfigured.".into(),
            suggestion: format!("Ask the administrator to check the detector settings. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PhotosiftError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We aren't allowed to read or write that location.".into(),
                suggestion: "Choose a different folder, or check its permissions.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Something went wrong reading or writing files.".into(),
                suggestion: format!("Try again in a moment. ({io_err})"),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        PhotosiftError::Serialization(detail) => HumanError {
            message: "A settings or detection file is damaged.".into(),
            suggestion: format!("Run detection again to regenerate it. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
