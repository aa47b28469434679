// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format detection using content sniffing and file analysis.
//!
//! Goes beyond extension checking: the file head is inspected for the PCD
//! header magic, an XML scene document, or a Wanderer-style numeric line
//! dump, with the extension as fallback. Opening "by format" through the
//! registry is the normal path; autodetection is layered convenience, not
//! required for correctness.
//!
//! # Example
//!
//! ```rust,no_run
//! use obscodec::core::FormatTag;
//! use obscodec::io::detection::detect_format;
//!
//! let format = detect_format("scene.pcd")?;
//! assert_eq!(format, Some(FormatTag::Pcd));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::core::{FormatTag, ObsError, Result};

/// Try to detect the observation format of a file.
///
/// Reads the file head and checks for format signatures, falling back to
/// the file extension. Returns `None` if the format cannot be determined.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<Option<FormatTag>> {
    let path_ref = path.as_ref();

    match detect_from_content(path_ref) {
        Ok(Some(format)) => return Ok(Some(format)),
        Ok(None) => {
            // Content sniff was inconclusive, fall back to extension
        }
        Err(_) => {
            // Error reading file, fall back to extension
        }
    }

    Ok(detect_from_extension(path_ref))
}

/// Detect format by inspecting the file head.
fn detect_from_content(path: &Path) -> Result<Option<FormatTag>> {
    let mut file = File::open(path)
        .map_err(|e| ObsError::io(format!("open {} for sniffing", path.display()), e.to_string()))?;

    let mut head = [0u8; 1024];
    let n = file
        .read(&mut head)
        .map_err(|e| ObsError::io(format!("read head of {}", path.display()), e.to_string()))?;

    Ok(sniff_head(&head[..n]))
}

/// Classify a file head. `None` means inconclusive.
fn sniff_head(head: &[u8]) -> Option<FormatTag> {
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start();

    // PCD headers open with a "# .PCD" comment or go straight to VERSION
    if trimmed.starts_with("# .PCD") || trimmed.starts_with("VERSION") {
        return Some(FormatTag::Pcd);
    }

    // CoViS3D XML scene documents
    if trimmed.starts_with("<?xml") || trimmed.starts_with("<Scene") {
        return Some(FormatTag::Covis3d);
    }

    // Wanderer dumps are bare numeric columns; a leading number on the
    // first non-comment line is a strong signal
    for line in trimmed.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let first = line.split_whitespace().next()?;
        if first.parse::<f64>().is_ok() {
            return Some(FormatTag::Covis3d);
        }
        break;
    }

    None
}

/// Detect format from file extension (fallback).
fn detect_from_extension(path: &Path) -> Option<FormatTag> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| match ext.to_lowercase().as_str() {
            "pcd" => Some(FormatTag::Pcd),
            "xml" | "covis3d" => Some(FormatTag::Covis3d),
            _ => None,
        })
}

/// Check if a file is likely a PCD file.
pub fn is_pcd_file<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format(path), Ok(Some(FormatTag::Pcd)))
}

/// Check if a file is likely a CoViS3D file (XML or Wanderer).
pub fn is_covis3d_file<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format(path), Ok(Some(FormatTag::Covis3d)))
}
