// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout obscodec.
//!
//! This module provides the foundational types for the library:
//! - [`ObsError`] - Error handling for I/O, parsing and contract violations
//! - [`Observation`] - The format-tagged observation record
//! - [`KernelPayload`] - The {position, orientation, weight} tuple
//! - [`FormatTag`] - On-disk format identifier

pub mod error;
pub mod observation;

pub use error::{ObsError, Result};
pub use observation::{KernelPayload, Observation};

/// On-disk observation format identifier.
///
/// A closed enumeration: every reader and writer declares exactly one tag,
/// and every [`Observation`] carries the tag of the reader that produced it
/// (or the writer it is destined for).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    /// CoViS3D scene format (XML document or raw "Wanderer" line dump)
    Covis3d,
    /// PCD point cloud format (textual header, ascii or binary payload)
    Pcd,
}

impl FormatTag {
    /// All known format tags, in registry order.
    pub const ALL: [FormatTag; 2] = [FormatTag::Covis3d, FormatTag::Pcd];
}

/// Error returned when parsing a `FormatTag` from string fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseFormatTagError {
    _private: (),
}

impl std::fmt::Display for ParseFormatTagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown format tag")
    }
}

impl std::error::Error for ParseFormatTagError {}

impl std::str::FromStr for FormatTag {
    type Err = ParseFormatTagError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "covis3d" | "covis" => Ok(FormatTag::Covis3d),
            "pcd" => Ok(FormatTag::Pcd),
            _ => Err(ParseFormatTagError { _private: () }),
        }
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FormatTag::Covis3d => write!(f, "covis3d"),
            FormatTag::Pcd => write!(f, "pcd"),
        }
    }
}
