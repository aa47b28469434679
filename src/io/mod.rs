// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for observation stream formats.
//!
//! This module provides the foundational traits for reading and writing
//! observation files, format detection, and the registry that maps a
//! [`FormatTag`](crate::core::FormatTag) to its reader/writer constructors.

pub mod detection;
pub mod formats;
pub mod registry;
pub mod traits;

pub use detection::detect_format;
pub use registry::{create_writer, open_reader, open_reader_auto, template_observation};
pub use traits::{ObservationReader, ObservationWriter, Observations};
