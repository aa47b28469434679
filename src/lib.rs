// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Obscodec
//!
//! Observation stream I/O library for geometric observation records.
//!
//! An observation is a pose sample: a position, a unit-quaternion
//! orientation, a scalar weight, and an optional per-format descriptor
//! vector. This library reads and writes sequences of such records across
//! several incompatible on-disk formats, organized by format:
//! - **CoViS3D** support in [`io::formats::covis3d`](crate::io::formats::covis3d)
//!   (XML scene documents and raw "Wanderer" line dumps)
//! - **PCD** support in [`io::formats::pcd`](crate::io::formats::pcd)
//!   (header-plus-payload, ascii or binary)
//!
//! ## Architecture
//!
//! - `core/` - Observation record model, format tags, error types
//! - `codec/` - Kernel payload codec shared by payload-bearing formats
//! - `io/` - Reader/writer traits, format detection, format registry,
//!   format-specific implementations
//!
//! ## Example: Reading observations
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use obscodec::io::registry::open_reader_auto;
//!
//! let mut reader = open_reader_auto("scene.pcd")?;
//! while let Some(obs) = reader.next_observation()? {
//!     println!("weight: {}", obs.kernel.weight);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Writing observations
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use obscodec::core::FormatTag;
//! use obscodec::io::registry::{create_writer, template_observation};
//!
//! let mut writer = create_writer(FormatTag::Pcd, "out.pcd")?;
//! writer.init()?;
//! let mut obs = template_observation(FormatTag::Pcd);
//! obs.kernel.position = [1.0, 2.0, 3.0];
//! writer.write_observation(&obs)?;
//! writer.write_buffer()?;
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{FormatTag, KernelPayload, ObsError, Observation, Result};

// Kernel payload codec
pub mod codec;

pub use codec::kernel::KernelEncoding;

// I/O layer (traits, detection, registry, format implementations)
pub mod io;

pub use io::traits::{ObservationReader, ObservationWriter};
