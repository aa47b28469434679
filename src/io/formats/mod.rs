// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format-specific reader and writer implementations.
//!
//! Each submodule owns one on-disk format family:
//! - [`covis3d`] - CoViS3D scene files (XML documents and Wanderer dumps)
//! - [`pcd`] - PCD point clouds (textual header, ascii or binary payload)

pub mod covis3d;
pub mod pcd;
