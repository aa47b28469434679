// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! PCD point cloud format support.
//!
//! PCD is the header-plus-payload format: a textual header block declares
//! the field layout (names, per-field byte size, type tag, component
//! count), the total record count, and the payload encoding (`ascii` or
//! `binary`); the payload follows immediately. The header is the single
//! source of truth for the payload layout, and the payload itself is
//! encoded and decoded through the shared kernel codec.
//!
//! Only the canonical kernel layout (`x y z qw qx qy qz weight`, all
//! 4-byte floats) is handled; other layouts are rejected as unsupported
//! rather than mis-decoded.

pub mod header;
pub mod reader;
pub mod writer;

pub use header::PcdHeader;
pub use reader::PcdReader;
pub use writer::PcdWriter;
