// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec implementations.
//!
//! The kernel codec in [`kernel`] is the single place defining field order,
//! numeric precision and separator conventions for the shared
//! {position, orientation, weight} payload. Any format embedding kernel
//! payloads goes through it, so every such format round-trips with every
//! other.

pub mod kernel;

pub use kernel::{decode_kernel, encode_kernel, KernelEncoding};
