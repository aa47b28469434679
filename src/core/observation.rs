// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The observation record model.
//!
//! An [`Observation`] is one decoded record: a pose sample tagged with the
//! on-disk format it came from (or is destined for). The pose itself lives
//! in a [`KernelPayload`], the fixed-arity tuple shared by every format
//! that goes through the kernel codec.

use super::FormatTag;

/// The {position, orientation, weight} tuple shared by payload-bearing
/// formats.
///
/// Field order is canonical: `x y z qw qx qy qz weight`, for both the
/// ascii and binary encodings. The orientation is a unit quaternion stored
/// w-first. In-memory values are `f64`; on-disk precision is `f32`, so
/// round trips are exact only to `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelPayload {
    /// Position, cartesian coordinates
    pub position: [f64; 3],
    /// Orientation, unit quaternion (w, x, y, z)
    pub orientation: [f64; 4],
    /// Scalar weight
    pub weight: f64,
}

impl Default for KernelPayload {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            orientation: [1.0, 0.0, 0.0, 0.0],
            weight: 1.0,
        }
    }
}

impl KernelPayload {
    /// Create a payload at the given position, identity orientation and
    /// unit weight.
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// One decoded observation record.
///
/// The tag is fixed at construction and never mutated; it always names the
/// format of the reader that produced the record, and a writer refuses
/// records whose tag disagrees with its own format.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    tag: FormatTag,
    /// Pose and weight payload
    pub kernel: KernelPayload,
    /// Format-dependent auxiliary payload; empty for formats without one
    pub descriptor: Vec<f64>,
}

impl Observation {
    /// Create a blank observation of the given format: origin position,
    /// identity orientation, unit weight, empty descriptor.
    pub fn new(tag: FormatTag) -> Self {
        Self {
            tag,
            kernel: KernelPayload::default(),
            descriptor: Vec::new(),
        }
    }

    /// Create an observation of the given format around a kernel payload.
    pub fn with_kernel(tag: FormatTag, kernel: KernelPayload) -> Self {
        Self {
            tag,
            kernel,
            descriptor: Vec::new(),
        }
    }

    /// The format this record belongs to.
    pub fn tag(&self) -> FormatTag {
        self.tag
    }

    /// Copy of this record re-tagged for another format.
    ///
    /// The pose, weight and descriptor carry over unchanged; only the tag
    /// differs. This is the conversion step when piping a reader of one
    /// format into a writer of another.
    pub fn retagged(&self, tag: FormatTag) -> Self {
        Self {
            tag,
            kernel: self.kernel.clone(),
            descriptor: self.descriptor.clone(),
        }
    }
}
