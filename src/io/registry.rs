// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format registry: one place mapping a [`FormatTag`] to its reader
//! constructor, writer constructor and blank-record constructor.
//!
//! Opening "by format" through [`open_reader`] / [`create_writer`] is the
//! normal path. [`open_reader_auto`] layers content-sniffing convenience
//! on top and is not required for correctness. The registry is the only
//! piece of code that names concrete format types; everything above it
//! works through the trait objects.

use std::path::Path;

use crate::core::{FormatTag, ObsError, Observation, Result};
use crate::io::detection::detect_format;
use crate::io::formats::covis3d::{Covis3dReader, Covis3dXmlWriter};
use crate::io::formats::pcd::{PcdReader, PcdWriter};
use crate::io::traits::{ObservationReader, ObservationWriter};

/// Open a reader for a known format.
pub fn open_reader<P: AsRef<Path>>(
    tag: FormatTag,
    path: P,
) -> Result<Box<dyn ObservationReader>> {
    match tag {
        FormatTag::Covis3d => Ok(Box::new(Covis3dReader::open(path)?)),
        FormatTag::Pcd => Ok(Box::new(PcdReader::open(path)?)),
    }
}

/// Open a reader, autodetecting the format from the file.
pub fn open_reader_auto<P: AsRef<Path>>(path: P) -> Result<Box<dyn ObservationReader>> {
    let path = path.as_ref();
    match detect_format(path)? {
        Some(tag) => open_reader(tag, path),
        None => Err(ObsError::unsupported(format!(
            "cannot determine observation format of {}",
            path.display()
        ))),
    }
}

/// Create a writer for a known format, bound to the given output path.
///
/// The writer is returned uninitialized; callers invoke
/// [`init`](ObservationWriter::init) before the first record.
pub fn create_writer<P: AsRef<Path>>(
    tag: FormatTag,
    path: P,
) -> Result<Box<dyn ObservationWriter>> {
    match tag {
        FormatTag::Covis3d => Ok(Box::new(Covis3dXmlWriter::new(path))),
        FormatTag::Pcd => Ok(Box::new(PcdWriter::new(path))),
    }
}

/// A freshly constructed blank record of the given format.
///
/// The per-format "zero value" registered alongside the constructor pair,
/// so generic code obtains a correctly-typed record without holding a
/// writer instance.
pub fn template_observation(tag: FormatTag) -> Observation {
    Observation::new(tag)
}
