// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CoViS3D scene format support.
//!
//! CoViS3D observations come in two on-disk flavors sharing one format
//! tag:
//! - an XML scene document (`<Scene>` root with `<Primitive3D>` children),
//!   handled by [`Covis3dXmlReader`] / [`Covis3dXmlWriter`]
//! - a raw "Wanderer" line dump (whitespace-separated columns, no header),
//!   handled by [`Covis3dWandererReader`]; this flavor is read-only
//!
//! [`Covis3dReader`] is the usual entry point: it sniffs the file head and
//! delegates to the matching flavor, so callers never care which one they
//! were given.

pub mod wanderer;
pub mod xml;

pub use wanderer::Covis3dWandererReader;
pub use xml::{Covis3dXmlReader, Covis3dXmlWriter};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::core::{FormatTag, ObsError, Observation, Result};
use crate::io::traits::ObservationReader;

/// Flavor-sniffing CoViS3D reader.
///
/// Opens the path, peeks at the first non-whitespace byte (`<` means an
/// XML scene document, anything else a Wanderer dump) and delegates every
/// operation to the matching flavor reader.
pub enum Covis3dReader {
    /// XML scene document flavor
    Xml(Covis3dXmlReader),
    /// Raw Wanderer line dump flavor
    Wanderer(Covis3dWandererReader),
}

impl Covis3dReader {
    /// Open a CoViS3D file, autodetecting the flavor.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if looks_like_xml(path)? {
            Ok(Covis3dReader::Xml(Covis3dXmlReader::open(path)?))
        } else {
            Ok(Covis3dReader::Wanderer(Covis3dWandererReader::open(path)?))
        }
    }
}

/// Peek at the file head: an XML flavor starts with `<`.
fn looks_like_xml(path: &Path) -> Result<bool> {
    let mut file = File::open(path).map_err(|e| {
        ObsError::io(format!("open {} for reading", path.display()), e.to_string())
    })?;
    let mut head = [0u8; 512];
    let n = file
        .read(&mut head)
        .map_err(|e| ObsError::io(format!("read head of {}", path.display()), e.to_string()))?;
    for &byte in &head[..n] {
        if byte.is_ascii_whitespace() {
            continue;
        }
        return Ok(byte == b'<');
    }
    // Empty or all-whitespace files read as an empty Wanderer dump
    Ok(false)
}

impl ObservationReader for Covis3dReader {
    fn format(&self) -> FormatTag {
        FormatTag::Covis3d
    }

    fn reset(&mut self) -> Result<()> {
        match self {
            Covis3dReader::Xml(reader) => reader.reset(),
            Covis3dReader::Wanderer(reader) => reader.reset(),
        }
    }

    fn next_observation(&mut self) -> Result<Option<Observation>> {
        match self {
            Covis3dReader::Xml(reader) => reader.next_observation(),
            Covis3dReader::Wanderer(reader) => reader.next_observation(),
        }
    }
}
