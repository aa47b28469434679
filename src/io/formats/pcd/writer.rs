// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! PCD writer.
//!
//! PCD must know the total record count before the header can be emitted,
//! so the writer buffers all records in memory until `write_buffer`, then
//! writes the header followed by the payload encoded through the kernel
//! codec - the same field order the reader decodes. Each commit rewrites
//! the destination in full from the retained buffer, so repeated commits
//! never duplicate records.
//!
//! Descriptor values are not representable in the kernel layout and are
//! not written.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::warn;

use crate::codec::kernel::{encode_kernel, KernelEncoding};
use crate::core::{FormatTag, ObsError, Observation, Result};
use crate::io::traits::ObservationWriter;

use super::header::PcdHeader;

/// Header-plus-payload writer for PCD files.
pub struct PcdWriter {
    path: String,
    encoding: KernelEncoding,
    buffer: Vec<Observation>,
    initialized: bool,
    dirty: bool,
}

impl PcdWriter {
    /// Create a writer bound to the given output path, ascii payload.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
            encoding: KernelEncoding::Ascii,
            buffer: Vec::new(),
            initialized: false,
            dirty: false,
        }
    }

    /// Select the payload encoding.
    pub fn with_encoding(mut self, encoding: KernelEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Write header and payload to the destination, truncating.
    fn commit(&self) -> Result<()> {
        let file = File::create(&self.path).map_err(|e| {
            ObsError::io(format!("create {} for writing", self.path), e.to_string())
        })?;
        let mut out = BufWriter::new(file);

        let header = PcdHeader::for_kernel_cloud(self.buffer.len(), self.encoding);
        header
            .write_to(&mut out)
            .map_err(|e| ObsError::io(format!("write header of {}", self.path), e.to_string()))?;

        for obs in &self.buffer {
            let bytes = encode_kernel(&obs.kernel, self.encoding);
            out.write_all(&bytes).map_err(|e| {
                ObsError::io(format!("write payload of {}", self.path), e.to_string())
            })?;
            if self.encoding == KernelEncoding::Ascii {
                out.write_all(b"\n").map_err(|e| {
                    ObsError::io(format!("write payload of {}", self.path), e.to_string())
                })?;
            }
        }

        out.flush()
            .map_err(|e| ObsError::io(format!("flush {}", self.path), e.to_string()))?;
        Ok(())
    }
}

impl ObservationWriter for PcdWriter {
    fn format(&self) -> FormatTag {
        FormatTag::Pcd
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn init(&mut self) -> Result<()> {
        self.buffer.clear();
        self.commit()?;
        self.initialized = true;
        self.dirty = false;
        Ok(())
    }

    fn write_observation(&mut self, observation: &Observation) -> Result<()> {
        if !self.initialized {
            return Err(ObsError::contract(
                "pcd writer: write_observation called before init",
            ));
        }
        if observation.tag() != FormatTag::Pcd {
            return Err(ObsError::contract(format!(
                "pcd writer fed a {} observation",
                observation.tag()
            )));
        }
        self.buffer.push(observation.clone());
        self.dirty = true;
        Ok(())
    }

    fn write_buffer(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(ObsError::contract(
                "pcd writer: write_buffer called before init",
            ));
        }
        self.commit()?;
        self.dirty = false;
        Ok(())
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.dirty = false;
    }

    fn buffered_count(&self) -> usize {
        self.buffer.len()
    }
}

impl Drop for PcdWriter {
    fn drop(&mut self) {
        if self.dirty {
            warn!(
                path = %self.path,
                pending = self.buffer.len(),
                "pcd writer dropped with uncommitted observations"
            );
        }
    }
}
