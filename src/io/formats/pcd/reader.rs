// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! PCD reader.
//!
//! Two-phase protocol: construction parses the textual header, then each
//! `next_observation` decodes one payload record through the kernel codec,
//! consuming either a whitespace-delimited line (ascii) or a fixed-size
//! byte run (binary). The header's declared point count is authoritative:
//! a payload that runs short fails with a parse error at the record where
//! the data gives out, never a silent truncated record.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::codec::kernel::{decode_kernel, KernelEncoding};
use crate::core::{FormatTag, ObsError, Observation, Result};
use crate::io::traits::ObservationReader;

use super::header::PcdHeader;

/// Header-plus-payload reader for PCD files.
#[derive(Debug)]
pub struct PcdReader {
    path: String,
    input: Option<BufReader<File>>,
    header: Option<PcdHeader>,
    read: usize,
}

impl PcdReader {
    /// Open a PCD file: parses and validates the header immediately.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = Self {
            path: path.as_ref().to_string_lossy().to_string(),
            input: None,
            header: None,
            read: 0,
        };
        reader.reopen()?;
        Ok(reader)
    }

    /// The parsed header, available once the reader is open.
    pub fn header(&self) -> Option<&PcdHeader> {
        self.header.as_ref()
    }

    fn reopen(&mut self) -> Result<()> {
        let file = File::open(&self.path)
            .map_err(|e| ObsError::io(format!("open {} for reading", self.path), e.to_string()))?;
        let mut input = BufReader::new(file);
        let header = PcdHeader::parse(&mut input)?;
        header.validate_kernel_layout()?;
        self.input = Some(input);
        self.header = Some(header);
        self.read = 0;
        Ok(())
    }

    fn next_ascii(&mut self, declared: usize) -> Result<Observation> {
        let input = match self.input.as_mut() {
            Some(input) => input,
            None => {
                return Err(ObsError::contract("pcd reader used before initialization"));
            }
        };
        let mut line = String::new();
        loop {
            line.clear();
            let n = input.read_line(&mut line).map_err(|e| {
                ObsError::io(format!("read payload line from {}", self.path), e.to_string())
            })?;
            if n == 0 {
                return Err(truncation_error(self.read, declared));
            }
            if line.trim().is_empty() {
                continue;
            }
            let kernel = decode_kernel(line.as_bytes(), KernelEncoding::Ascii)
                .map_err(|e| e.at_record(self.read))?;
            return Ok(Observation::with_kernel(FormatTag::Pcd, kernel));
        }
    }

    fn next_binary(&mut self, declared: usize, width: usize) -> Result<Observation> {
        let input = match self.input.as_mut() {
            Some(input) => input,
            None => {
                return Err(ObsError::contract("pcd reader used before initialization"));
            }
        };
        let mut record = vec![0u8; width];
        if let Err(e) = input.read_exact(&mut record) {
            return if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Err(truncation_error(self.read, declared))
            } else {
                Err(ObsError::io(
                    format!("read payload bytes from {}", self.path),
                    e.to_string(),
                ))
            };
        }
        let kernel =
            decode_kernel(&record, KernelEncoding::Binary).map_err(|e| e.at_record(self.read))?;
        Ok(Observation::with_kernel(FormatTag::Pcd, kernel))
    }
}

/// Payload gave out before the header's declared record count.
fn truncation_error(read: usize, declared: usize) -> ObsError {
    ObsError::parse_at(
        FormatTag::Pcd,
        read,
        format!("payload ended after {read} of {declared} declared records"),
    )
}

impl ObservationReader for PcdReader {
    fn format(&self) -> FormatTag {
        FormatTag::Pcd
    }

    fn reset(&mut self) -> Result<()> {
        self.reopen()
    }

    fn next_observation(&mut self) -> Result<Option<Observation>> {
        let (points, encoding, width) = match self.header.as_ref() {
            Some(header) => (header.points, header.encoding, header.record_width()),
            None => return Ok(None),
        };
        if self.read >= points {
            return Ok(None);
        }
        let obs = match encoding {
            KernelEncoding::Ascii => self.next_ascii(points)?,
            KernelEncoding::Binary => self.next_binary(points, width)?,
        };
        self.read += 1;
        Ok(Some(obs))
    }
}
