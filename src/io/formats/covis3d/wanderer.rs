// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CoViS3D Wanderer dump reader.
//!
//! The Wanderer flavor is a headerless, line-oriented text format: one
//! observation per line, whitespace-separated columns in fixed order
//! `x y z qw qx qy qz weight`, with any further columns forming the
//! descriptor. Blank lines and `#` comment lines are skipped. End of file
//! is end of stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::{FormatTag, KernelPayload, ObsError, Observation, Result};
use crate::io::traits::ObservationReader;

/// Number of mandatory columns per line.
const KERNEL_COLUMNS: usize = 8;

/// Line-based reader for Wanderer dumps.
#[derive(Debug)]
pub struct Covis3dWandererReader {
    path: String,
    input: Option<BufReader<File>>,
    ordinal: usize,
}

impl Covis3dWandererReader {
    /// Open a Wanderer dump for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = Self {
            path: path.as_ref().to_string_lossy().to_string(),
            input: None,
            ordinal: 0,
        };
        reader.reopen()?;
        Ok(reader)
    }

    /// Reopen the file and discard buffered line state.
    fn reopen(&mut self) -> Result<()> {
        let file = File::open(&self.path)
            .map_err(|e| ObsError::io(format!("open {} for reading", self.path), e.to_string()))?;
        self.input = Some(BufReader::new(file));
        self.ordinal = 0;
        Ok(())
    }

    /// Decode one non-blank, non-comment line.
    fn decode_line(&self, line: &str) -> Result<Observation> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < KERNEL_COLUMNS {
            return Err(ObsError::parse_at(
                FormatTag::Covis3d,
                self.ordinal,
                format!(
                    "expected at least {KERNEL_COLUMNS} columns, got {}",
                    tokens.len()
                ),
            ));
        }

        let mut values = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let v = token.parse::<f32>().map_err(|_| {
                ObsError::parse_at(
                    FormatTag::Covis3d,
                    self.ordinal,
                    format!("non-numeric column '{token}'"),
                )
            })?;
            values.push(v as f64);
        }

        let kernel = KernelPayload {
            position: [values[0], values[1], values[2]],
            orientation: [values[3], values[4], values[5], values[6]],
            weight: values[7],
        };
        let mut obs = Observation::with_kernel(FormatTag::Covis3d, kernel);
        obs.descriptor = values[KERNEL_COLUMNS..].to_vec();
        Ok(obs)
    }
}

impl ObservationReader for Covis3dWandererReader {
    fn format(&self) -> FormatTag {
        FormatTag::Covis3d
    }

    fn reset(&mut self) -> Result<()> {
        self.reopen()
    }

    fn next_observation(&mut self) -> Result<Option<Observation>> {
        let input = match self.input.as_mut() {
            Some(input) => input,
            None => return Ok(None),
        };

        let mut line = String::new();
        loop {
            line.clear();
            let n = input.read_line(&mut line).map_err(|e| {
                ObsError::io(format!("read line from {}", self.path), e.to_string())
            })?;
            if n == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let obs = self.decode_line(trimmed)?;
            self.ordinal += 1;
            return Ok(Some(obs));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, data: &[u8]) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "obscodec_test_wanderer_{}_{}.txt",
            std::process::id(),
            name
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(data).unwrap();
        path
    }

    #[test]
    fn test_reads_records_and_descriptor() {
        let path = temp_file(
            "basic",
            b"# wanderer output\n\
              1 2 3 1 0 0 0 0.5\n\
              \n\
              4 5 6 0 1 0 0 0.25 9 8\n",
        );
        let mut reader = Covis3dWandererReader::open(&path).unwrap();

        let first = reader.next_observation().unwrap().unwrap();
        assert_eq!(first.tag(), FormatTag::Covis3d);
        assert_eq!(first.kernel.position, [1.0, 2.0, 3.0]);
        assert_eq!(first.kernel.weight, 0.5);
        assert!(first.descriptor.is_empty());

        let second = reader.next_observation().unwrap().unwrap();
        assert_eq!(second.kernel.orientation, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(second.descriptor, vec![9.0, 8.0]);

        assert!(reader.next_observation().unwrap().is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_reset_reproduces_sequence() {
        let path = temp_file("reset", b"1 2 3 1 0 0 0 0.5\n4 5 6 1 0 0 0 1\n");
        let mut reader = Covis3dWandererReader::open(&path).unwrap();

        let first_pass: Vec<_> = reader.observations().map(|r| r.unwrap()).collect();
        reader.reset().unwrap();
        reader.reset().unwrap();
        let second_pass: Vec<_> = reader.observations().map(|r| r.unwrap()).collect();

        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass.len(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_short_line_reports_ordinal() {
        let path = temp_file("short", b"1 2 3 1 0 0 0 0.5\n1 2 3\n");
        let mut reader = Covis3dWandererReader::open(&path).unwrap();
        reader.next_observation().unwrap();
        let err = reader.next_observation().unwrap_err();
        match err {
            ObsError::Parse { record, .. } => assert_eq!(record, Some(1)),
            other => panic!("expected parse error, got {other}"),
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Covis3dWandererReader::open("/nonexistent/wanderer.txt").unwrap_err();
        assert!(matches!(err, ObsError::Io { .. }));
    }
}
