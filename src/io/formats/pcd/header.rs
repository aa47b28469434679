// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! PCD header parsing and emission.
//!
//! The header is a block of `KEYWORD value...` lines, terminated by the
//! `DATA` line; everything after that line is payload. `#` comment lines
//! and blank lines are skipped. Keyword order follows the PCD convention
//! (`VERSION`, `FIELDS`, `SIZE`, `TYPE`, `COUNT`, `WIDTH`, `HEIGHT`,
//! `VIEWPOINT`, `POINTS`, `DATA`) but the parser accepts any order as
//! long as the mandatory keywords appear before `DATA`.

use std::io::{BufRead, Write};

use crate::codec::kernel::{KernelEncoding, KERNEL_FIELDS};
use crate::core::{FormatTag, ObsError, Result};

/// PCD version emitted by the writer.
const PCD_VERSION: &str = "0.7";

/// Parsed PCD header block.
#[derive(Debug, Clone, PartialEq)]
pub struct PcdHeader {
    /// Declared format version
    pub version: String,
    /// Field names, in payload order
    pub fields: Vec<String>,
    /// Per-field byte sizes
    pub sizes: Vec<usize>,
    /// Per-field type tags (I, U or F)
    pub types: Vec<String>,
    /// Per-field component counts
    pub counts: Vec<usize>,
    /// Cloud width
    pub width: usize,
    /// Cloud height
    pub height: usize,
    /// Acquisition viewpoint, kept verbatim
    pub viewpoint: String,
    /// Total record count; the payload must honor it exactly
    pub points: usize,
    /// Payload encoding
    pub encoding: KernelEncoding,
}

impl PcdHeader {
    /// The header describing a kernel-layout cloud of `points` records.
    pub fn for_kernel_cloud(points: usize, encoding: KernelEncoding) -> Self {
        let n = KERNEL_FIELDS.len();
        Self {
            version: PCD_VERSION.to_string(),
            fields: KERNEL_FIELDS.iter().map(|s| s.to_string()).collect(),
            sizes: vec![4; n],
            types: vec!["F".to_string(); n],
            counts: vec![1; n],
            width: points,
            height: 1,
            viewpoint: "0 0 0 1 0 0 0".to_string(),
            points,
            encoding,
        }
    }

    /// Parse a header block, consuming input through the `DATA` line.
    pub fn parse<R: BufRead>(input: &mut R) -> Result<Self> {
        let mut version = None;
        let mut fields: Option<Vec<String>> = None;
        let mut sizes: Option<Vec<usize>> = None;
        let mut types: Option<Vec<String>> = None;
        let mut counts: Option<Vec<usize>> = None;
        let mut width = None;
        let mut height = None;
        let mut viewpoint = None;
        let mut points = None;

        let mut line = String::new();
        let encoding = loop {
            line.clear();
            let n = input
                .read_line(&mut line)
                .map_err(|e| ObsError::io("read PCD header line", e.to_string()))?;
            if n == 0 {
                return Err(ObsError::parse(
                    FormatTag::Pcd,
                    "header ended before DATA line",
                ));
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut tokens = trimmed.split_whitespace();
            let keyword = tokens.next().unwrap_or_default().to_ascii_uppercase();
            let rest: Vec<&str> = tokens.collect();

            match keyword.as_str() {
                "VERSION" => version = Some(single_value(&rest, "VERSION")?.to_string()),
                "FIELDS" => fields = Some(rest.iter().map(|s| s.to_string()).collect()),
                "SIZE" => sizes = Some(parse_usizes(&rest, "SIZE")?),
                "TYPE" => types = Some(rest.iter().map(|s| s.to_string()).collect()),
                "COUNT" => counts = Some(parse_usizes(&rest, "COUNT")?),
                "WIDTH" => width = Some(parse_usize(single_value(&rest, "WIDTH")?, "WIDTH")?),
                "HEIGHT" => height = Some(parse_usize(single_value(&rest, "HEIGHT")?, "HEIGHT")?),
                "VIEWPOINT" => viewpoint = Some(rest.join(" ")),
                "POINTS" => points = Some(parse_usize(single_value(&rest, "POINTS")?, "POINTS")?),
                "DATA" => break single_value(&rest, "DATA")?.parse::<KernelEncoding>()?,
                other => {
                    return Err(ObsError::parse(
                        FormatTag::Pcd,
                        format!("unknown header keyword '{other}'"),
                    ));
                }
            }
        };

        let fields = fields
            .ok_or_else(|| ObsError::parse(FormatTag::Pcd, "header missing FIELDS"))?;
        let n = fields.len();
        let sizes = sizes.unwrap_or_else(|| vec![4; n]);
        let types = types.unwrap_or_else(|| vec!["F".to_string(); n]);
        let counts = counts.unwrap_or_else(|| vec![1; n]);
        if sizes.len() != n || types.len() != n || counts.len() != n {
            return Err(ObsError::parse(
                FormatTag::Pcd,
                format!(
                    "SIZE/TYPE/COUNT lengths disagree with {} FIELDS entries",
                    n
                ),
            ));
        }

        let points = match (points, width, height) {
            (Some(points), _, _) => points,
            (None, Some(width), Some(height)) => width * height,
            _ => {
                return Err(ObsError::parse(
                    FormatTag::Pcd,
                    "header missing POINTS (and WIDTH/HEIGHT)",
                ));
            }
        };

        Ok(Self {
            version: version.unwrap_or_else(|| PCD_VERSION.to_string()),
            width: width.unwrap_or(points),
            height: height.unwrap_or(1),
            viewpoint: viewpoint.unwrap_or_else(|| "0 0 0 1 0 0 0".to_string()),
            fields,
            sizes,
            types,
            counts,
            points,
            encoding,
        })
    }

    /// Check that the declared layout is the canonical kernel layout.
    pub fn validate_kernel_layout(&self) -> Result<()> {
        let canonical = self.fields.len() == KERNEL_FIELDS.len()
            && self
                .fields
                .iter()
                .zip(KERNEL_FIELDS.iter())
                .all(|(a, b)| a == b)
            && self.sizes.iter().all(|&s| s == 4)
            && self.types.iter().all(|t| t == "F")
            && self.counts.iter().all(|&c| c == 1);
        if canonical {
            Ok(())
        } else {
            Err(ObsError::unsupported(format!(
                "PCD field layout: {}",
                self.fields.join(" ")
            )))
        }
    }

    /// Byte width of one binary payload record under this layout.
    pub fn record_width(&self) -> usize {
        self.sizes
            .iter()
            .zip(self.counts.iter())
            .map(|(s, c)| s * c)
            .sum()
    }

    /// Emit the header block, including the terminating `DATA` line.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "# .PCD v{} - Point Cloud Data file format", self.version)?;
        writeln!(out, "VERSION {}", self.version)?;
        writeln!(out, "FIELDS {}", self.fields.join(" "))?;
        writeln!(out, "SIZE {}", join_usizes(&self.sizes))?;
        writeln!(out, "TYPE {}", self.types.join(" "))?;
        writeln!(out, "COUNT {}", join_usizes(&self.counts))?;
        writeln!(out, "WIDTH {}", self.width)?;
        writeln!(out, "HEIGHT {}", self.height)?;
        writeln!(out, "VIEWPOINT {}", self.viewpoint)?;
        writeln!(out, "POINTS {}", self.points)?;
        writeln!(out, "DATA {}", self.encoding)?;
        Ok(())
    }
}

fn single_value<'a>(rest: &[&'a str], keyword: &str) -> Result<&'a str> {
    match rest {
        [value] => Ok(value),
        _ => Err(ObsError::parse(
            FormatTag::Pcd,
            format!("{keyword} expects exactly one value, got {}", rest.len()),
        )),
    }
}

fn parse_usize(token: &str, keyword: &str) -> Result<usize> {
    token.parse::<usize>().map_err(|_| {
        ObsError::parse(
            FormatTag::Pcd,
            format!("non-numeric {keyword} value '{token}'"),
        )
    })
}

fn parse_usizes(rest: &[&str], keyword: &str) -> Result<Vec<usize>> {
    rest.iter().map(|t| parse_usize(t, keyword)).collect()
}

fn join_usizes(values: &[usize]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn test_emit_then_parse() {
        let header = PcdHeader::for_kernel_cloud(42, KernelEncoding::Binary);
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();

        let parsed = PcdHeader::parse(&mut BufReader::new(bytes.as_slice())).unwrap();
        assert_eq!(parsed, header);
        parsed.validate_kernel_layout().unwrap();
        assert_eq!(parsed.record_width(), 32);
    }

    #[test]
    fn test_parse_stops_at_data_line() {
        let text = "VERSION 0.7\nFIELDS x y z qw qx qy qz weight\nSIZE 4 4 4 4 4 4 4 4\n\
                    TYPE F F F F F F F F\nCOUNT 1 1 1 1 1 1 1 1\nWIDTH 1\nHEIGHT 1\n\
                    VIEWPOINT 0 0 0 1 0 0 0\nPOINTS 1\nDATA ascii\n1 2 3 1 0 0 0 1\n";
        let mut input = BufReader::new(text.as_bytes());
        let header = PcdHeader::parse(&mut input).unwrap();
        assert_eq!(header.points, 1);
        assert_eq!(header.encoding, KernelEncoding::Ascii);

        // The payload must still be available after the header
        let mut payload = String::new();
        input.read_line(&mut payload).unwrap();
        assert_eq!(payload.trim(), "1 2 3 1 0 0 0 1");
    }

    #[test]
    fn test_points_falls_back_to_width_times_height() {
        let text = "FIELDS x y z qw qx qy qz weight\nWIDTH 3\nHEIGHT 2\nDATA ascii\n";
        let header = PcdHeader::parse(&mut BufReader::new(text.as_bytes())).unwrap();
        assert_eq!(header.points, 6);
    }

    #[test]
    fn test_missing_data_line() {
        let text = "VERSION 0.7\nFIELDS x y z\n";
        let err = PcdHeader::parse(&mut BufReader::new(text.as_bytes())).unwrap_err();
        assert!(matches!(err, ObsError::Parse { .. }));
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let text = "FIELDS x y z qw qx qy qz weight\nPOINTS 0\nDATA base64\n";
        let err = PcdHeader::parse(&mut BufReader::new(text.as_bytes())).unwrap_err();
        assert!(matches!(err, ObsError::Unsupported { .. }));
    }

    #[test]
    fn test_non_kernel_layout_rejected() {
        let text = "FIELDS x y z rgb\nSIZE 4 4 4 4\nTYPE F F F U\nCOUNT 1 1 1 1\n\
                    POINTS 0\nDATA ascii\n";
        let header = PcdHeader::parse(&mut BufReader::new(text.as_bytes())).unwrap();
        let err = header.validate_kernel_layout().unwrap_err();
        assert!(err.to_string().contains("rgb"));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = "# comment\n\nVERSION 0.7\n# another\nFIELDS x y z qw qx qy qz weight\n\
                    POINTS 0\nDATA binary\n";
        let header = PcdHeader::parse(&mut BufReader::new(text.as_bytes())).unwrap();
        assert_eq!(header.encoding, KernelEncoding::Binary);
    }
}
