// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Kernel payload codec.
//!
//! A pure encode/decode pair for the canonical kernel tuple. Two encodings:
//! - **ascii**: one whitespace-separated line, `x y z qw qx qy qz weight`
//! - **binary**: eight little-endian `f32` values, 32 bytes per record
//!
//! The same field order is used in both directions and both encodings.
//! Values are stored on disk as `f32`; ascii output uses Rust's shortest
//! round-trip float formatting, so `decode(encode(p)) == p` to `f32`
//! precision for either encoding.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::core::{FormatTag, KernelPayload, ObsError, Result};

/// Payload encoding variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelEncoding {
    /// Whitespace-separated decimal text, one record per line
    Ascii,
    /// Packed little-endian `f32`, fixed-width records
    Binary,
}

impl std::str::FromStr for KernelEncoding {
    type Err = ObsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ascii" => Ok(KernelEncoding::Ascii),
            "binary" => Ok(KernelEncoding::Binary),
            other => Err(ObsError::unsupported(format!(
                "kernel payload encoding: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for KernelEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            KernelEncoding::Ascii => write!(f, "ascii"),
            KernelEncoding::Binary => write!(f, "binary"),
        }
    }
}

/// Names of the kernel fields, in canonical order.
pub const KERNEL_FIELDS: [&str; 8] = ["x", "y", "z", "qw", "qx", "qy", "qz", "weight"];

/// Byte width of one binary-encoded kernel record.
pub const KERNEL_BINARY_WIDTH: usize = KERNEL_FIELDS.len() * 4;

/// Flatten a payload into canonical field order.
fn kernel_values(k: &KernelPayload) -> [f32; 8] {
    [
        k.position[0] as f32,
        k.position[1] as f32,
        k.position[2] as f32,
        k.orientation[0] as f32,
        k.orientation[1] as f32,
        k.orientation[2] as f32,
        k.orientation[3] as f32,
        k.weight as f32,
    ]
}

/// Rebuild a payload from canonical field order.
fn kernel_from_values(v: [f32; 8]) -> KernelPayload {
    KernelPayload {
        position: [v[0] as f64, v[1] as f64, v[2] as f64],
        orientation: [v[3] as f64, v[4] as f64, v[5] as f64, v[6] as f64],
        weight: v[7] as f64,
    }
}

/// Encode one kernel payload.
///
/// Ascii output carries no line terminator; the caller owns record
/// separation. Binary output is exactly [`KERNEL_BINARY_WIDTH`] bytes.
pub fn encode_kernel(kernel: &KernelPayload, encoding: KernelEncoding) -> Vec<u8> {
    let values = kernel_values(kernel);
    match encoding {
        KernelEncoding::Ascii => {
            let mut line = String::new();
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                line.push_str(&v.to_string());
            }
            line.into_bytes()
        }
        KernelEncoding::Binary => {
            let mut bytes = Vec::with_capacity(KERNEL_BINARY_WIDTH);
            for v in values {
                // Writing to a Vec cannot fail
                bytes.write_f32::<LittleEndian>(v).unwrap();
            }
            bytes
        }
    }
}

/// Decode one kernel payload.
///
/// Ascii input is one whitespace-separated record; binary input is exactly
/// one fixed-width record. Fails with a parse error on field-count
/// mismatch, non-numeric ascii tokens, or truncated/oversized byte runs.
pub fn decode_kernel(input: &[u8], encoding: KernelEncoding) -> Result<KernelPayload> {
    match encoding {
        KernelEncoding::Ascii => {
            let text = std::str::from_utf8(input)
                .map_err(|e| ObsError::parse(FormatTag::Pcd, format!("non-utf8 payload: {e}")))?;
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.len() != KERNEL_FIELDS.len() {
                return Err(ObsError::parse(
                    FormatTag::Pcd,
                    format!(
                        "expected {} kernel fields, got {}",
                        KERNEL_FIELDS.len(),
                        tokens.len()
                    ),
                ));
            }
            let mut values = [0.0f32; 8];
            for (i, token) in tokens.iter().enumerate() {
                values[i] = token.parse::<f32>().map_err(|_| {
                    ObsError::parse(
                        FormatTag::Pcd,
                        format!("non-numeric token '{token}' in field '{}'", KERNEL_FIELDS[i]),
                    )
                })?;
            }
            Ok(kernel_from_values(values))
        }
        KernelEncoding::Binary => {
            if input.len() != KERNEL_BINARY_WIDTH {
                return Err(ObsError::parse(
                    FormatTag::Pcd,
                    format!(
                        "expected {KERNEL_BINARY_WIDTH} payload bytes, got {}",
                        input.len()
                    ),
                ));
            }
            let mut cursor = Cursor::new(input);
            let mut values = [0.0f32; 8];
            for v in values.iter_mut() {
                // Length was checked above
                *v = cursor.read_f32::<LittleEndian>().unwrap();
            }
            Ok(kernel_from_values(values))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_kernel() -> KernelPayload {
        KernelPayload {
            position: [1.5, -2.25, 1.0e-3],
            orientation: [0.5, 0.5, -0.5, 0.5],
            weight: 0.125,
        }
    }

    #[test]
    fn test_ascii_round_trip() {
        let kernel = sample_kernel();
        let bytes = encode_kernel(&kernel, KernelEncoding::Ascii);
        let decoded = decode_kernel(&bytes, KernelEncoding::Ascii).unwrap();
        assert_eq!(decoded, kernel);
    }

    #[test]
    fn test_binary_round_trip() {
        let kernel = sample_kernel();
        let bytes = encode_kernel(&kernel, KernelEncoding::Binary);
        assert_eq!(bytes.len(), KERNEL_BINARY_WIDTH);
        let decoded = decode_kernel(&bytes, KernelEncoding::Binary).unwrap();
        assert_eq!(decoded, kernel);
    }

    #[test]
    fn test_ascii_field_count_mismatch() {
        let err = decode_kernel(b"1 2 3", KernelEncoding::Ascii).unwrap_err();
        assert!(matches!(err, ObsError::Parse { .. }));
    }

    #[test]
    fn test_ascii_non_numeric_token() {
        let err = decode_kernel(b"1 2 3 4 5 6 7 banana", KernelEncoding::Ascii).unwrap_err();
        assert!(err.to_string().contains("banana"));
    }

    #[test]
    fn test_binary_truncated() {
        let kernel = sample_kernel();
        let bytes = encode_kernel(&kernel, KernelEncoding::Binary);
        let err = decode_kernel(&bytes[..20], KernelEncoding::Binary).unwrap_err();
        assert!(matches!(err, ObsError::Parse { .. }));
    }

    #[test]
    fn test_round_trip_is_f32_exact() {
        // A value that is not representable in f32; the codec must be
        // stable once the value has passed through it once.
        let kernel = KernelPayload {
            position: [0.1, 0.2, 0.3],
            orientation: [1.0, 0.0, 0.0, 0.0],
            weight: 1.0 / 3.0,
        };
        let once =
            decode_kernel(&encode_kernel(&kernel, KernelEncoding::Ascii), KernelEncoding::Ascii)
                .unwrap();
        let twice =
            decode_kernel(&encode_kernel(&once, KernelEncoding::Ascii), KernelEncoding::Ascii)
                .unwrap();
        assert_eq!(once, twice);
        for i in 0..3 {
            assert!((once.position[i] - kernel.position[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("ascii".parse::<KernelEncoding>().unwrap(), KernelEncoding::Ascii);
        assert_eq!("binary".parse::<KernelEncoding>().unwrap(), KernelEncoding::Binary);
        assert!("base64".parse::<KernelEncoding>().is_err());
    }
}
