// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for obscodec.
//!
//! Three failure families cover observation stream I/O:
//! - `Io` - the underlying resource cannot be opened, created or reopened;
//!   the current call fails but the caller may retry elsewhere
//! - `Parse` - a record failed to decode; the remaining stream content is no
//!   longer trustworthy and the caller must stop reading it
//! - `ContractViolation` - a caller bug (wrong-format record, write before
//!   init); not recoverable at runtime
//!
//! End-of-stream is never an error: readers signal it with `Ok(None)`.

use std::fmt;

use super::FormatTag;

/// Errors that can occur during observation stream I/O.
#[derive(Debug, Clone)]
pub enum ObsError {
    /// Underlying resource cannot be opened, created or reopened
    Io {
        /// What was being done (e.g., "open scene.pcd for reading")
        context: String,
        /// Error message from the operating system
        message: String,
    },

    /// Structural or type mismatch while decoding a record
    Parse {
        /// Format being decoded
        format: FormatTag,
        /// Zero-based ordinal of the offending record, when known
        record: Option<usize>,
        /// Error message
        message: String,
    },

    /// Caller bug: writer fed a wrong-format record, or used before init
    ContractViolation {
        /// Description of the violated contract
        message: String,
    },

    /// Structurally valid input that this implementation does not handle
    Unsupported {
        /// What is not supported
        feature: String,
    },
}

impl ObsError {
    /// Create an I/O error.
    pub fn io(context: impl Into<String>, message: impl Into<String>) -> Self {
        ObsError::Io {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a parse error with no record position.
    pub fn parse(format: FormatTag, message: impl Into<String>) -> Self {
        ObsError::Parse {
            format,
            record: None,
            message: message.into(),
        }
    }

    /// Create a parse error pinned to a record ordinal.
    pub fn parse_at(format: FormatTag, record: usize, message: impl Into<String>) -> Self {
        ObsError::Parse {
            format,
            record: Some(record),
            message: message.into(),
        }
    }

    /// Create a contract violation error.
    pub fn contract(message: impl Into<String>) -> Self {
        ObsError::ContractViolation {
            message: message.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        ObsError::Unsupported {
            feature: feature.into(),
        }
    }

    /// Pin a parse error to a record ordinal, if it has none yet.
    ///
    /// Lets the shared codec report positionless errors while the format
    /// reader attaches the stream position it tracks.
    pub fn at_record(self, record: usize) -> Self {
        match self {
            ObsError::Parse {
                format,
                record: None,
                message,
            } => ObsError::Parse {
                format,
                record: Some(record),
                message,
            },
            other => other,
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ObsError::Io { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            ObsError::Parse {
                format,
                record,
                message,
            } => {
                let mut fields = vec![("format", format.to_string())];
                if let Some(record) = record {
                    fields.push(("record", record.to_string()));
                }
                fields.push(("message", message.clone()));
                fields
            }
            ObsError::ContractViolation { message } => vec![("message", message.clone())],
            ObsError::Unsupported { feature } => vec![("feature", feature.clone())],
        }
    }
}

impl fmt::Display for ObsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObsError::Io { context, message } => {
                write!(f, "I/O error while trying to {context}: {message}")
            }
            ObsError::Parse {
                format,
                record: Some(record),
                message,
            } => {
                write!(f, "Parse error in {format} record {record}: {message}")
            }
            ObsError::Parse {
                format,
                record: None,
                message,
            } => {
                write!(f, "Parse error in {format} stream: {message}")
            }
            ObsError::ContractViolation { message } => {
                write!(f, "Contract violation: {message}")
            }
            ObsError::Unsupported { feature } => {
                write!(f, "Unsupported feature: '{feature}'")
            }
        }
    }
}

impl std::error::Error for ObsError {}

impl From<std::io::Error> for ObsError {
    fn from(err: std::io::Error) -> Self {
        ObsError::Io {
            context: "access the underlying stream".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for obscodec operations.
pub type Result<T> = std::result::Result<T, ObsError>;
