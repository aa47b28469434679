// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core traits for unified observation I/O.
//!
//! This module defines the traits that all format-specific readers and
//! writers implement. They provide a consistent API across all supported
//! formats, so pipeline code can pair up any reader with any writer
//! without static knowledge of either format.
//!
//! Readers and writers are stateful, single-pass and single-threaded: no
//! instance is safe for concurrent use, and each exclusively owns its
//! underlying stream.

use crate::core::{FormatTag, Observation, Result};

/// Trait for reading observations from an on-disk format.
///
/// A reader is bound to one source path at construction and advances
/// through it one record at a time. After a parse failure the reader's
/// position is undefined; callers must not continue reading (they may call
/// [`reset`](ObservationReader::reset) to start over).
///
/// # Example
///
/// ```no_run
/// use obscodec::io::traits::ObservationReader;
///
/// fn count(reader: &mut dyn ObservationReader) -> obscodec::Result<usize> {
///     let mut n = 0;
///     while reader.next_observation()?.is_some() {
///         n += 1;
///     }
///     Ok(n)
/// }
/// ```
pub trait ObservationReader {
    /// The format this reader decodes. Constant for the instance; every
    /// record it produces carries this tag.
    fn format(&self) -> FormatTag;

    /// Re-establish the "not yet started" state.
    ///
    /// Reopens or re-parses the underlying source, so subsequent reads
    /// reproduce the original sequence. Fails with an `Io` error if the
    /// source cannot be reopened.
    fn reset(&mut self) -> Result<()>;

    /// Advance one logical record.
    ///
    /// Returns `Ok(Some(obs))` with a fully decoded record, `Ok(None)` once
    /// the source is exhausted, or a `Parse` error identifying the
    /// offending record's ordinal position.
    fn next_observation(&mut self) -> Result<Option<Observation>>;

    /// Iterator adapter over the remaining records.
    fn observations(&mut self) -> Observations<'_, '_>
    where
        Self: Sized,
    {
        Observations {
            reader: self,
            done: false,
        }
    }
}

impl ObservationReader for Box<dyn ObservationReader + '_> {
    fn format(&self) -> FormatTag {
        (**self).format()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn next_observation(&mut self) -> Result<Option<Observation>> {
        (**self).next_observation()
    }
}

impl ObservationReader for &mut (dyn ObservationReader + '_) {
    fn format(&self) -> FormatTag {
        (**self).format()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn next_observation(&mut self) -> Result<Option<Observation>> {
        (**self).next_observation()
    }
}

impl<'r> dyn ObservationReader + 'r {
    /// Iterator adapter over the remaining records, for trait objects.
    pub fn observations(&mut self) -> Observations<'_, 'r> {
        Observations {
            reader: self,
            done: false,
        }
    }
}

/// Streaming iterator over a reader's remaining records.
///
/// Yields `Err` at most once; iteration ends after the first parse failure
/// because the stream's remaining content is no longer trustworthy.
pub struct Observations<'a, 'r> {
    reader: &'a mut (dyn ObservationReader + 'r),
    done: bool,
}

impl Iterator for Observations<'_, '_> {
    type Item = Result<Observation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_observation() {
            Ok(Some(obs)) => Some(Ok(obs)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Trait for writing observations to an on-disk format.
///
/// Writers are buffered: records accumulate in memory until
/// [`write_buffer`](ObservationWriter::write_buffer) commits them to the
/// destination in a single pass. Formats in this crate either need the
/// total record count before any payload byte (PCD) or produce one
/// structured document that cannot be truncated mid-tree (CoViS3D XML), so
/// buffering is the uniform policy.
///
/// Durability is promised only immediately after a successful
/// `write_buffer` returns; dropping a writer with uncommitted records
/// loses them (a diagnostic is logged, nothing more).
///
/// # Example
///
/// ```no_run
/// # fn main() -> obscodec::Result<()> {
/// use obscodec::core::FormatTag;
/// use obscodec::io::registry::create_writer;
///
/// let mut writer = create_writer(FormatTag::Pcd, "out.pcd")?;
/// writer.init()?;
/// let obs = writer.template_observation();
/// writer.write_observation(&obs)?;
/// writer.write_buffer()?;
/// # Ok(())
/// # }
/// ```
pub trait ObservationWriter {
    /// The format this writer encodes; matches the tag it accepts.
    fn format(&self) -> FormatTag;

    /// The output file path.
    fn path(&self) -> &str;

    /// A freshly constructed blank record of this writer's format.
    ///
    /// Lets format-agnostic callers build a well-typed record without
    /// naming a concrete constructor.
    fn template_observation(&self) -> Observation {
        Observation::new(self.format())
    }

    /// Prepare the destination.
    ///
    /// Creates or truncates the output file; for tree-structured formats
    /// this also materializes the empty document skeleton. Fails with an
    /// `Io` error if the destination cannot be created.
    fn init(&mut self) -> Result<()>;

    /// Append one record to the pending buffer.
    ///
    /// Fails with `ContractViolation` before touching the destination if
    /// the record's tag disagrees with [`format`](ObservationWriter::format)
    /// or if `init` has not been called.
    fn write_observation(&mut self, observation: &Observation) -> Result<()>;

    /// Commit all buffered state to the destination as a single unit.
    ///
    /// The destination is rewritten in full from the retained buffer, so
    /// calling this multiple times never duplicates records, and an empty
    /// buffer still produces a syntactically valid, record-free file.
    fn write_buffer(&mut self) -> Result<()>;

    /// Discard buffered, uncommitted records; back to the post-`init`
    /// state.
    fn reset(&mut self);

    /// Number of records currently buffered.
    fn buffered_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ObsError;

    struct CountdownReader {
        remaining: usize,
        fail_at: Option<usize>,
    }

    impl ObservationReader for CountdownReader {
        fn format(&self) -> FormatTag {
            FormatTag::Pcd
        }

        fn reset(&mut self) -> Result<()> {
            Ok(())
        }

        fn next_observation(&mut self) -> Result<Option<Observation>> {
            if self.fail_at == Some(self.remaining) {
                return Err(ObsError::parse(FormatTag::Pcd, "synthetic failure"));
            }
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(Observation::new(FormatTag::Pcd)))
        }
    }

    #[test]
    fn test_observations_iterator_drains_reader() {
        let mut reader = CountdownReader {
            remaining: 3,
            fail_at: None,
        };
        let records: Vec<_> = reader.observations().collect();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_observations_iterator_stops_after_error() {
        let mut reader = CountdownReader {
            remaining: 3,
            fail_at: Some(2),
        };
        let records: Vec<_> = reader.observations().collect();
        // One good record, then the failure, then nothing: the iterator
        // fuses after the first error.
        assert_eq!(records.len(), 2);
        assert!(records[0].is_ok());
        assert!(records[1].is_err());
    }
}
