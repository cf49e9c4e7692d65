//! Pre-flight checks on the read files
//!
//! Everything here runs before any pipeline stage is spawned, so a failure
//! never leaves processes or partial output behind.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::io::{FastqProbe, ProbeError, ReadLengthProbe};
use crate::types::ReadLength;
use crate::MIN_SEGMENT_LENGTH;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("expected one (single-end) or two (paired-end) read files, got {0}")]
    InvalidInputCount(usize),

    #[error("mate '{mate}' fastq file '{}' is not valid", path.display())]
    MissingFile { mate: usize, path: PathBuf },

    #[error("could not determine read length of '{}': {source}", path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: ProbeError,
    },

    #[error("read lengths differ between mates: {lengths:?}")]
    InconsistentReadLength { lengths: Vec<ReadLength> },

    #[error("segment length ({segment_length}) too small (min is {min})")]
    SegmentTooShort { segment_length: usize, min: usize },

    #[error("segment length ({segment_length}) longer than trimmed read length ({trimmed_length})")]
    SegmentTooLong {
        segment_length: usize,
        trimmed_length: usize,
    },
}

/// Validates read files against the requested segmentation
pub struct InputValidator<P = FastqProbe> {
    probe: P,
}

impl InputValidator<FastqProbe> {
    pub fn new() -> Self {
        Self { probe: FastqProbe }
    }
}

impl Default for InputValidator<FastqProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ReadLengthProbe> InputValidator<P> {
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Check the read files and return their common read length.
    pub fn validate<F: AsRef<Path>>(
        &self,
        fastq_files: &[F],
        segment_length: usize,
        trim5: usize,
        trim3: usize,
    ) -> Result<ReadLength, ValidationError> {
        if fastq_files.is_empty() || fastq_files.len() > 2 {
            return Err(ValidationError::InvalidInputCount(fastq_files.len()));
        }

        let mut read_lengths = Vec::with_capacity(fastq_files.len());
        for (mate, fastq_file) in fastq_files.iter().enumerate() {
            let path = fastq_file.as_ref();
            if !path.is_file() {
                return Err(ValidationError::MissingFile {
                    mate,
                    path: path.to_path_buf(),
                });
            }
            log::debug!("Checking read length for file {}", path.display());
            let length = self
                .probe
                .read_length(path)
                .map_err(|source| ValidationError::Probe {
                    path: path.to_path_buf(),
                    source,
                })?;
            log::debug!("Read length for file {}: {}", path.display(), length);
            read_lengths.push(length);
        }

        let distinct: BTreeSet<_> = read_lengths.iter().collect();
        if distinct.len() > 1 {
            log::error!(
                "read lengths mate1={} and mate2={} are unequal",
                read_lengths[0],
                read_lengths[1]
            );
            return Err(ValidationError::InconsistentReadLength {
                lengths: read_lengths,
            });
        }

        let read_length = read_lengths[0];
        validate_segment_length(read_length, segment_length, trim5, trim3)?;
        Ok(read_length)
    }
}

/// Check the read files with the FASTQ probe and return their read length.
pub fn validate<F: AsRef<Path>>(
    fastq_files: &[F],
    segment_length: usize,
    trim5: usize,
    trim3: usize,
) -> Result<ReadLength, ValidationError> {
    InputValidator::new().validate(fastq_files, segment_length, trim5, trim3)
}

/// Range check of a segment length against a known read length.
pub fn validate_segment_length(
    read_length: ReadLength,
    segment_length: usize,
    trim5: usize,
    trim3: usize,
) -> Result<(), ValidationError> {
    if segment_length < MIN_SEGMENT_LENGTH {
        return Err(ValidationError::SegmentTooShort {
            segment_length,
            min: MIN_SEGMENT_LENGTH,
        });
    }
    let trimmed_length = read_length.saturating_sub(trim5).saturating_sub(trim3);
    if segment_length > trimmed_length {
        return Err(ValidationError::SegmentTooLong {
            segment_length,
            trimmed_length,
        });
    }
    Ok(())
}
