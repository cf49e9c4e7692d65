//! Read segmentation planning
//!
//! Splits the usable part of a read into consecutive fixed-length windows.
//! The boundary order defines the segment numbering that the segmenter and
//! the merger stages agree on, so the values produced here must stay stable.

use std::fmt;
use thiserror::Error;

use crate::types::{ReadLength, SegmentBoundary, SegmentationParams};

/// Errors raised when the planner's preconditions do not hold
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("segment length must be positive")]
    ZeroSegmentLength,

    #[error("trims ({trim5} + {trim3}) leave nothing of a {read_length}bp read")]
    TrimExceedsRead {
        read_length: ReadLength,
        trim5: usize,
        trim3: usize,
    },

    #[error("trimmed read length ({trimmed_length}) is shorter than one segment ({segment_length})")]
    NoCompleteSegment {
        trimmed_length: usize,
        segment_length: usize,
    },

    #[error("segment ({start}, {end}) is empty")]
    EmptySegment { start: usize, end: usize },
}

/// Ordered, non-empty list of segment boundaries for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPlan {
    boundaries: Vec<SegmentBoundary>,
}

impl SegmentPlan {
    pub fn boundaries(&self) -> &[SegmentBoundary] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SegmentBoundary> {
        self.boundaries.iter()
    }

    /// Comma-separated segment starts, as passed to the segmenter
    pub fn starts_arg(&self) -> String {
        join_offsets(self.boundaries.iter().map(|b| b.start))
    }

    /// Comma-separated segment ends, as passed to the segmenter
    pub fn ends_arg(&self) -> String {
        join_offsets(self.boundaries.iter().map(|b| b.end))
    }

    /// Length of the longest segment; the aligner uses it as its seed length.
    pub fn max_segment_length(&self) -> usize {
        self.boundaries.iter().map(|b| b.len()).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a SegmentPlan {
    type Item = &'a SegmentBoundary;
    type IntoIter = std::slice::Iter<'a, SegmentBoundary>;

    fn into_iter(self) -> Self::IntoIter {
        self.boundaries.iter()
    }
}

impl fmt::Display for SegmentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, boundary) in self.boundaries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", boundary)?;
        }
        write!(f, "]")
    }
}

fn join_offsets(offsets: impl Iterator<Item = usize>) -> String {
    offsets
        .map(|offset| offset.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute segment boundaries for reads of `read_length` bases.
///
/// `trim5`/`trim3` bases are ignored at either end and the remainder is cut
/// into `segment_length` windows. With `segment_trim` the bases past the last
/// whole window are dropped; otherwise the final segment is stretched to the
/// untrimmed 3' end. When only one window fits, the whole usable read is a
/// single segment.
///
/// The caller is expected to have checked the segment length against the
/// trimmed read length already (see [`crate::validate`]); violations are
/// reported as errors rather than producing a malformed plan.
pub fn plan_segments(
    read_length: ReadLength,
    segment_length: usize,
    segment_trim: bool,
    trim5: usize,
    trim3: usize,
) -> Result<SegmentPlan, SegmentError> {
    if segment_length == 0 {
        return Err(SegmentError::ZeroSegmentLength);
    }
    let trimmed_length = read_length
        .checked_sub(trim5)
        .and_then(|rest| rest.checked_sub(trim3))
        .filter(|&rest| rest > 0)
        .ok_or(SegmentError::TrimExceedsRead {
            read_length,
            trim5,
            trim3,
        })?;

    let num_segments = trimmed_length / segment_length;
    if num_segments == 0 {
        return Err(SegmentError::NoCompleteSegment {
            trimmed_length,
            segment_length,
        });
    }

    // Trim mode measures the end from offset zero, not from trim5.
    let read_end = if segment_trim {
        segment_length * num_segments
    } else {
        read_length - trim3
    };

    if num_segments == 1 {
        let only = SegmentBoundary::new(trim5, read_end);
        if only.is_empty() {
            return Err(SegmentError::EmptySegment {
                start: only.start,
                end: only.end,
            });
        }
        return Ok(SegmentPlan {
            boundaries: vec![only],
        });
    }

    let mut boundaries = Vec::with_capacity(num_segments);
    let mut start = trim5 + segment_length;
    boundaries.push(SegmentBoundary::new(trim5, start));
    for _ in 1..num_segments - 1 {
        boundaries.push(SegmentBoundary::new(start, start + segment_length));
        start += segment_length;
    }
    if start < read_end {
        boundaries.push(SegmentBoundary::new(start, read_end));
    }

    Ok(SegmentPlan { boundaries })
}

impl SegmentationParams {
    /// Plan segments for these parameters
    pub fn plan(&self) -> Result<SegmentPlan, SegmentError> {
        plan_segments(
            self.read_length,
            self.segment_length,
            self.segment_trim,
            self.trim5,
            self.trim3,
        )
    }
}
