use serde::{Deserialize, Serialize};
use std::fmt;

/// Length in bases of the reads in an input file.
pub type ReadLength = usize;

/// Half-open `[start, end)` range of zero-based offsets into a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentBoundary {
    pub start: usize,
    pub end: usize,
}

impl SegmentBoundary {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<(usize, usize)> for SegmentBoundary {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

impl fmt::Display for SegmentBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

/// Scalar inputs of the segment planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationParams {
    pub read_length: ReadLength,
    pub segment_length: usize,
    /// Drop the read suffix that does not fill a whole segment
    pub segment_trim: bool,
    pub trim5: usize,
    pub trim3: usize,
}

impl SegmentationParams {
    /// Read length left after removing both trims, saturating at zero.
    pub fn trimmed_length(&self) -> usize {
        self.read_length
            .saturating_sub(self.trim5)
            .saturating_sub(self.trim3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_len() {
        let b = SegmentBoundary::new(25, 50);
        assert_eq!(b.len(), 25);
        assert!(!b.is_empty());
        assert!(SegmentBoundary::new(30, 25).is_empty());
        assert_eq!(SegmentBoundary::new(30, 25).len(), 0);
    }

    #[test]
    fn test_boundary_display() {
        assert_eq!(SegmentBoundary::from((0, 25)).to_string(), "(0, 25)");
    }

    #[test]
    fn test_trimmed_length_saturates() {
        let params = SegmentationParams {
            read_length: 10,
            segment_length: 25,
            segment_trim: false,
            trim5: 8,
            trim3: 8,
        };
        assert_eq!(params.trimmed_length(), 0);
    }
}
