//! Read file access
//!
//! Only as much of the read files is parsed as validation needs: the length
//! of a representative record. Rewriting reads into segments is done by the
//! external segmenter stage.

pub mod fastq;

pub use fastq::{FastqProbe, ProbeError, ReadLengthProbe};
