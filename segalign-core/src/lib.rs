//! segalign core library
//!
//! Read segmentation, input validation and orchestration of the
//! segmenter → aligner → merger process pipeline.

pub mod types;
pub mod segment;
pub mod io;
pub mod validate;
pub mod params;
pub mod pipeline;
pub mod driver;

// Re-export commonly used types and functions
pub use types::{ReadLength, SegmentBoundary, SegmentationParams};
pub use segment::{plan_segments, SegmentPlan, SegmentError};
pub use io::{FastqProbe, ProbeError, ReadLengthProbe};
pub use validate::{validate, validate_segment_length, InputValidator, ValidationError};
pub use params::{AlignMode, AlignmentParams, QualityFormat};
pub use pipeline::{
    LogSink, PipelineError, PipelineOrchestrator, PipelineResult, StageId, StageReport,
    StageTools, ToolCommand,
};
pub use driver::{align, AlignConfig, AlignError, AlignSummary, AlignmentDriver};

/// Version information for the segalign core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Segments shorter than this align with too little specificity to be useful.
pub const MIN_SEGMENT_LENGTH: usize = 20;

/// Process exit code for a successful run
pub const JOB_SUCCESS: i32 = 0;

/// Process exit code for any failed run
pub const JOB_ERROR: i32 = 1;
