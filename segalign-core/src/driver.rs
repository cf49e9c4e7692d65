//! Top-level segmented alignment
//!
//! Validation, planning and the process pipeline, in that order. Nothing is
//! spawned unless the inputs pass validation.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io::{FastqProbe, ReadLengthProbe};
use crate::params::AlignmentParams;
use crate::pipeline::{LogSink, PipelineError, PipelineOrchestrator, PipelineResult, StageId, StageTools};
use crate::segment::{plan_segments, SegmentError, SegmentPlan};
use crate::types::ReadLength;
use crate::validate::{InputValidator, ValidationError};

#[derive(Debug, Error)]
pub enum AlignError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Segmentation(#[from] SegmentError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("{stage} stage failed")]
    StageFailed { stage: StageId, result: PipelineResult },
}

impl AlignError {
    /// Whether the run was rejected before any stage was started
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, AlignError::Validation(_) | AlignError::Segmentation(_))
    }
}

/// Settings for one segmented alignment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignConfig {
    pub segment_length: usize,
    pub segment_trim: bool,
    pub trim5: usize,
    pub trim3: usize,
    pub params: AlignmentParams,
    pub tools: StageTools,
    pub log_sink: LogSink,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            segment_length: 25,
            segment_trim: false,
            trim5: 0,
            trim3: 0,
            params: AlignmentParams::default(),
            tools: StageTools::default(),
            log_sink: LogSink::Discard,
        }
    }
}

/// What a successful run did
#[derive(Debug, Clone)]
pub struct AlignSummary {
    pub read_length: ReadLength,
    pub segments: SegmentPlan,
    pub output_file: PathBuf,
    pub result: PipelineResult,
}

pub struct AlignmentDriver<P = FastqProbe> {
    config: AlignConfig,
    validator: InputValidator<P>,
}

impl AlignmentDriver<FastqProbe> {
    pub fn new(config: AlignConfig) -> Self {
        Self::with_probe(config, FastqProbe)
    }
}

impl<P: ReadLengthProbe> AlignmentDriver<P> {
    pub fn with_probe(config: AlignConfig, probe: P) -> Self {
        Self {
            config,
            validator: InputValidator::with_probe(probe),
        }
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    pub fn align<F: AsRef<Path>>(
        &self,
        fastq_files: &[F],
        reference_index: &str,
        output_file: &Path,
    ) -> Result<AlignSummary, AlignError> {
        let config = &self.config;
        let read_length = self.validator.validate(
            fastq_files,
            config.segment_length,
            config.trim5,
            config.trim3,
        )?;

        let segments = plan_segments(
            read_length,
            config.segment_length,
            config.segment_trim,
            config.trim5,
            config.trim3,
        )?;
        log::info!(
            "Dividing {}bp reads into {} segments: {}",
            read_length,
            segments.len(),
            segments
        );

        log::info!("Running segmented alignment");
        let orchestrator = PipelineOrchestrator::new(config.tools.clone());
        let result = orchestrator.run(
            fastq_files,
            output_file,
            &segments,
            &config.params,
            reference_index,
            &config.log_sink,
        )?;

        if let Some(stage) = result.failing_stage() {
            return Err(AlignError::StageFailed { stage, result });
        }

        log::info!("Alignment completed");
        Ok(AlignSummary {
            read_length,
            segments,
            output_file: output_file.to_path_buf(),
            result,
        })
    }
}

/// Run a segmented alignment with the FASTQ read-length probe.
pub fn align<F: AsRef<Path>>(
    fastq_files: &[F],
    reference_index: &str,
    output_file: &Path,
    config: AlignConfig,
) -> Result<AlignSummary, AlignError> {
    AlignmentDriver::new(config).align(fastq_files, reference_index, output_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ProbeError;
    use crate::pipeline::ToolCommand;
    use tempfile::{NamedTempFile, TempDir};

    struct ConstantProbe(ReadLength);

    impl ReadLengthProbe for ConstantProbe {
        fn read_length(&self, _path: &Path) -> Result<ReadLength, ProbeError> {
            Ok(self.0)
        }
    }

    fn unspawnable_tools() -> StageTools {
        StageTools {
            segmenter: ToolCommand::new("/nonexistent/segmenter"),
            aligner: ToolCommand::new("/nonexistent/aligner"),
            merger: ToolCommand::new("/nonexistent/merger"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = AlignConfig::default();
        assert_eq!(config.segment_length, 25);
        assert!(!config.segment_trim);
        assert_eq!(config.log_sink, LogSink::Discard);
    }

    #[test]
    fn test_validation_failure_spawns_nothing() {
        let reads = NamedTempFile::new().unwrap();
        let out = TempDir::new().unwrap();
        let config = AlignConfig {
            segment_length: 50,
            tools: unspawnable_tools(),
            ..Default::default()
        };
        let driver = AlignmentDriver::with_probe(config, ConstantProbe(36));
        let err = driver
            .align(&[reads.path()], "index", &out.path().join("out.bam"))
            .unwrap_err();

        // Had a stage been started this would be a spawn error instead.
        assert!(matches!(
            err,
            AlignError::Validation(ValidationError::SegmentTooLong { .. })
        ));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_spawn_failure_is_a_resource_error() {
        let reads = NamedTempFile::new().unwrap();
        let out = TempDir::new().unwrap();
        let config = AlignConfig {
            tools: unspawnable_tools(),
            ..Default::default()
        };
        let driver = AlignmentDriver::with_probe(config, ConstantProbe(76));
        let err = driver
            .align(&[reads.path()], "index", &out.path().join("out.bam"))
            .unwrap_err();

        match err {
            AlignError::Pipeline(PipelineError::Spawn { stage, .. }) => {
                assert_eq!(stage, StageId::Segmenter)
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
