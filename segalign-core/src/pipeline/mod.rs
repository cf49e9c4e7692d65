//! Segmenter → aligner → merger process pipeline
//!
//! The three stages run as concurrent child processes joined by OS pipes, so
//! the intermediate segment and alignment streams are never buffered whole:
//! a slow consumer stalls its producer through the pipe. The orchestrator
//! itself only spawns, wires and reaps.
//!
//! Every run awaits the terminal stage first and then the upstream stages in
//! reverse order, collecting all three exit statuses even when one of them
//! failed, so no child is ever left unreaped.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::AlignmentParams;
use crate::segment::SegmentPlan;

pub mod stages;

pub use stages::{aligner_args, merger_args, segmenter_args, StageTools, ToolCommand};

/// Identity of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageId {
    Segmenter,
    Aligner,
    Merger,
}

impl StageId {
    /// Stages in data-flow order
    pub const ALL: [StageId; 3] = [StageId::Segmenter, StageId::Aligner, StageId::Merger];

    pub fn name(&self) -> &'static str {
        match self {
            StageId::Segmenter => "segmenter",
            StageId::Aligner => "aligner",
            StageId::Merger => "merger",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Destination of the aligner's diagnostic output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogSink {
    #[default]
    Discard,
    File(PathBuf),
}

impl LogSink {
    fn open(&self) -> Result<Stdio, PipelineError> {
        match self {
            LogSink::Discard => Ok(Stdio::null()),
            LogSink::File(path) => File::create(path)
                .map(Stdio::from)
                .map_err(|source| PipelineError::LogSink {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

/// Resource errors: the pipeline could not be assembled
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot open log file '{}': {source}", path.display())]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {stage} ('{}'): {source}", program.display())]
    Spawn {
        stage: StageId,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no output stream from {stage}")]
    Pipe { stage: StageId },
}

/// Exit status of one awaited stage; `None` when waiting itself failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: StageId,
    pub status: Option<ExitStatus>,
}

impl StageReport {
    pub fn success(&self) -> bool {
        self.status.map(|s| s.success()).unwrap_or(false)
    }
}

/// Outcome of a completed pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    success: bool,
    failing_stage: Option<StageId>,
    reports: Vec<StageReport>,
}

impl PipelineResult {
    fn from_reports(reports: Vec<StageReport>) -> Self {
        let failing_stage = reports.iter().find(|r| !r.success()).map(|r| r.stage);
        Self {
            success: failing_stage.is_none(),
            failing_stage,
            reports,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// First stage found failing, in await order (merger, aligner, segmenter)
    pub fn failing_stage(&self) -> Option<StageId> {
        self.failing_stage
    }

    /// Per-stage statuses in await order
    pub fn reports(&self) -> &[StageReport] {
        &self.reports
    }

    pub fn report(&self, stage: StageId) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.stage == stage)
    }
}

struct RunningStage {
    stage: StageId,
    child: Child,
}

/// Wires and runs the three external stages
pub struct PipelineOrchestrator {
    tools: StageTools,
}

impl PipelineOrchestrator {
    pub fn new(tools: StageTools) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &StageTools {
        &self.tools
    }

    /// Run one pipeline to completion.
    ///
    /// Returns `Err` only for resource errors, in which case no stage is left
    /// running. Stage failures are reported through the returned
    /// [`PipelineResult`]; a partially written `output_file` is left in place.
    #[allow(clippy::too_many_arguments)]
    pub fn run<F: AsRef<Path>>(
        &self,
        fastq_files: &[F],
        output_file: &Path,
        segments: &SegmentPlan,
        params: &AlignmentParams,
        reference_index: &str,
        log_sink: &LogSink,
    ) -> Result<PipelineResult, PipelineError> {
        let log_stdio = log_sink.open()?;
        let mut running: Vec<RunningStage> = Vec::with_capacity(StageId::ALL.len());

        match self.start_stages(
            fastq_files,
            output_file,
            segments,
            params,
            reference_index,
            log_stdio,
            &mut running,
        ) {
            Ok(()) => Ok(await_stages(running)),
            Err(e) => {
                abort_stages(running);
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn start_stages<F: AsRef<Path>>(
        &self,
        fastq_files: &[F],
        output_file: &Path,
        segments: &SegmentPlan,
        params: &AlignmentParams,
        reference_index: &str,
        log_stdio: Stdio,
        running: &mut Vec<RunningStage>,
    ) -> Result<(), PipelineError> {
        let mut segmenter = self.tools.segmenter.command();
        segmenter
            .args(segmenter_args(segments, fastq_files))
            .stdin(Stdio::null())
            .stdout(Stdio::piped());
        let segmented = spawn_stage(StageId::Segmenter, segmenter, running)?
            .ok_or(PipelineError::Pipe { stage: StageId::Segmenter })?;

        let mut aligner = self.tools.aligner.command();
        aligner
            .args(aligner_args(params, segments, reference_index))
            .stdin(Stdio::from(segmented))
            .stdout(Stdio::piped())
            .stderr(log_stdio);
        // The log handle lives in `aligner` and is closed once it is spawned.
        let alignments = spawn_stage(StageId::Aligner, aligner, running)?
            .ok_or(PipelineError::Pipe { stage: StageId::Aligner })?;

        let mut merger = self.tools.merger.command();
        merger
            .args(merger_args(fastq_files, output_file))
            .stdin(Stdio::from(alignments));
        spawn_stage(StageId::Merger, merger, running)?;

        Ok(())
    }
}

/// Spawn `cmd`, track the child, and hand back its stdout if it was piped.
///
/// `cmd` is consumed so that descriptors it holds for the child (pipe ends,
/// the log file) are closed in this process as soon as the child exists.
fn spawn_stage(
    stage: StageId,
    mut cmd: Command,
    running: &mut Vec<RunningStage>,
) -> Result<Option<ChildStdout>, PipelineError> {
    log::debug!("{} args: {:?}", stage, cmd);
    let mut child = cmd.spawn().map_err(|source| PipelineError::Spawn {
        stage,
        program: PathBuf::from(cmd.get_program()),
        source,
    })?;
    drop(cmd);

    let stdout = child.stdout.take();
    running.push(RunningStage { stage, child });
    Ok(stdout)
}

/// Reap every stage, terminal stage first.
fn await_stages(running: Vec<RunningStage>) -> PipelineResult {
    let mut reports = Vec::with_capacity(running.len());
    for RunningStage { stage, mut child } in running.into_iter().rev() {
        let status = match child.wait() {
            Ok(status) => {
                if !status.success() {
                    log::error!("{} exited with {}", stage, status);
                }
                Some(status)
            }
            Err(e) => {
                log::error!("Failed to wait for {}: {}", stage, e);
                None
            }
        };
        reports.push(StageReport { stage, status });
    }
    PipelineResult::from_reports(reports)
}

/// Kill and reap stages started before a resource error.
fn abort_stages(running: Vec<RunningStage>) {
    for RunningStage { stage, mut child } in running.into_iter().rev() {
        log::warn!("Stopping {} after pipeline setup failure", stage);
        if let Err(e) = child.kill() {
            log::warn!("Failed to kill {}: {}", stage, e);
        }
        if let Err(e) = child.wait() {
            log::warn!("Failed to reap {}: {}", stage, e);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    fn report(stage: StageId, code: i32) -> StageReport {
        StageReport {
            stage,
            status: Some(ExitStatus::from_raw(code << 8)),
        }
    }

    #[test]
    fn test_all_stages_succeed() {
        let result = PipelineResult::from_reports(vec![
            report(StageId::Merger, 0),
            report(StageId::Aligner, 0),
            report(StageId::Segmenter, 0),
        ]);
        assert!(result.success());
        assert_eq!(result.failing_stage(), None);
        assert_eq!(result.reports().len(), 3);
    }

    #[test]
    fn test_first_failure_in_await_order() {
        let result = PipelineResult::from_reports(vec![
            report(StageId::Merger, 0),
            report(StageId::Aligner, 1),
            report(StageId::Segmenter, 2),
        ]);
        assert!(!result.success());
        assert_eq!(result.failing_stage(), Some(StageId::Aligner));
        assert!(!result.report(StageId::Segmenter).unwrap().success());
    }

    #[test]
    fn test_wait_failure_counts_as_failure() {
        let result = PipelineResult::from_reports(vec![StageReport {
            stage: StageId::Merger,
            status: None,
        }]);
        assert_eq!(result.failing_stage(), Some(StageId::Merger));
    }

    #[test]
    fn test_log_sink_open_failure() {
        let sink = LogSink::File(PathBuf::from("/nonexistent/dir/aligner.log"));
        assert!(matches!(sink.open(), Err(PipelineError::LogSink { .. })));
    }

    #[test]
    fn test_stage_names() {
        let names: Vec<_> = StageId::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["segmenter", "aligner", "merger"]);
    }
}
