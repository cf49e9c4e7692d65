//! External stage programs
//!
//! Each pipeline stage is an external program invoked with a fixed argument
//! contract. The programs themselves are configurable so that alternative
//! builds (or wrapper scripts) can be dropped in.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use serde::{Deserialize, Serialize};

use crate::params::AlignmentParams;
use crate::segment::SegmentPlan;
use super::StageId;

/// Program plus leading arguments used to launch one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve the program on PATH (or as given, if it is a path)
    pub fn resolve(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }

    pub fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Programs for the three pipeline stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTools {
    pub segmenter: ToolCommand,
    pub aligner: ToolCommand,
    pub merger: ToolCommand,
}

impl Default for StageTools {
    fn default() -> Self {
        Self {
            segmenter: ToolCommand::new("segment-reads"),
            aligner: ToolCommand::new("bowtie"),
            merger: ToolCommand::new("join-segmented-alignments"),
        }
    }
}

impl StageTools {
    pub fn get(&self, stage: StageId) -> &ToolCommand {
        match stage {
            StageId::Segmenter => &self.segmenter,
            StageId::Aligner => &self.aligner,
            StageId::Merger => &self.merger,
        }
    }

    /// Stages whose program cannot be found
    pub fn missing(&self) -> Vec<(StageId, PathBuf)> {
        StageId::ALL
            .iter()
            .filter(|&&stage| !self.get(stage).is_available())
            .map(|&stage| (stage, self.get(stage).program.clone()))
            .collect()
    }
}

/// Segmenter operands: segment starts, segment ends, then the read files
pub fn segmenter_args<F: AsRef<Path>>(segments: &SegmentPlan, fastq_files: &[F]) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![segments.starts_arg().into(), segments.ends_arg().into()];
    args.extend(fastq_files.iter().map(|f| f.as_ref().as_os_str().to_os_string()));
    args
}

/// Aligner operands: alignment options, the index, and `-` for stdin
pub fn aligner_args(params: &AlignmentParams, segments: &SegmentPlan, reference_index: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = params
        .to_bowtie_args(segments.max_segment_length())
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(reference_index.into());
    args.push("-".into());
    args
}

/// Merger operands. Single-end runs are flagged with `--sr` since the merger
/// otherwise expects mate pairs; only the first read file is passed.
pub fn merger_args<F: AsRef<Path>>(fastq_files: &[F], output_file: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(4);
    if fastq_files.len() == 1 {
        args.push("--sr".into());
    }
    args.push("-".into());
    if let Some(first) = fastq_files.first() {
        args.push(first.as_ref().as_os_str().to_os_string());
    }
    args.push(output_file.as_os_str().to_os_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::plan_segments;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_segmenter_args() {
        let plan = plan_segments(76, 25, false, 0, 0).unwrap();
        let args = segmenter_args(&plan, &["r1.fq", "r2.fq"]);
        assert_eq!(strings(&args), vec!["0,25,50", "25,50,76", "r1.fq", "r2.fq"]);
    }

    #[test]
    fn test_aligner_args_end_with_index_and_stdin() {
        let plan = plan_segments(76, 25, false, 0, 0).unwrap();
        let args = strings(&aligner_args(&AlignmentParams::default(), &plan, "hg19"));
        assert_eq!(&args[args.len() - 2..], &["hg19".to_string(), "-".to_string()]);
        let l = args.iter().position(|a| a == "-l").unwrap();
        assert_eq!(args[l + 1], "26");
    }

    #[test]
    fn test_merger_args_single_end() {
        let args = merger_args(&["r1.fq"], Path::new("out.bam"));
        assert_eq!(strings(&args), vec!["--sr", "-", "r1.fq", "out.bam"]);
    }

    #[test]
    fn test_merger_args_paired_end() {
        let args = merger_args(&["r1.fq", "r2.fq"], Path::new("out.bam"));
        assert_eq!(strings(&args), vec!["-", "r1.fq", "out.bam"]);
    }

    #[test]
    fn test_tool_command_leading_args() {
        let tool = ToolCommand::new("python3").with_args(["segment_reads.py"]);
        let cmd = tool.command();
        assert_eq!(cmd.get_program(), "python3");
        assert_eq!(cmd.get_args().collect::<Vec<_>>(), vec!["segment_reads.py"]);
    }

    #[test]
    fn test_default_tools() {
        let tools = StageTools::default();
        assert_eq!(tools.get(StageId::Aligner).program, PathBuf::from("bowtie"));
        assert!(!ToolCommand::new("/nonexistent/bin/aligner").is_available());
    }
}
