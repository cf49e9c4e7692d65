//! Align command implementation - segmented alignment of single- or paired-end reads

use anyhow::Result;
use std::path::PathBuf;
use segalign_core::{AlignConfig, AlignmentParams, LogSink};

use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::{AlignArgs, ModeArg, QualsArg};

pub fn execute(config: &Config, threads: Option<usize>, args: AlignArgs) -> Result<()> {
    let index = reference_index(config, &args)?;
    let align_config = build_align_config(config, threads, &args);

    log::info!("Reference index: {}", index);
    for (mate, fastq) in args.fastq.iter().enumerate() {
        log::info!("Mate {} reads: {}", mate + 1, fastq.display());
    }
    log::info!("Output: {}", args.output.display());

    check_tools(&align_config)?;

    let summary = segalign_core::align(&args.fastq, &index, &args.output, align_config)
        .map_err(CliError::from)?;

    log::info!(
        "Aligned {}bp reads as {} segments into {}",
        summary.read_length,
        summary.segments.len(),
        summary.output_file.display()
    );
    Ok(())
}

fn reference_index(config: &Config, args: &AlignArgs) -> CliResult<String> {
    args.index
        .clone()
        .or_else(|| config.aligner.index.clone())
        .ok_or_else(|| CliError::config("no reference index given (use --index or [aligner] index)"))
}

/// Use CLI args, then config, then defaults
fn build_align_config(config: &Config, threads: Option<usize>, args: &AlignArgs) -> AlignConfig {
    let mut tools: segalign_core::StageTools = config.tools.clone().into();
    if let Some(aligner_bin) = &args.aligner_bin {
        tools.aligner.program = aligner_bin.clone();
    }

    let params = AlignmentParams {
        threads: threads.unwrap_or(config.general.threads),
        multihits: args.multihits.unwrap_or(config.aligner.multihits),
        mismatches: args.mismatches.unwrap_or(config.aligner.mismatches),
        mode: args.mode.map(Into::into).unwrap_or(config.aligner.mode),
        best_strata: args.best_strata || config.aligner.best_strata,
        quality_format: args.quals.map(Into::into).unwrap_or(config.aligner.quality_format),
    };

    let log_file: Option<PathBuf> = args.log.clone().or_else(|| config.general.log_file.clone());

    AlignConfig {
        segment_length: args.segment_length.unwrap_or(config.segment.length),
        segment_trim: args.segment_trim || config.segment.trim,
        trim5: args.trim5.unwrap_or(config.segment.trim5),
        trim3: args.trim3.unwrap_or(config.segment.trim3),
        params,
        tools,
        log_sink: log_file.map(LogSink::File).unwrap_or(LogSink::Discard),
    }
}

/// Fail early when a stage program is not installed
fn check_tools(align_config: &AlignConfig) -> CliResult<()> {
    match align_config.tools.missing().into_iter().next() {
        Some((stage, program)) => Err(CliError::external_tool(
            program.display().to_string(),
            format!("{} program not found", stage),
        )),
        None => Ok(()),
    }
}

impl From<ModeArg> for segalign_core::AlignMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::QualityAware => segalign_core::AlignMode::QualityAware,
            ModeArg::MismatchOnly => segalign_core::AlignMode::MismatchOnly,
        }
    }
}

impl From<QualsArg> for segalign_core::QualityFormat {
    fn from(quals: QualsArg) -> Self {
        match quals {
            QualsArg::Phred33 => segalign_core::QualityFormat::Phred33,
            QualsArg::Phred64 => segalign_core::QualityFormat::Phred64,
            QualsArg::Solexa => segalign_core::QualityFormat::Solexa,
            QualsArg::Solexa13 => segalign_core::QualityFormat::Solexa13,
        }
    }
}
