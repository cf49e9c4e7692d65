use serde::{Deserialize, Serialize};
use std::fmt;

/// How the aligner interprets the mismatch tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignMode {
    /// Mismatches counted in the seed, weighted by base quality (`-n`)
    #[default]
    QualityAware,
    /// Plain end-to-end mismatch count, qualities ignored (`-v`)
    MismatchOnly,
}

impl AlignMode {
    pub fn flag(&self) -> &'static str {
        match self {
            AlignMode::QualityAware => "-n",
            AlignMode::MismatchOnly => "-v",
        }
    }
}

/// Encoding of the FASTQ quality strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityFormat {
    #[default]
    Phred33,
    Phred64,
    Solexa,
    #[serde(rename = "solexa1.3")]
    Solexa13,
}

impl QualityFormat {
    pub fn flag(&self) -> &'static str {
        match self {
            QualityFormat::Phred33 => "--phred33-quals",
            QualityFormat::Phred64 => "--phred64-quals",
            QualityFormat::Solexa => "--solexa-quals",
            QualityFormat::Solexa13 => "--solexa1.3-quals",
        }
    }
}

impl fmt::Display for QualityFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QualityFormat::Phred33 => "phred33",
            QualityFormat::Phred64 => "phred64",
            QualityFormat::Solexa => "solexa",
            QualityFormat::Solexa13 => "solexa1.3",
        };
        f.write_str(name)
    }
}

/// Options forwarded to the segment aligner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentParams {
    pub threads: usize,
    /// Segments with more hits than this are suppressed as ambiguous
    pub multihits: u32,
    pub mismatches: u32,
    pub mode: AlignMode,
    /// Report only the best stratum (fewest mismatches)
    pub best_strata: bool,
    pub quality_format: QualityFormat,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            threads: 2,
            multihits: 40,
            mismatches: 2,
            mode: AlignMode::QualityAware,
            best_strata: false,
            quality_format: QualityFormat::Phred33,
        }
    }
}

impl AlignmentParams {
    /// Aligner (bowtie 1) arguments, without the index and input operands.
    ///
    /// In quality-aware mode the seed length is pinned to the longest segment
    /// so that the mismatch limit applies to whole segments.
    pub fn to_bowtie_args(&self, max_segment_length: usize) -> Vec<String> {
        let mut args = vec![
            "-q".to_string(),
            "-S".to_string(),
            "-p".to_string(),
            self.threads.to_string(),
            "--tryhard".to_string(),
            self.quality_format.flag().to_string(),
            "-k".to_string(),
            self.multihits.to_string(),
            "-m".to_string(),
            self.multihits.to_string(),
            self.mode.flag().to_string(),
            self.mismatches.to_string(),
        ];

        if self.mode == AlignMode::QualityAware {
            args.push("-l".to_string());
            args.push(max_segment_length.to_string());
        }

        if self.best_strata {
            args.push("--best".to_string());
            args.push("--strata".to_string());
        }

        args
    }
}
