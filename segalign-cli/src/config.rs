//! Configuration handling for the segalign CLI
//!
//! Supports loading configuration from segalign.toml files with CLI argument overrides.

use anyhow::{Result, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use segalign_core::{AlignMode, QualityFormat, StageTools, ToolCommand};

pub const DEFAULT_CONFIG_FILE: &str = "segalign.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub segment: SegmentConfig,
    #[serde(default)]
    pub aligner: AlignerConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Number of aligner threads
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// File receiving the aligner's diagnostic output
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Target segment length
    #[serde(default = "default_segment_length")]
    pub length: usize,

    /// Drop read suffixes shorter than a full segment
    #[serde(default)]
    pub trim: bool,

    /// Bases ignored at the 5' end
    #[serde(default)]
    pub trim5: usize,

    /// Bases ignored at the 3' end
    #[serde(default)]
    pub trim3: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// Default reference index
    #[serde(default)]
    pub index: Option<String>,

    /// Maximum hits per segment before it is suppressed
    #[serde(default = "default_multihits")]
    pub multihits: u32,

    /// Mismatch tolerance
    #[serde(default = "default_mismatches")]
    pub mismatches: u32,

    /// Mismatch interpretation
    #[serde(default)]
    pub mode: AlignMode,

    /// Report only the best stratum
    #[serde(default)]
    pub best_strata: bool,

    /// FASTQ quality encoding
    #[serde(default)]
    pub quality_format: QualityFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_segmenter")]
    pub segmenter: ToolCommand,

    #[serde(default = "default_aligner")]
    pub aligner: ToolCommand,

    #[serde(default = "default_merger")]
    pub merger: ToolCommand,
}

// Default value functions
fn default_threads() -> usize { num_cpus::get() }
fn default_segment_length() -> usize { 25 }
fn default_multihits() -> u32 { 40 }
fn default_mismatches() -> u32 { 2 }
fn default_segmenter() -> ToolCommand { StageTools::default().segmenter }
fn default_aligner() -> ToolCommand { StageTools::default().aligner }
fn default_merger() -> ToolCommand { StageTools::default().merger }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            log_file: None,
        }
    }
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            length: default_segment_length(),
            trim: false,
            trim5: 0,
            trim3: 0,
        }
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            index: None,
            multihits: default_multihits(),
            mismatches: default_mismatches(),
            mode: AlignMode::default(),
            best_strata: false,
            quality_format: QualityFormat::default(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            segmenter: default_segmenter(),
            aligner: default_aligner(),
            merger: default_merger(),
        }
    }
}

impl From<ToolsConfig> for StageTools {
    fn from(tools: ToolsConfig) -> Self {
        StageTools {
            segmenter: tools.segmenter,
            aligner: tools.aligner,
            merger: tools.merger,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.segment.length, 25);
        assert_eq!(config.aligner.multihits, 40);
        assert_eq!(config.aligner.mode, AlignMode::QualityAware);
        assert_eq!(config.tools.aligner.program, PathBuf::from("bowtie"));
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.aligner.index = Some("hg19".to_string());
        config.aligner.quality_format = QualityFormat::Solexa13;
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded_config = Config::load_from_file(temp_file.path())?;

        assert_eq!(loaded_config.aligner.index.as_deref(), Some("hg19"));
        assert_eq!(loaded_config.aligner.quality_format, QualityFormat::Solexa13);
        assert_eq!(config.segment.length, loaded_config.segment.length);
        assert_eq!(config.tools.merger, loaded_config.tools.merger);

        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[segment]")?;
        writeln!(temp_file, "length = 30")?;
        writeln!(temp_file, "[aligner]")?;
        writeln!(temp_file, "mode = \"mismatch-only\"")?;
        writeln!(temp_file, "[tools.aligner]")?;
        writeln!(temp_file, "program = \"/opt/bowtie/bowtie\"")?;
        temp_file.flush()?;

        let config = Config::load_from_file(temp_file.path())?;
        assert_eq!(config.segment.length, 30);
        assert!(!config.segment.trim);
        assert_eq!(config.aligner.mode, AlignMode::MismatchOnly);
        assert_eq!(config.aligner.mismatches, 2);
        assert_eq!(config.tools.aligner.program, PathBuf::from("/opt/bowtie/bowtie"));
        assert!(config.tools.aligner.args.is_empty());
        assert_eq!(config.tools.segmenter.program, PathBuf::from("segment-reads"));

        Ok(())
    }

    #[test]
    fn test_example_toml_generation() -> Result<()> {
        let example = Config::example_toml()?;
        assert!(example.contains("[general]"));
        assert!(example.contains("[segment]"));
        assert!(example.contains("[aligner]"));
        assert!(example.contains("[tools.aligner]"));
        Ok(())
    }
}
