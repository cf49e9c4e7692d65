//! Error handling for the segalign CLI

use thiserror::Error;
use std::path::PathBuf;

use segalign_core::{AlignError, PipelineError, StageId, ValidationError, JOB_ERROR};

/// Main error type for segalign CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("External tool error: {tool} - {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Pipeline stage failed: {stage}")]
    StageFailed { stage: StageId },

    #[error("Resource error: {message}")]
    Resource { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn external_tool<S: Into<String>>(tool: S, message: S) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn resource<S: Into<String>>(message: S) -> Self {
        Self::Resource { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<AlignError> for CliError {
    fn from(err: AlignError) -> Self {
        match err {
            AlignError::Validation(ValidationError::MissingFile { path, .. }) => {
                Self::file_not_found(path)
            }
            AlignError::Validation(e) => Self::validation(e.to_string()),
            AlignError::Segmentation(e) => Self::validation(e.to_string()),
            AlignError::Pipeline(PipelineError::Spawn { stage, program, source }) => {
                Self::external_tool(
                    program.display().to_string(),
                    format!("could not start {}: {}", stage, source),
                )
            }
            AlignError::Pipeline(e) => Self::resource(e.to_string()),
            AlignError::StageFailed { stage, .. } => Self::StageFailed { stage },
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::Validation { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Paired-end mates must have the same read length\n\
                 • Choose a --segment-length no longer than the read length minus --trim5 and --trim3\n\
                 • Use 'segalign segments' to preview the segment layout for a read length"
            );
        }

        CliError::ExternalTool { tool, .. } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Install {}\n\
                 • Ensure {} is in your PATH, or set its path under [tools] in segalign.toml",
                tool, tool
            ));
        }

        CliError::StageFailed { stage } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • The output file may be incomplete; remove it before retrying\n\
                 • Check the {} diagnostics (use --log to capture aligner output)",
                stage
            ));
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your segalign.toml configuration file\n\
                 • Use 'segalign config' to generate a sample configuration"
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(JOB_ERROR);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("reads_1.fq"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(matches!(cli_err, CliError::Io { .. }));
    }

    #[test]
    fn test_align_error_conversion() {
        let err: CliError = AlignError::Validation(ValidationError::MissingFile {
            mate: 1,
            path: PathBuf::from("reads_2.fq"),
        })
        .into();
        assert!(matches!(err, CliError::FileNotFound { .. }));

        let err: CliError = AlignError::Validation(ValidationError::InconsistentReadLength {
            lengths: vec![76, 100],
        })
        .into();
        assert!(matches!(err, CliError::Validation { .. }));

        let err: CliError = AlignError::Pipeline(PipelineError::Spawn {
            stage: StageId::Aligner,
            program: PathBuf::from("bowtie"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
        .into();
        match err {
            CliError::ExternalTool { tool, message } => {
                assert_eq!(tool, "bowtie");
                assert!(message.contains("aligner"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stage_failure_suggestions() {
        let err = CliError::StageFailed { stage: StageId::Merger };
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.starts_with("Pipeline stage failed: merger"));
        assert!(formatted.contains("may be incomplete"));
    }
}
