//! Segments command implementation - preview the segment layout for a read length

use anyhow::Result;
use std::io::Write;
use segalign_core::{plan_segments, validate_segment_length, SegmentPlan};

use crate::config::Config;
use crate::error::CliError;
use crate::SegmentsArgs;

pub fn execute(config: &Config, args: SegmentsArgs) -> Result<()> {
    let plan = build_plan(config, &args)?;
    log::info!("Dividing {}bp reads into {} segments", args.read_length, plan.len());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_plan(&plan, &mut out).map_err(CliError::from)?;
    Ok(())
}

fn build_plan(config: &Config, args: &SegmentsArgs) -> Result<SegmentPlan, CliError> {
    let segment_length = args.segment_length.unwrap_or(config.segment.length);
    let trim5 = args.trim5.unwrap_or(config.segment.trim5);
    let trim3 = args.trim3.unwrap_or(config.segment.trim3);
    let segment_trim = args.segment_trim || config.segment.trim;

    validate_segment_length(args.read_length, segment_length, trim5, trim3)
        .map_err(|e| CliError::validation(e.to_string()))?;
    plan_segments(args.read_length, segment_length, segment_trim, trim5, trim3)
        .map_err(|e| CliError::validation(e.to_string()))
}

fn write_plan<W: Write>(plan: &SegmentPlan, out: &mut W) -> std::io::Result<()> {
    for boundary in plan {
        writeln!(out, "{}\t{}", boundary.start, boundary.end)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(read_length: usize) -> SegmentsArgs {
        SegmentsArgs {
            read_length,
            segment_length: None,
            segment_trim: false,
            trim5: None,
            trim3: None,
        }
    }

    #[test]
    fn test_plan_output() -> Result<()> {
        let plan = build_plan(&Config::default(), &args(76))?;
        let mut buffer = Vec::new();
        write_plan(&plan, &mut buffer)?;
        assert_eq!(String::from_utf8(buffer)?, "0\t25\n25\t50\n50\t76\n");
        Ok(())
    }

    #[test]
    fn test_segment_trim_from_config() -> Result<()> {
        let mut config = Config::default();
        config.segment.trim = true;
        let plan = build_plan(&config, &args(76))?;
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.boundaries()[2].end, 75);
        Ok(())
    }

    #[test]
    fn test_rejects_segment_longer_than_trimmed_read() {
        let mut cli_args = args(40);
        cli_args.trim5 = Some(10);
        cli_args.trim3 = Some(10);
        assert!(matches!(
            build_plan(&Config::default(), &cli_args),
            Err(CliError::Validation { .. })
        ));
    }
}
