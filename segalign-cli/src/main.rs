use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use anyhow::Result;

mod config;
mod commands;
mod error;

use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "segalign")]
#[command(about = "Segmented short-read alignment for junction discovery")]
#[command(version)]
#[command(long_about = "
segalign cuts each read into short segments, aligns every segment with bowtie and
joins the segment hits back into read alignments.

Examples:
  segalign align --index hg19 out.bam reads_1.fq reads_2.fq
  segalign align --index hg19 --segment-length 32 --segment-trim out.bam reads.fq.gz
  segalign segments --read-length 76 --segment-length 25
  segalign config > segalign.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of aligner threads
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align single- or paired-end reads segment by segment
    #[cfg(feature = "align")]
    Align(AlignArgs),

    /// Print the segment layout for a read length
    #[cfg(feature = "segments")]
    Segments(SegmentsArgs),

    /// Print or write an example configuration file
    Config {
        /// Write the configuration here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AlignArgs {
    /// Output alignment file
    pub output: PathBuf,

    /// FASTQ files (one for single-end, two for paired-end)
    #[arg(required = true, num_args = 1..=2)]
    pub fastq: Vec<PathBuf>,

    /// Reference index prefix
    #[arg(long)]
    pub index: Option<String>,

    /// Segment length
    #[arg(long)]
    pub segment_length: Option<usize>,

    /// Drop the read suffix shorter than a full segment
    #[arg(long)]
    pub segment_trim: bool,

    /// Bases to ignore at the 5' end
    #[arg(long)]
    pub trim5: Option<usize>,

    /// Bases to ignore at the 3' end
    #[arg(long)]
    pub trim3: Option<usize>,

    /// Suppress segments with more than this many hits
    #[arg(long)]
    pub multihits: Option<u32>,

    /// Mismatches allowed per segment
    #[arg(long)]
    pub mismatches: Option<u32>,

    /// Mismatch interpretation
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Report only the best stratum of hits
    #[arg(long)]
    pub best_strata: bool,

    /// FASTQ quality encoding
    #[arg(long, value_enum)]
    pub quals: Option<QualsArg>,

    /// Capture aligner diagnostics in this file
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Aligner program to run
    #[arg(long)]
    pub aligner_bin: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SegmentsArgs {
    /// Read length in bases
    #[arg(long)]
    pub read_length: usize,

    /// Segment length
    #[arg(long)]
    pub segment_length: Option<usize>,

    /// Drop the read suffix shorter than a full segment
    #[arg(long)]
    pub segment_trim: bool,

    /// Bases to ignore at the 5' end
    #[arg(long)]
    pub trim5: Option<usize>,

    /// Bases to ignore at the 3' end
    #[arg(long)]
    pub trim3: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// Quality-weighted mismatches in the seed (-n)
    QualityAware,
    /// Plain mismatch count over the whole segment (-v)
    MismatchOnly,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum QualsArg {
    Phred33,
    Phred64,
    Solexa,
    #[value(name = "solexa1.3")]
    Solexa13,
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())
        .map_err(|e| CliError::config(format!("{:#}", e)))?;

    match cli.command {
        #[cfg(feature = "align")]
        Commands::Align(args) => commands::align::execute(&config, cli.threads, args)?,

        #[cfg(feature = "segments")]
        Commands::Segments(args) => commands::segments::execute(&config, args)?,

        Commands::Config { output } => match output {
            Some(path) => {
                Config::default().save_to_file(&path)?;
                log::info!("Wrote example configuration to {}", path.display());
            }
            None => print!("{}", Config::example_toml()?),
        },
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            print_error_and_exit(cli_err);
        }
        return Err(err);
    }

    Ok(())
}
