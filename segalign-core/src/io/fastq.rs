//! FASTQ read-length probing
//!
//! Reads the first record of a FASTQ (or FASTA) file with needletail and
//! reports its sequence length. Gzipped inputs are decoded with flate2.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use flate2::read::GzDecoder;

use needletail::{parse_fastx_file, parse_fastx_reader, FastxReader};
use crate::types::ReadLength;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty file or no reads found")]
    EmptyFile,
}

/// Source of the representative read length of an input file
pub trait ReadLengthProbe {
    fn read_length(&self, path: &Path) -> Result<ReadLength, ProbeError>;
}

/// Probe that parses the first FASTX record of the file
#[derive(Debug, Clone, Copy, Default)]
pub struct FastqProbe;

impl FastqProbe {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> Result<Box<dyn FastxReader>, ProbeError> {
        if path.to_string_lossy().ends_with(".gz") {
            let file = File::open(path)?;
            let reader = BufReader::new(GzDecoder::new(file));
            parse_fastx_reader(reader).map_err(|e| ProbeError::Parse(e.to_string()))
        } else {
            parse_fastx_file(path).map_err(|e| ProbeError::Parse(e.to_string()))
        }
    }
}

impl ReadLengthProbe for FastqProbe {
    fn read_length(&self, path: &Path) -> Result<ReadLength, ProbeError> {
        let mut reader = Self::open(path)?;
        match reader.next() {
            Some(record) => {
                let record = record.map_err(|e| ProbeError::Parse(e.to_string()))?;
                Ok(record.seq().len())
            }
            None => Err(ProbeError::EmptyFile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_probe_first_record() {
        let mut file = Builder::new().suffix(".fq").tempfile().unwrap();
        writeln!(file, "@read1").unwrap();
        writeln!(file, "ACGTACGTACGTACGTACGTACGTACGTAC").unwrap();
        writeln!(file, "+").unwrap();
        writeln!(file, "IIIIIIIIIIIIIIIIIIIIIIIIIIIIII").unwrap();
        writeln!(file, "@read2").unwrap();
        writeln!(file, "ACGT").unwrap();
        writeln!(file, "+").unwrap();
        writeln!(file, "IIII").unwrap();
        file.flush().unwrap();

        let length = FastqProbe::new().read_length(file.path()).unwrap();
        assert_eq!(length, 30);
    }

    #[test]
    fn test_probe_gzipped() {
        let file = Builder::new().suffix(".fq.gz").tempfile().unwrap();
        let mut encoder = GzEncoder::new(file.reopen().unwrap(), Compression::default());
        encoder.write_all(b"@read1\nACGTACGTAC\n+\nIIIIIIIIII\n").unwrap();
        encoder.finish().unwrap();

        let length = FastqProbe::new().read_length(file.path()).unwrap();
        assert_eq!(length, 10);
    }

    #[test]
    fn test_probe_rejects_garbage() {
        let mut file = Builder::new().suffix(".fq").tempfile().unwrap();
        writeln!(file, "this is not a read file").unwrap();
        file.flush().unwrap();

        assert!(FastqProbe::new().read_length(file.path()).is_err());
    }

    #[test]
    fn test_probe_missing_file() {
        let result = FastqProbe::new().read_length(Path::new("/nonexistent/reads.fq"));
        assert!(result.is_err());
    }
}
