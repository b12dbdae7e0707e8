pub mod edges;
pub mod labels;
pub mod matrix;
pub mod store;
pub mod terms;

use std::path::{Path, PathBuf};
use std::{fmt, io};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("missing required file: {0}")]
    MissingFile(String),
    #[error("invalid TSV row at line {line}: {reason}")]
    InvalidTsvRow { line: usize, reason: String },
    #[error("invalid value at line {line}, column {column}: {value:?}")]
    InvalidValue {
        line: usize,
        column: usize,
        value: String,
    },
    #[error("duplicate gene {gene} at line {line}")]
    DuplicateGene { gene: String, line: usize },
    #[error("duplicate sample {0} in matrix header")]
    DuplicateSample(String),
    #[error("labels file missing required column: {0}")]
    MissingLabelColumn(String),
    #[error("unknown group {value:?} at line {line}")]
    UnknownGroup { line: usize, value: String },
    #[error("unknown annotation category: {0}")]
    UnknownCategory(String),
    #[error("unsupported gzip input without feature enabled: {0}")]
    GzipNotEnabled(PathBuf),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub fn open_reader(path: &Path) -> Result<Box<dyn io::BufRead>, InputError> {
    if !path.is_file() {
        return Err(InputError::MissingFile(path_display(path).to_string()));
    }
    let file = std::fs::File::open(path)?;
    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        #[cfg(feature = "gz")]
        {
            let decoder = flate2::read::GzDecoder::new(file);
            return Ok(Box::new(io::BufReader::new(decoder)));
        }
        #[cfg(not(feature = "gz"))]
        {
            return Err(InputError::GzipNotEnabled(path.to_path_buf()));
        }
    }
    Ok(Box::new(io::BufReader::new(file)))
}

/// Tab-delimited reader without quoting; rows may differ in length so the
/// callers can report ragged lines themselves.
pub fn tsv_reader(
    path: &Path,
    has_headers: bool,
) -> Result<csv::Reader<Box<dyn io::BufRead>>, InputError> {
    let inner = open_reader(path)?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(inner))
}

pub fn path_display(path: &Path) -> impl fmt::Display + '_ {
    path.to_string_lossy()
}

pub(crate) fn record_line(record: &csv::StringRecord, fallback: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback)
}
