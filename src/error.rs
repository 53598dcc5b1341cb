use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ReshapeError {
    #[error("invalid dataset selector: {0}")]
    InvalidDataset(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("Eurostat request failed: {0}")]
    Http(String),

    #[error("Eurostat returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("failed to decompress {path}: {message}")]
    #[diagnostic(help("the cached archive may be truncated or not gzip; delete it and fetch again"))]
    Decompress { path: String, message: String },

    #[error("cached archive not found at {0}")]
    #[diagnostic(help("run once without --offline to populate the cache"))]
    MissingCache(String),

    #[error("failed to read table {path}: {message}")]
    TableRead { path: String, message: String },

    #[error("composite key column `{header}` not found in table header")]
    MissingKeyColumn { header: String },

    #[error("row {row}: composite key `{key}` has {found} fields, expected at least {expected}")]
    KeyTooShort {
        row: usize,
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("failed to write CSV {path}: {message}")]
    CsvWrite { path: String, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
