use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the KIKA incident pipeline.
#[derive(Error, Debug)]
pub enum KikaError {
    /// A field of a source row could not be converted to its canonical type.
    ///
    /// `row` is the data-row index in the source file (0 is the artifact row
    /// that follows the header).
    #[error("Failed to parse field \"{field}\" in row {row}: {value:?}")]
    Parse {
        row: usize,
        field: String,
        value: String,
    },

    /// The header row lacks a column the normalizer requires.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The CSV layer could not read a record.
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset file does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// An aggregation was requested without any grouping attribute.
    #[error("Invalid grouping: {0}")]
    InvalidGrouping(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KikaError {
    /// Build a [`KikaError::Parse`] for `field` of data row `row`.
    pub fn parse(row: usize, field: &str, value: &str) -> Self {
        Self::Parse {
            row,
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// `true` for errors scoped to a single source row.
    pub fn is_row_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Convenience alias used throughout the KIKA crates.
pub type Result<T> = std::result::Result<T, KikaError>;
