use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that abort an extraction run.
///
/// Per-row and per-block anomalies never show up here: blank names, totals rows,
/// unparseable cells and blocks without a year are skipped silently.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No data extracted. Check the workbook structure / header detection.")]
    EmptyResult,

    #[error(
        "Still has {count} duplicate (entity, year, month) rows after grouping. Grouping logic is broken."
    )]
    DuplicateInvariant { count: usize },

    #[error(
        "Permission denied writing '{}'. Close any program holding the file open (spreadsheet, editor), then run again.",
        path.display()
    )]
    ResourceAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open workbook '{}': {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Workbook '{}' has no sheet named '{sheet}'", path.display())]
    MissingSheet { path: PathBuf, sheet: String },

    #[error("Workbook '{}' has no sheets", path.display())]
    NoSheets { path: PathBuf },

    #[error("Invalid config file '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    /// Wraps an I/O failure on the output path, singling out a locked/unwritable file.
    pub fn from_write(path: PathBuf, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            ExtractError::ResourceAccess { path, source: err }
        } else {
            ExtractError::Io(err)
        }
    }
}
