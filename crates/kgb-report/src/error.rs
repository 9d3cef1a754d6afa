//! Export errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The collection holds no records.
    #[error("no employee data to export")]
    Empty,

    /// A year outside the accepted window.
    #[error("year {year} is out of range ({min}..={max})")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    /// End year before start year.
    #[error("end year {end} is before start year {start}")]
    ReversedRange { start: i32, end: i32 },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ExportError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
