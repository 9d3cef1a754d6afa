//! Error types for the record store, importers and the suggestion flow.
//!
//! Import and store errors abort an operation without touching state.
//! Storage errors never abort anything: the store reports them as warnings
//! and keeps working from memory.

use thiserror::Error;

/// Failure reading or writing the key-value backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be read.
    #[error("could not read key '{key}': {message}")]
    Read { key: String, message: String },

    /// The backend could not be written.
    #[error("could not save key '{key}': {message}")]
    Write { key: String, message: String },

    /// The persisted value exists but is not a valid record list.
    #[error("stored data under '{key}' is corrupted: {message}")]
    Corrupt { key: String, message: String },
}

/// Rejections from the importers. No import error leaves a partial result.
#[derive(Debug, Error)]
pub enum ImportError {
    /// One or more required columns could not be matched to a header.
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// The year-matrix layout needs at least one 4-digit year header.
    #[error("no year columns found (expected headers such as 2023, 2024)")]
    NoYearColumns,

    /// The header row was fine but no data row produced a record.
    #[error("no valid employee rows found ({skipped} row(s) skipped)")]
    NoValidRows { skipped: usize },

    /// The sheet has no header row at all.
    #[error("the sheet is empty")]
    EmptySheet,

    /// The JSON payload is not an array.
    #[error("expected a JSON array of employee records")]
    NotAnArray,

    /// A JSON element is missing a required field or has an invalid value.
    #[error("record {index}: {message}")]
    InvalidRecord { index: usize, message: String },

    /// Two records share an id.
    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    /// The payload is not JSON at all.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The CSV reader failed.
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors from record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id exists.
    #[error("employee not found: {0}")]
    NotFound(String),

    /// A required field is blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    /// An import payload was rejected.
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Failure of the AI promotion-candidate flow.
///
/// Every underlying cause is flattened into one user-facing message.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("AI analysis failed: {0}")]
    Failed(String),
}

impl SuggestionError {
    pub fn from_cause(cause: impl std::fmt::Display) -> Self {
        let message = cause.to_string();
        if message.trim().is_empty() {
            SuggestionError::Failed("an unknown error occurred during AI analysis".into())
        } else {
            SuggestionError::Failed(message)
        }
    }
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}
