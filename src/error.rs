use std::io;

use thiserror::Error;

/// Error types that can occur while decoding, editing or generating a document.
#[derive(Debug, Error)]
pub enum BookError {
    /// A required input (identity, content, storage root) was not supplied
    #[error("Missing input: {0}")]
    MissingInput(String),
    /// The runner could not find its credential
    #[error("Missing credential '{0}'")]
    MissingCredential(String),
    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,
    /// A cell index outside the notebook
    #[error("Cell {index} out of range (notebook has {count} cells)")]
    CellOutOfRange { index: usize, count: usize },
    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    Http(String),
    /// Non-success status or unexpected payload from the model endpoint
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormat {
        message: String,
        raw_response: String,
    },
    /// The runner failed to produce content
    #[error("Runner error: {0}")]
    Runner(String),
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    Json(String),
    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for BookError {
    fn from(err: reqwest::Error) -> Self {
        BookError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for BookError {
    fn from(err: serde_json::Error) -> Self {
        BookError::Json(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}
