//! Custom error types and result handling for Seihon operations.
//!
//! All fallible operations in this crate return [`Result<T>`], a type alias
//! for `std::result::Result<T, Error>`.

use std::path::PathBuf;

/// Type alias for Results with Seihon errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all Seihon operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Regular expression parsing errors
    #[error(transparent)]
    Regex(#[from] regex::Error),
    /// ZIP file operation errors
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// Volume specification (de)serialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Async task join errors
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    /// Semaphore acquisition errors from bounded fan-out
    #[error(transparent)]
    Semaphore(#[from] tokio::sync::AcquireError),
    #[error(transparent)]
    ConfigBuilder(#[from] crate::seihon::SeihonConfigBuilderError),
    /// One or more archive filenames did not match any chapter pattern
    #[error("cannot extract chapter numbers from: {0:?}")]
    ChapterExtraction(Vec<PathBuf>),
    /// Error for a structurally invalid volume specification
    #[error("Invalid volume specification: {0}")]
    InvalidSpec(String),
    /// Error for an archive containing no recognized image entries
    #[error("No image entries found in archive {0:?}")]
    EmptyArchive(PathBuf),
    /// Error for a declared volume that resolves to no chapters at all
    #[error("Volume {0} matches no available chapter")]
    EmptyVolume(u32),
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// Error for resources that couldn't be found (e.g., input directory, cover image)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Error for unsupported operations or formats (e.g., unknown image extension)
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

// Basic From<String> conversion for convenience
impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}
