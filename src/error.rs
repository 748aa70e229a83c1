//! Error types for pmwiki2md library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pmwiki2md operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while indexing or converting wiki pages.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input directory does not exist or is not a directory.
    #[error("Input directory does not exist: {}", .0.display())]
    MissingInputDir(PathBuf),

    /// A file name does not follow the `Book.Page` convention.
    #[error("Invalid page file name: {0}")]
    InvalidPageName(String),

    /// A pattern built from conversion options failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Error serializing a report or index.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
