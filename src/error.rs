//! Central error types for modorder.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic
//! `Display` and `From` implementations.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// IO operation failed (without path context - prefer IoWithPath when path is available)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO operation failed with path context for better error messages
    #[error("IO error at {path}: {error}")]
    IoWithPath {
        error: std::io::Error,
        path: PathBuf,
    },

    /// Source directory is missing or not a directory. Fatal: no partial run is attempted.
    #[error("source directory not found or not a directory: {0}")]
    MissingSourceDir(PathBuf),

    /// Corpus path does not exist.
    #[error("corpus path not found: {0}")]
    MissingCorpusPath(PathBuf),

    /// Invalid argument provided to a function
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results using ResolveError.
pub type Result<T> = std::result::Result<T, ResolveError>;
