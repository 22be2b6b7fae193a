//! Error types for the CLI application.

use kcache_extractor::ExtractorError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Standard input was empty after trimming
    #[error("no input")]
    EmptyInput,

    /// The extraction engine failed
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
