//! Error types for the unisearch host.

use unisearch_engine::SearchError;

/// Top-level error type for the command-line host.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration file could not be parsed, serialised or validated.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the aggregation engine.
    #[error(transparent)]
    Engine(#[from] SearchError),

    /// Result rendering error.
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
