//! Error types for the placefinder host.

/// Top-level error type for the host application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file or environment error.
    #[error("config error: {0}")]
    Config(String),

    /// Error from the place search core.
    #[error(transparent)]
    Search(#[from] place_search::SearchError),

    /// JSON encoding error on the bridge.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
