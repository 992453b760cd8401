//! Error types for the place-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. No API keys or sensitive data appear in
//! error messages.

/// Errors that can occur while discovering places.
///
/// Most of these never escape the crate's entry points: provider errors
/// collapse to "no result" inside the aggregation stage, and expansion
/// errors collapse to the deterministic fallback queries.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to a provider or collaborator failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A provider or generator response could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A call did not complete within its time budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// A search request failed validation.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The suggestion generator could not produce usable queries.
    #[error("query expansion failed: {0}")]
    Expansion(String),
}

impl SearchError {
    /// Timeout error for `what` after exceeding `budget`.
    pub fn timeout(what: &str, budget: std::time::Duration) -> Self {
        Self::Timeout(format!("{what} exceeded {:.1}s", budget.as_secs_f64()))
    }
}

/// Convenience type alias for place-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
