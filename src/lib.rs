//! Placefinder host: configuration, logging setup, and a stdin/stdout JSON
//! bridge around the [`place_search`] pipeline.

pub mod bridge;
pub mod config;
pub mod error;
pub mod paths;

pub use config::AppConfig;
pub use error::{AppError, Result};

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "placefinder=info,place_search=info";

/// Initialise tracing to stderr only (stdout is reserved for the JSON
/// protocol).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
}
