//! # place-search
//!
//! Multi-provider place discovery for location-aware recommendations.
//!
//! A user supplies free text or an image plus a coordinate. This crate
//! turns that into a handful of search queries, asks every configured
//! place provider about each query concurrently, merges the records that
//! describe the same real-world place, and returns them nearest-first.
//!
//! ## Design
//!
//! - Query expansion via a pluggable [`SuggestionGenerator`] (Gemini by
//!   default), with a deterministic fallback when it fails
//! - Google Places and Foursquare providers, each active only when its
//!   API key is configured
//! - Fuzzy dedup across providers: bigram name similarity plus a 150 m
//!   proximity check
//! - Graceful degradation: a failing, slow, or panicking provider only
//!   loses its own results
//!
//! ## Security
//!
//! - API keys are never logged; URLs that embed a key are redacted in errors
//! - No network listeners: this is a library, not a server
//! - Queries are logged only at trace level

pub mod config;
pub mod error;
pub mod expander;
pub mod geo;
pub mod http;
pub mod orchestrator;
pub mod pipeline;
pub mod provider;
pub mod providers;
pub mod similarity;
pub mod types;

pub use config::{FoursquareConfig, GeminiConfig, GoogleConfig, SearchConfig};
pub use error::{Result, SearchError};
pub use expander::{FetchedImage, GeneratorInput, ImageFetcher, SuggestionGenerator};
pub use pipeline::Pipeline;
pub use provider::PlaceProvider;
pub use types::{
    InputKind, PlaceRecord, ProviderKind, QuerySuggestion, SearchRequest, SearchResult, SocialLink,
};

/// Run one search with a pipeline built from `config`.
///
/// Convenience wrapper around [`Pipeline::from_config`] and
/// [`Pipeline::search`]. Embedders handling many requests should build a
/// [`Pipeline`] once instead.
///
/// # Errors
///
/// Returns [`SearchError::Config`] only if `config` is invalid. Provider
/// failures and bad requests both yield an empty [`SearchResult`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> place_search::Result<()> {
/// let config = place_search::SearchConfig {
///     google: Some(place_search::GoogleConfig::new("your-key")),
///     ..Default::default()
/// };
/// let request = place_search::SearchRequest::text("coffee", 25.2, 55.3);
/// let result = place_search::search(&request, &config).await?;
/// for place in &result.locations {
///     println!("{} ({:?} km)", place.name, place.distance_from_query_km);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(request: &SearchRequest, config: &SearchConfig) -> Result<SearchResult> {
    let pipeline = Pipeline::from_config(config)?;
    Ok(pipeline.search(request).await)
}
