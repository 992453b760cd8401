//! Concurrent provider fan-out per suggestion.
//!
//! Every active provider is queried in parallel for one suggestion before
//! the next suggestion starts. A provider that errors, times out, or
//! panics contributes nothing; the others are unaffected.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::error::SearchError;
use crate::provider::PlaceProvider;
use crate::types::{PlaceRecord, QuerySuggestion};

/// Query every provider for every suggestion.
///
/// The output is ordered by suggestion, then by provider position in
/// `providers`, and may contain duplicates. An empty `providers` slice
/// yields an empty result.
pub async fn aggregate(
    suggestions: &[QuerySuggestion],
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
    providers: &[Arc<dyn PlaceProvider>],
    call_timeout: Duration,
) -> Vec<PlaceRecord> {
    if providers.is_empty() {
        tracing::debug!("no active providers, nothing to aggregate");
        return Vec::new();
    }

    let mut collected = Vec::new();
    for suggestion in suggestions {
        let query = suggestion.search_query.as_str();
        tracing::trace!(query, "querying providers");

        let lookups = providers.iter().map(|provider| {
            bounded_lookup(
                provider.as_ref(),
                query,
                latitude,
                longitude,
                radius_meters,
                call_timeout,
            )
        });
        let outcomes = futures::future::join_all(lookups).await;

        let before = collected.len();
        collected.extend(outcomes.into_iter().flatten());
        tracing::debug!(
            query,
            found = collected.len() - before,
            providers = providers.len(),
            "suggestion aggregated"
        );
    }
    collected
}

/// One provider call, bounded by `call_timeout`, with panics contained.
async fn bounded_lookup(
    provider: &dyn PlaceProvider,
    query: &str,
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
    call_timeout: Duration,
) -> Option<PlaceRecord> {
    let call = AssertUnwindSafe(provider.lookup(query, latitude, longitude, radius_meters))
        .catch_unwind();
    match tokio::time::timeout(call_timeout, call).await {
        Ok(Ok(found)) => found,
        Ok(Err(_panic)) => {
            tracing::warn!(provider = provider.name(), "provider lookup panicked");
            None
        }
        Err(_elapsed) => {
            let err = SearchError::timeout(provider.name(), call_timeout);
            tracing::warn!(provider = provider.name(), error = %err, "provider lookup timed out");
            None
        }
    }
}
