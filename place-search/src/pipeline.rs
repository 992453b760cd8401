//! The end-to-end search pipeline.
//!
//! validate → expand → aggregate → reconcile → rank

use std::sync::Arc;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::expander::{
    GeminiGenerator, HttpImageFetcher, ImageFetcher, QueryExpander, SuggestionGenerator,
};
use crate::http::build_client;
use crate::orchestrator::{aggregate, rank, reconcile_with_priority};
use crate::provider::PlaceProvider;
use crate::providers;
use crate::types::{SearchRequest, SearchResult};

/// A configured place search pipeline.
///
/// Built once from a [`SearchConfig`] and reused across requests; it
/// holds no per-request state. Collaborators can be swapped out with the
/// `with_*` methods.
#[derive(Clone)]
pub struct Pipeline {
    providers: Vec<Arc<dyn PlaceProvider>>,
    expander: QueryExpander,
    call_timeout: Duration,
    default_radius_meters: f64,
}

impl Pipeline {
    /// Build a pipeline with every provider that has credentials.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Config`] if `config` is invalid, or
    /// [`crate::SearchError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(config)?;
        let expansion_timeout = Duration::from_secs(config.expansion_timeout_seconds);

        let providers = providers::build_active(config, &client);
        let generator = config.active_gemini().map(|gemini| {
            Arc::new(
                GeminiGenerator::new(client.clone(), gemini.clone()).with_timeout(expansion_timeout),
            ) as Arc<dyn SuggestionGenerator>
        });
        let image_fetcher: Arc<dyn ImageFetcher> =
            Arc::new(HttpImageFetcher::new(client).with_timeout(expansion_timeout));

        tracing::debug!(
            providers = providers.len(),
            generator = generator.is_some(),
            "pipeline configured"
        );

        Ok(Self {
            providers,
            expander: QueryExpander::new(
                generator,
                Some(image_fetcher),
                expansion_timeout,
            ),
            call_timeout: Duration::from_secs(config.timeout_seconds),
            default_radius_meters: config.default_radius_meters,
        })
    }

    /// Replace the providers. Their order is the source priority.
    pub fn with_providers(mut self, providers: Vec<Arc<dyn PlaceProvider>>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn SuggestionGenerator>) -> Self {
        self.expander = self.expander.with_generator(generator);
        self
    }

    pub fn with_image_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.expander = self.expander.with_image_fetcher(fetcher);
        self
    }

    /// Override the per provider-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Names of the active providers, in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Run one search.
    ///
    /// An invalid request is logged and answered with an empty result, as
    /// is a search where no provider is active or nothing is found.
    pub async fn search(&self, request: &SearchRequest) -> SearchResult {
        let request = match request.validate(self.default_radius_meters) {
            Ok(valid) => valid,
            Err(err) => {
                tracing::warn!(error = %err, "rejecting search request");
                return SearchResult::empty();
            }
        };

        let suggestions = self.expander.expand(&request).await;
        let collected = aggregate(
            &suggestions,
            request.latitude,
            request.longitude,
            request.radius_meters,
            &self.providers,
            self.call_timeout,
        )
        .await;
        let collected_count = collected.len();

        let priority = self.provider_names();
        let reconciled = reconcile_with_priority(collected, &priority);
        let locations = rank(reconciled, request.latitude, request.longitude);

        tracing::info!(
            suggestions = suggestions.len(),
            collected = collected_count,
            locations = locations.len(),
            "place search complete"
        );
        SearchResult { locations }
    }
}
