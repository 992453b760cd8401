//! Query expansion: one user input in, 3–5 concrete search queries out.
//!
//! The heavy lifting is delegated to a [`SuggestionGenerator`] (an LLM in
//! production). Whatever goes wrong there (no generator, image fetch
//! failure, timeout, malformed output, even a panic) the expander answers
//! with [`fallback_suggestions`], so the rest of the pipeline always has
//! queries to work with.

pub mod gemini;
pub mod image;

pub use gemini::GeminiGenerator;
pub use image::HttpImageFetcher;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;

use crate::error::SearchError;
use crate::types::{QuerySuggestion, UserInput, ValidatedRequest};

/// Fewest suggestions a generator may return.
pub const MIN_SUGGESTIONS: usize = 3;
/// Most suggestions a generator may return.
pub const MAX_SUGGESTIONS: usize = 5;
/// Subject used for fallback queries when the input is an image.
pub const IMAGE_FALLBACK_SUBJECT: &str = "places of interest";

/// Raw image payload handed to a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/jpeg`.
    pub mime_type: String,
}

/// What a generator is asked to interpret.
#[derive(Debug, Clone, Copy)]
pub enum GeneratorInput<'a> {
    Text(&'a str),
    Image(&'a FetchedImage),
}

/// Produces search-query suggestions from user input and a location.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Suggest search queries for `input` near `(latitude, longitude)`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport failure or unusable output.
    async fn suggest(
        &self,
        input: GeneratorInput<'_>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<QuerySuggestion>, SearchError>;

    fn name(&self) -> &str;
}

/// Fetches the raw bytes behind an image reference.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] when the image cannot be retrieved.
    async fn fetch(&self, image_ref: &str) -> Result<FetchedImage, SearchError>;
}

/// The deterministic queries used when generation fails.
///
/// Always exactly three suggestions, each containing `subject` verbatim.
pub fn fallback_suggestions(subject: &str, latitude: f64, longitude: f64) -> Vec<QuerySuggestion> {
    vec![
        QuerySuggestion::new(subject, format!("{subject} near {latitude},{longitude}")),
        QuerySuggestion::new(subject, format!("best {subject}")),
        QuerySuggestion::new(
            subject,
            format!("top rated {subject} near {latitude},{longitude}"),
        ),
    ]
}

/// Tidy generator output and enforce the 3–5 contract.
///
/// Entries with a blank query are dropped; a blank place name falls back
/// to the query.
///
/// # Errors
///
/// Returns [`SearchError::Expansion`] when fewer than three or more than
/// five usable suggestions remain.
pub fn check_suggestions(
    suggestions: Vec<QuerySuggestion>,
) -> Result<Vec<QuerySuggestion>, SearchError> {
    let cleaned: Vec<QuerySuggestion> = suggestions
        .into_iter()
        .filter_map(|s| {
            let query = s.search_query.trim();
            if query.is_empty() {
                return None;
            }
            let name = s.place_name.trim();
            let name = if name.is_empty() { query } else { name };
            Some(QuerySuggestion::new(name, query))
        })
        .collect();

    if !(MIN_SUGGESTIONS..=MAX_SUGGESTIONS).contains(&cleaned.len()) {
        return Err(SearchError::Expansion(format!(
            "expected {MIN_SUGGESTIONS}-{MAX_SUGGESTIONS} suggestions, got {}",
            cleaned.len()
        )));
    }
    Ok(cleaned)
}

/// Turns validated requests into query suggestions.
#[derive(Clone)]
pub struct QueryExpander {
    generator: Option<Arc<dyn SuggestionGenerator>>,
    image_fetcher: Option<Arc<dyn ImageFetcher>>,
    timeout: Duration,
}

impl QueryExpander {
    /// `timeout` bounds one whole expansion, image fetch included.
    pub fn new(
        generator: Option<Arc<dyn SuggestionGenerator>>,
        image_fetcher: Option<Arc<dyn ImageFetcher>>,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            image_fetcher,
            timeout,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn SuggestionGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_image_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.image_fetcher = Some(fetcher);
        self
    }

    /// Expand `request` into 3–5 suggestions. Never fails.
    pub async fn expand(&self, request: &ValidatedRequest) -> Vec<QuerySuggestion> {
        let subject = match &request.input {
            UserInput::Text(text) => text.as_str(),
            UserInput::Image(_) => IMAGE_FALLBACK_SUBJECT,
        };
        let fallback = || fallback_suggestions(subject, request.latitude, request.longitude);

        let Some(generator) = self.generator.as_deref() else {
            tracing::debug!("no suggestion generator configured, using fallback queries");
            return fallback();
        };

        let attempt = AssertUnwindSafe(self.generate(generator, request)).catch_unwind();
        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(Ok(suggestions))) => {
                tracing::debug!(
                    generator = generator.name(),
                    count = suggestions.len(),
                    "query expansion succeeded"
                );
                suggestions
            }
            Ok(Ok(Err(err))) => {
                tracing::warn!(generator = generator.name(), error = %err, "query expansion failed, using fallback");
                fallback()
            }
            Ok(Err(_panic)) => {
                tracing::warn!(generator = generator.name(), "query expansion panicked, using fallback");
                fallback()
            }
            Err(_elapsed) => {
                let err = SearchError::timeout(generator.name(), self.timeout);
                tracing::warn!(generator = generator.name(), error = %err, "query expansion timed out, using fallback");
                fallback()
            }
        }
    }

    async fn generate(
        &self,
        generator: &dyn SuggestionGenerator,
        request: &ValidatedRequest,
    ) -> Result<Vec<QuerySuggestion>, SearchError> {
        let suggestions = match &request.input {
            UserInput::Text(text) => {
                generator
                    .suggest(
                        GeneratorInput::Text(text),
                        request.latitude,
                        request.longitude,
                    )
                    .await?
            }
            UserInput::Image(image_ref) => {
                let fetcher = self.image_fetcher.as_deref().ok_or_else(|| {
                    SearchError::Expansion("no image fetcher configured".into())
                })?;
                let image = fetcher.fetch(image_ref).await?;
                tracing::trace!(
                    bytes = image.bytes.len(),
                    mime_type = %image.mime_type,
                    "image fetched for expansion"
                );
                generator
                    .suggest(
                        GeneratorInput::Image(&image),
                        request.latitude,
                        request.longitude,
                    )
                    .await?
            }
        };
        check_suggestions(suggestions)
    }
}
