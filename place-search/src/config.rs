//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] is constructed once per process and handed to
//! [`crate::Pipeline::from_config`]. It decides which providers are active
//! (a provider is active only when its credentials are present), how long
//! each outbound call may take, and which suggestion generator is used.

use crate::error::SearchError;
use crate::types::{ProviderKind, DEFAULT_RADIUS_METERS};

/// Default Google Places API host.
pub const GOOGLE_BASE_URL: &str = "https://maps.googleapis.com";
/// Default Foursquare Places API host.
pub const FOURSQUARE_BASE_URL: &str = "https://api.foursquare.com";
/// Default Gemini REST API host.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default Gemini model for query suggestions.
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Credentials and endpoint for the Google Places provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub api_key: String,
    /// API host, overridable for tests.
    pub base_url: String,
}

impl GoogleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GOOGLE_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Credentials and endpoint for the Foursquare Places provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoursquareConfig {
    pub api_key: String,
    /// API host, overridable for tests.
    pub base_url: String,
}

impl FoursquareConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: FOURSQUARE_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Credentials, model, and endpoint for the Gemini suggestion generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// API host, overridable for tests.
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: GEMINI_DEFAULT_MODEL.into(),
            base_url: GEMINI_BASE_URL.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Configuration for a place search pipeline.
///
/// Use [`Default::default()`] for sensible defaults (no providers active),
/// then fill in the credentials you have.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Google Places credentials. `None` leaves the provider inactive.
    pub google: Option<GoogleConfig>,
    /// Foursquare Places credentials. `None` leaves the provider inactive.
    pub foursquare: Option<FoursquareConfig>,
    /// Gemini credentials. `None` means every request uses the
    /// deterministic fallback queries.
    pub gemini: Option<GeminiConfig>,
    /// Per provider-call timeout in seconds. A timed-out call counts as
    /// "no result".
    pub timeout_seconds: u64,
    /// Timeout in seconds for one query-expansion call (including the
    /// image fetch for image input).
    pub expansion_timeout_seconds: u64,
    /// Radius used when a request carries none.
    pub default_radius_meters: f64,
    /// Maximum raw candidates requested from a provider's text search
    /// before the nearest is selected.
    pub candidate_limit: usize,
    /// Custom User-Agent string. If `None`, the crate's own is used.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            google: None,
            foursquare: None,
            gemini: None,
            timeout_seconds: 8,
            expansion_timeout_seconds: 15,
            default_radius_meters: DEFAULT_RADIUS_METERS,
            candidate_limit: 10,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` and `expansion_timeout_seconds` must be greater than 0
    /// - `candidate_limit` must be greater than 0
    /// - `default_radius_meters` must be finite and greater than 0
    /// - every configured base URL must be non-blank
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.expansion_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "expansion_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.candidate_limit == 0 {
            return Err(SearchError::Config(
                "candidate_limit must be greater than 0".into(),
            ));
        }
        if !self.default_radius_meters.is_finite() || self.default_radius_meters <= 0.0 {
            return Err(SearchError::Config(
                "default_radius_meters must be greater than 0".into(),
            ));
        }
        let base_urls = [
            ("google", self.google.as_ref().map(|c| c.base_url.as_str())),
            (
                "foursquare",
                self.foursquare.as_ref().map(|c| c.base_url.as_str()),
            ),
            ("gemini", self.gemini.as_ref().map(|c| c.base_url.as_str())),
        ];
        for (name, url) in base_urls {
            if url.is_some_and(|u| u.trim().is_empty()) {
                return Err(SearchError::Config(format!(
                    "{name} base_url must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Providers with usable credentials, in source-priority order.
    pub fn active_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::all()
            .iter()
            .copied()
            .filter(|kind| match kind {
                ProviderKind::Google => self
                    .google
                    .as_ref()
                    .is_some_and(|c| !c.api_key.trim().is_empty()),
                ProviderKind::Foursquare => self
                    .foursquare
                    .as_ref()
                    .is_some_and(|c| !c.api_key.trim().is_empty()),
            })
            .collect()
    }

    /// Gemini settings, if a non-blank key is configured.
    pub fn active_gemini(&self) -> Option<&GeminiConfig> {
        self.gemini
            .as_ref()
            .filter(|c| !c.api_key.trim().is_empty())
    }
}
