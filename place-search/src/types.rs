//! Core types for place records, search requests, and provider identification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SearchError;

/// Maximum image URLs carried on a single record.
pub const MAX_IMAGE_URLS: usize = 5;
/// Maximum review snippets carried on a single record.
pub const MAX_REVIEW_SNIPPETS: usize = 3;
/// Maximum tags carried on a single record.
pub const MAX_TAGS: usize = 4;
/// Search radius used when a request does not specify one.
pub const DEFAULT_RADIUS_METERS: f64 = 20_000.0;

/// A social media profile attached to a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Platform name, e.g. `"Instagram"`.
    pub platform: String,
    /// Full profile URL.
    pub url: String,
}

/// A single place, normalised to the common schema regardless of provider.
///
/// Optional fields with no value are omitted from the serialized form
/// entirely. Consumers rely on this: an absent field is never rendered as
/// `null`, `""`, or `[]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    /// Provider-issued stable identifier, unique within that provider.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub provider_id: Option<String>,
    /// Which provider produced this record.
    pub source_name: String,
    /// Display name.
    pub name: String,
    /// Free-text summary.
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Primary classification label.
    pub category: String,
    /// Directly fetchable image URLs (at most [`MAX_IMAGE_URLS`]).
    #[serde(default, skip_serializing_if = "is_empty_list")]
    pub image_urls: Option<Vec<String>>,
    /// Rating on a 0.0–5.0 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Symbolic price tier, a run of `$`.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub price_level: Option<String>,
    /// Review snippets (at most [`MAX_REVIEW_SNIPPETS`]).
    #[serde(default, skip_serializing_if = "is_empty_list")]
    pub review_snippets: Option<Vec<String>>,
    /// Distinct tags (at most [`MAX_TAGS`]).
    #[serde(default, skip_serializing_if = "is_empty_list")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub menu_url: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_list")]
    pub social_links: Option<Vec<SocialLink>>,
    /// Great-circle distance from the query point, attached by the ranker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_query_km: Option<f64>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn is_empty_list<T>(value: &Option<Vec<T>>) -> bool {
    value.as_ref().is_none_or(Vec::is_empty)
}

/// One candidate search query produced by query expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySuggestion {
    /// Conceptual name of the place or kind of place.
    pub place_name: String,
    /// Concrete query string handed to providers.
    pub search_query: String,
}

impl QuerySuggestion {
    pub fn new(place_name: impl Into<String>, search_query: impl Into<String>) -> Self {
        Self {
            place_name: place_name.into(),
            search_query: search_query.into(),
        }
    }
}

/// Which kind of user input a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Image,
}

/// An incoming place search request.
///
/// Exactly one of `text_input` / `image_ref` must be present, matching
/// `input_kind`. Use [`SearchRequest::validate`] before acting on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub input_kind: InputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Search radius; [`DEFAULT_RADIUS_METERS`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_meters: Option<f64>,
}

impl SearchRequest {
    /// Build a text request with the default radius.
    pub fn text(input: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            input_kind: InputKind::Text,
            text_input: Some(input.into()),
            image_ref: None,
            latitude,
            longitude,
            radius_meters: None,
        }
    }

    /// Build an image request with the default radius.
    pub fn image(image_ref: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            input_kind: InputKind::Image,
            text_input: None,
            image_ref: Some(image_ref.into()),
            latitude,
            longitude,
            radius_meters: None,
        }
    }

    /// Set an explicit search radius.
    pub fn with_radius(mut self, radius_meters: f64) -> Self {
        self.radius_meters = Some(radius_meters);
        self
    }

    /// Check the request shape and coordinate ranges.
    ///
    /// `default_radius` is used when the request carries no radius.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] when the payload does not match
    /// `input_kind`, when both payloads are present, or when a coordinate
    /// or the radius is out of range.
    pub fn validate(&self, default_radius: f64) -> Result<ValidatedRequest, SearchError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SearchError::Validation(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SearchError::Validation(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        let radius_meters = self.radius_meters.unwrap_or(default_radius);
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(SearchError::Validation(
                "radiusMeters must be greater than 0".into(),
            ));
        }

        let input = match (self.input_kind, &self.text_input, &self.image_ref) {
            (InputKind::Text, Some(text), None) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(SearchError::Validation("textInput is blank".into()));
                }
                UserInput::Text(text.to_owned())
            }
            (InputKind::Image, None, Some(image_ref)) => {
                let image_ref = image_ref.trim();
                let parsed = url::Url::parse(image_ref).map_err(|e| {
                    SearchError::Validation(format!("imageRef is not a valid URL: {e}"))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(SearchError::Validation(
                        "imageRef must be an http(s) URL".into(),
                    ));
                }
                UserInput::Image(image_ref.to_owned())
            }
            (InputKind::Text, None, _) => {
                return Err(SearchError::Validation(
                    "textInput is required for text input".into(),
                ));
            }
            (InputKind::Image, _, None) => {
                return Err(SearchError::Validation(
                    "imageRef is required for image input".into(),
                ));
            }
            (kind, _, _) => {
                return Err(SearchError::Validation(format!(
                    "exactly one payload must accompany {kind:?} input"
                )));
            }
        };

        Ok(ValidatedRequest {
            input,
            latitude: self.latitude,
            longitude: self.longitude,
            radius_meters,
        })
    }
}

/// The user's payload after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Trimmed free text.
    Text(String),
    /// Absolute http(s) URL of an image to analyse.
    Image(String),
}

/// A [`SearchRequest`] whose shape and ranges have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub input: UserInput,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

/// The ranked, deduplicated places for one request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub locations: Vec<PlaceRecord>,
}

impl SearchResult {
    /// A result with no locations.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Supported place-data providers.
///
/// Declaration order is the fixed source priority used by reconciliation:
/// earlier providers form the base set that later providers are matched
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Google Places: text search plus place details.
    Google,
    /// Foursquare Places: search plus photos and tips.
    Foursquare,
}

impl ProviderKind {
    /// Returns the human-readable name of this provider, used as
    /// [`PlaceRecord::source_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Foursquare => "Foursquare",
        }
    }

    /// Returns all providers in source-priority order.
    pub fn all() -> &'static [ProviderKind] {
        &[Self::Google, Self::Foursquare]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
