//! Google Places provider: text search, then place details.
//!
//! The text search is location-biased but ranked by Google's relevance;
//! the adapter re-picks the candidate nearest the query point before
//! fetching details, so proximity is respected the same way for every
//! provider.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GoogleConfig;
use crate::error::SearchError;
use crate::http::redact;
use crate::provider::{nearest_candidate, PlaceProvider};
use crate::types::{PlaceRecord, ProviderKind, MAX_IMAGE_URLS, MAX_REVIEW_SNIPPETS, MAX_TAGS};

use super::normalize::{distinct, finalize, non_blank, non_empty, price_tier, rescale_rating};

/// Place-details fields requested from Google.
const DETAIL_FIELDS: &str = "name,place_id,geometry,types,editorial_summary,website,formatted_phone_number,rating,price_level,reviews,photos";
/// Largest radius the text search endpoint accepts.
const MAX_RADIUS_METERS: f64 = 50_000.0;
/// Width requested for photo URLs.
const PHOTO_MAX_WIDTH: &str = "800";
/// Generic Google types that carry no information as tags.
const GENERIC_TYPES: &[&str] = &["point_of_interest", "establishment"];

/// Google Places API adapter.
///
/// Priority 1 provider. Its records form the base set during
/// reconciliation.
pub struct GoogleProvider {
    client: reqwest::Client,
    config: GoogleConfig,
    candidate_limit: usize,
}

impl GoogleProvider {
    /// Create an adapter sharing the pipeline's HTTP client.
    pub fn new(client: reqwest::Client, config: GoogleConfig, candidate_limit: usize) -> Self {
        Self {
            client,
            config,
            candidate_limit,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SearchError> {
        let url = self.endpoint(path);
        tracing::trace!(url = %url, "Google request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                SearchError::Http(redact(
                    &format!("Google request failed: {e}"),
                    &self.config.api_key,
                ))
            })?
            .error_for_status()
            .map_err(|e| {
                SearchError::Http(redact(
                    &format!("Google HTTP error: {e}"),
                    &self.config.api_key,
                ))
            })?;

        response
            .json::<T>()
            .await
            .map_err(|e| {
                SearchError::Parse(redact(
                    &format!("Google response malformed: {e}"),
                    &self.config.api_key,
                ))
            })
    }

    fn photo_url(&self, reference: &str) -> Option<String> {
        url::Url::parse_with_params(
            &self.endpoint("/maps/api/place/photo"),
            &[
                ("maxwidth", PHOTO_MAX_WIDTH),
                ("photoreference", reference),
                ("key", self.config.api_key.as_str()),
            ],
        )
        .ok()
        .map(String::from)
    }
}

#[async_trait]
impl PlaceProvider for GoogleProvider {
    async fn fetch_place(
        &self,
        query: &str,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<Option<PlaceRecord>, SearchError> {
        tracing::trace!(query, "Google text search");

        let location = format!("{latitude},{longitude}");
        let radius = format!("{}", radius_meters.min(MAX_RADIUS_METERS).round());
        let search: TextSearchResponse = self
            .get_json(
                "/maps/api/place/textsearch/json",
                &[
                    ("query", query),
                    ("location", location.as_str()),
                    ("radius", radius.as_str()),
                ],
            )
            .await?;
        if !check_status(search.status.as_deref(), search.error_message.as_deref())? {
            return Ok(None);
        }

        let count = search.results.len();
        let candidates = search
            .results
            .into_iter()
            .filter(|c| c.place_id.as_deref().is_some_and(|id| !id.is_empty()))
            .take(self.candidate_limit);
        let Some(candidate) = nearest_candidate(candidates, latitude, longitude, |c| {
            c.geometry.as_ref().map(|g| (g.location.lat, g.location.lng))
        }) else {
            tracing::debug!(count, "Google text search: no usable candidates");
            return Ok(None);
        };
        let place_id = candidate.place_id.clone().unwrap_or_default();

        let details: DetailsResponse = self
            .get_json(
                "/maps/api/place/details/json",
                &[("place_id", place_id.as_str()), ("fields", DETAIL_FIELDS)],
            )
            .await?;
        if !check_status(details.status.as_deref(), details.error_message.as_deref())? {
            return Ok(None);
        }
        let Some(details) = details.result else {
            tracing::debug!(place_id = %place_id, "Google details: empty result");
            return Ok(None);
        };

        let record = self.to_record(query, candidate, details)?;
        tracing::debug!(name = %record.name, "Google place resolved");
        Ok(Some(record))
    }

    fn name(&self) -> &str {
        ProviderKind::Google.name()
    }
}

impl GoogleProvider {
    fn to_record(
        &self,
        query: &str,
        candidate: TextSearchCandidate,
        details: PlaceDetails,
    ) -> Result<PlaceRecord, SearchError> {
        let name = non_blank(details.name).unwrap_or_else(|| query.to_owned());
        let (latitude, longitude) = details
            .geometry
            .or(candidate.geometry)
            .map(|g| (g.location.lat, g.location.lng))
            .ok_or_else(|| SearchError::Parse(format!("Google place {name:?} has no geometry")))?;

        let description = non_blank(details.editorial_summary.and_then(|s| s.overview))
            .or_else(|| non_blank(candidate.formatted_address))
            .unwrap_or_else(|| format!("A notable place: {name}"));
        let category = details
            .types
            .first()
            .map(|t| t.replace('_', " "))
            .unwrap_or_else(|| "Place".into());

        let image_urls: Vec<String> = details
            .photos
            .iter()
            .filter_map(|p| p.photo_reference.as_deref())
            .filter(|r| !r.is_empty())
            .take(MAX_IMAGE_URLS)
            .filter_map(|r| self.photo_url(r))
            .collect();
        let review_snippets: Vec<String> = details
            .reviews
            .into_iter()
            .filter_map(|r| non_blank(r.text))
            .take(MAX_REVIEW_SNIPPETS)
            .collect();
        let tags = distinct(
            details
                .types
                .iter()
                .filter(|t| !GENERIC_TYPES.contains(&t.to_lowercase().as_str()))
                .map(|t| t.replace('_', " ")),
            MAX_TAGS,
        );

        finalize(PlaceRecord {
            provider_id: details.place_id.or(candidate.place_id),
            source_name: ProviderKind::Google.name().into(),
            name,
            description,
            latitude,
            longitude,
            category,
            image_urls: non_empty(image_urls),
            rating: details.rating.and_then(|r| rescale_rating(r, 5.0)),
            price_level: details
                .price_level
                .and_then(|level| price_tier(level.saturating_add(1))),
            review_snippets: non_empty(review_snippets),
            tags: non_empty(tags),
            website_url: details.website,
            phone_number: details.formatted_phone_number,
            menu_url: None,
            social_links: None,
            distance_from_query_km: None,
        })
    }
}

/// Interpret a Places API `status` field.
///
/// Returns `Ok(true)` to continue, `Ok(false)` for an empty result, and an
/// error for any refusal (bad key, quota, invalid request).
fn check_status(status: Option<&str>, message: Option<&str>) -> Result<bool, SearchError> {
    match status {
        None | Some("OK") => Ok(true),
        Some("ZERO_RESULTS" | "NOT_FOUND") => Ok(false),
        Some(other) => Err(SearchError::Http(format!(
            "Google status {other}: {}",
            message.unwrap_or("no message")
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    results: Vec<TextSearchCandidate>,
    status: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextSearchCandidate {
    place_id: Option<String>,
    formatted_address: Option<String>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceDetails>,
    status: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    place_id: Option<String>,
    name: Option<String>,
    geometry: Option<Geometry>,
    #[serde(default)]
    types: Vec<String>,
    editorial_summary: Option<EditorialSummary>,
    website: Option<String>,
    formatted_phone_number: Option<String>,
    rating: Option<f64>,
    price_level: Option<i64>,
    #[serde(default)]
    reviews: Vec<Review>,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct EditorialSummary {
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Review {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: Option<String>,
}
