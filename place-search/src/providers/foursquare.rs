//! Foursquare Places provider: venue search, then photos and tips.
//!
//! The search endpoint already returns most fields, so stage two only
//! enriches the chosen venue with photos and tips. The two enrichment
//! calls run concurrently and fail independently: a failed photo fetch
//! leaves `image_urls` absent but still yields the record.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::FoursquareConfig;
use crate::error::SearchError;
use crate::provider::{nearest_candidate, PlaceProvider};
use crate::types::{
    PlaceRecord, ProviderKind, SocialLink, MAX_IMAGE_URLS, MAX_REVIEW_SNIPPETS, MAX_TAGS,
};

use super::normalize::{distinct, finalize, non_blank, non_empty, price_tier, rescale_rating};

/// Venue fields requested from the search endpoint.
const SEARCH_FIELDS: &str =
    "fsq_id,name,geocodes,location,categories,website,social_media,tel,email,rating,price,description,menu";
/// Largest radius the search endpoint accepts.
const MAX_RADIUS_METERS: f64 = 100_000.0;
/// Largest page size the search endpoint accepts.
const MAX_LIMIT: usize = 50;
/// Foursquare ratings are on a 0–10 scale.
const NATIVE_RATING_SCALE: f64 = 10.0;

/// Foursquare Places API adapter.
///
/// Priority 2 provider. Its records are matched against the Google base
/// set during reconciliation.
pub struct FoursquareProvider {
    client: reqwest::Client,
    config: FoursquareConfig,
    candidate_limit: usize,
}

impl FoursquareProvider {
    /// Create an adapter sharing the pipeline's HTTP client.
    pub fn new(client: reqwest::Client, config: FoursquareConfig, candidate_limit: usize) -> Self {
        Self {
            client,
            config,
            candidate_limit,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SearchError> {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        tracing::trace!(url = %url, "Foursquare request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("Authorization", self.config.api_key.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Foursquare request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Foursquare HTTP error: {e}")))?;

        response
            .json::<T>()
            .await
            .map_err(|e| SearchError::Parse(format!("Foursquare response malformed: {e}")))
    }

    async fn photos(&self, fsq_id: &str) -> Option<Vec<String>> {
        let path = format!("/v3/places/{fsq_id}/photos");
        match self
            .get_json::<Vec<FsqPhoto>>(&path, &[("limit", "5"), ("sort", "POPULAR")])
            .await
        {
            Ok(photos) => non_empty(
                photos
                    .into_iter()
                    .filter_map(|p| match (p.prefix, p.suffix) {
                        (Some(prefix), Some(suffix)) if !prefix.is_empty() => {
                            Some(format!("{prefix}original{suffix}"))
                        }
                        _ => None,
                    })
                    .take(MAX_IMAGE_URLS)
                    .collect(),
            ),
            Err(err) => {
                tracing::debug!(fsq_id, error = %err, "Foursquare photos unavailable");
                None
            }
        }
    }

    async fn tips(&self, fsq_id: &str) -> Option<Vec<String>> {
        let path = format!("/v3/places/{fsq_id}/tips");
        match self
            .get_json::<Vec<FsqTip>>(&path, &[("limit", "3"), ("sort", "POPULAR")])
            .await
        {
            Ok(tips) => non_empty(
                tips.into_iter()
                    .filter_map(|t| non_blank(t.text))
                    .take(MAX_REVIEW_SNIPPETS)
                    .collect(),
            ),
            Err(err) => {
                tracing::debug!(fsq_id, error = %err, "Foursquare tips unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl PlaceProvider for FoursquareProvider {
    async fn fetch_place(
        &self,
        query: &str,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<Option<PlaceRecord>, SearchError> {
        tracing::trace!(query, "Foursquare search");

        let ll = format!("{latitude},{longitude}");
        let radius = format!("{}", radius_meters.min(MAX_RADIUS_METERS).round());
        let limit = self.candidate_limit.min(MAX_LIMIT).to_string();
        let search: FsqSearchResponse = self
            .get_json(
                "/v3/places/search",
                &[
                    ("query", query),
                    ("ll", ll.as_str()),
                    ("radius", radius.as_str()),
                    ("limit", limit.as_str()),
                    ("fields", SEARCH_FIELDS),
                ],
            )
            .await?;

        let count = search.results.len();
        let candidates = search
            .results
            .into_iter()
            .filter(|v| v.fsq_id.as_deref().is_some_and(|id| !id.is_empty()));
        let Some(venue) = nearest_candidate(candidates, latitude, longitude, FsqVenue::coordinate)
        else {
            tracing::debug!(count, "Foursquare search: no usable venues");
            return Ok(None);
        };
        let fsq_id = venue.fsq_id.clone().unwrap_or_default();

        let (image_urls, review_snippets) =
            futures::future::join(self.photos(&fsq_id), self.tips(&fsq_id)).await;

        let record = to_record(venue, image_urls, review_snippets)?;
        tracing::debug!(name = %record.name, "Foursquare place resolved");
        Ok(Some(record))
    }

    fn name(&self) -> &str {
        ProviderKind::Foursquare.name()
    }
}

fn to_record(
    venue: FsqVenue,
    image_urls: Option<Vec<String>>,
    review_snippets: Option<Vec<String>>,
) -> Result<PlaceRecord, SearchError> {
    let (latitude, longitude) = venue
        .coordinate()
        .ok_or_else(|| SearchError::Parse("Foursquare venue has no main geocode".into()))?;
    let name = non_blank(venue.name)
        .ok_or_else(|| SearchError::Parse("Foursquare venue has no name".into()))?;

    let category_names: Vec<String> = venue
        .categories
        .into_iter()
        .filter_map(|c| non_blank(c.name))
        .collect();
    let description = non_blank(venue.description)
        .or_else(|| non_blank(Some(category_names.join(", "))))
        .unwrap_or_else(|| format!("Popular Foursquare venue: {name}"));
    let category = category_names
        .first()
        .cloned()
        .unwrap_or_else(|| "Place".into());

    finalize(PlaceRecord {
        provider_id: venue.fsq_id,
        source_name: ProviderKind::Foursquare.name().into(),
        name,
        description,
        latitude,
        longitude,
        category,
        image_urls,
        rating: venue
            .rating
            .and_then(|r| rescale_rating(r, NATIVE_RATING_SCALE)),
        price_level: venue.price.and_then(price_tier),
        review_snippets,
        tags: non_empty(distinct(category_names, MAX_TAGS)),
        website_url: venue.website,
        phone_number: venue.tel,
        menu_url: venue.menu,
        social_links: venue.social_media.and_then(FsqSocialMedia::links),
        distance_from_query_km: None,
    })
}

#[derive(Debug, Deserialize)]
struct FsqSearchResponse {
    #[serde(default)]
    results: Vec<FsqVenue>,
}

#[derive(Debug, Deserialize)]
struct FsqVenue {
    fsq_id: Option<String>,
    name: Option<String>,
    geocodes: Option<FsqGeocodes>,
    #[serde(default)]
    categories: Vec<FsqCategory>,
    website: Option<String>,
    social_media: Option<FsqSocialMedia>,
    tel: Option<String>,
    rating: Option<f64>,
    price: Option<i64>,
    description: Option<String>,
    menu: Option<String>,
}

impl FsqVenue {
    fn coordinate(&self) -> Option<(f64, f64)> {
        let main = self.geocodes.as_ref()?.main.as_ref()?;
        Some((main.latitude, main.longitude))
    }
}

#[derive(Debug, Deserialize)]
struct FsqGeocodes {
    main: Option<FsqPoint>,
}

#[derive(Debug, Deserialize)]
struct FsqPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct FsqCategory {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FsqSocialMedia {
    facebook_id: Option<String>,
    instagram: Option<String>,
    twitter: Option<String>,
}

impl FsqSocialMedia {
    fn links(self) -> Option<Vec<SocialLink>> {
        let profiles = [
            ("Facebook", "https://www.facebook.com/", self.facebook_id),
            ("Instagram", "https://www.instagram.com/", self.instagram),
            ("Twitter", "https://twitter.com/", self.twitter),
        ];
        non_empty(
            profiles
                .into_iter()
                .filter_map(|(platform, prefix, handle)| {
                    non_blank(handle).map(|h| SocialLink {
                        platform: platform.into(),
                        url: format!("{prefix}{h}"),
                    })
                })
                .collect(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct FsqPhoto {
    prefix: Option<String>,
    suffix: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FsqTip {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> FoursquareProvider {
        FoursquareProvider::new(
            reqwest::Client::new(),
            FoursquareConfig::new("fsq-test-key").with_base_url(server.uri()),
            10,
        )
    }

    fn venue(id: &str, name: &str, lat: f64, lon: f64) -> serde_json::Value {
        json!({
            "fsq_id": id,
            "name": name,
            "geocodes": {"main": {"latitude": lat, "longitude": lon}},
            "categories": [{"name": "Coffee Shop"}, {"name": "Café"}],
            "rating": 9.1,
            "price": 2,
            "tel": "+971 4 111 1111",
            "menu": "https://menu.example/b1",
            "social_media": {"instagram": "bluebottle", "twitter": ""}
        })
    }

    #[tokio::test]
    async fn picks_nearest_venue_and_enriches() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/places/search"))
            .and(header("Authorization", "fsq-test-key"))
            .and(query_param("query", "coffee"))
            .and(query_param("ll", "25.2,55.3"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    venue("B9", "Far Coffee", 25.3, 55.4),
                    venue("B1", "blue bottle coffee", 25.2011, 55.3009)
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/places/B1/photos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"prefix": "https://fastly.example/img/", "suffix": "/a.jpg"},
                {"prefix": "https://fastly.example/img/", "suffix": "/b.jpg"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/places/B1/tips"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"text": "Try the New Orleans iced coffee."}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let record = provider(&server)
            .fetch_place("coffee", 25.2, 55.3, 20_000.0)
            .await
            .expect("lookup succeeds")
            .expect("a place");

        assert_eq!(record.provider_id.as_deref(), Some("B1"));
        assert_eq!(record.source_name, "Foursquare");
        assert_eq!(record.name, "blue bottle coffee");
        assert_eq!(record.description, "Coffee Shop, Café");
        assert_eq!(record.category, "Coffee Shop");
        assert!((record.rating.expect("rating") - 4.55).abs() < 1e-9);
        assert_eq!(record.price_level.as_deref(), Some("$$"));
        assert_eq!(
            record.image_urls,
            Some(vec![
                "https://fastly.example/img/original/a.jpg".to_string(),
                "https://fastly.example/img/original/b.jpg".to_string(),
            ])
        );
        assert_eq!(
            record.review_snippets,
            Some(vec!["Try the New Orleans iced coffee.".to_string()])
        );
        assert_eq!(record.menu_url.as_deref(), Some("https://menu.example/b1"));
        assert_eq!(
            record.social_links,
            Some(vec![SocialLink {
                platform: "Instagram".into(),
                url: "https://www.instagram.com/bluebottle".into(),
            }])
        );
    }

    #[tokio::test]
    async fn failed_enrichment_omits_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/places/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "fsq_id": "X1",
                    "name": "Plain Venue",
                    "geocodes": {"main": {"latitude": 1.0, "longitude": 1.0}}
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3/places/X1/photos"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3/places/X1/tips"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let record = provider(&server)
            .fetch_place("venue", 1.0, 1.0, 1000.0)
            .await
            .expect("ok")
            .expect("record");
        assert_eq!(record.description, "Popular Foursquare venue: Plain Venue");
        assert_eq!(record.category, "Place");
        assert!(record.image_urls.is_none());
        assert!(record.review_snippets.is_none());
        assert!(record.tags.is_none());
        assert!(record.social_links.is_none());
        assert!(record.rating.is_none());
        assert!(record.price_level.is_none());
    }

    #[tokio::test]
    async fn empty_results_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/places/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let found = provider(&server)
            .fetch_place("nothing", 0.0, 0.0, 1000.0)
            .await
            .expect("not an error");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn unauthorized_is_error_and_lookup_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/places/search"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid token"})))
            .mount(&server)
            .await;

        let p = provider(&server);
        let err = p.fetch_place("coffee", 0.0, 0.0, 1000.0).await.unwrap_err();
        assert!(matches!(err, SearchError::Http(_)));
        assert!(p.lookup("coffee", 0.0, 0.0, 1000.0).await.is_none());
    }

    #[tokio::test]
    async fn venue_without_geocode_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/places/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"fsq_id": "N1", "name": "Nowhere"}]
            })))
            .mount(&server)
            .await;

        let found = provider(&server)
            .fetch_place("nowhere", 0.0, 0.0, 1000.0)
            .await
            .expect("not an error");
        assert!(found.is_none());
    }

    #[test]
    fn social_links_skip_blank_handles() {
        let social = FsqSocialMedia {
            facebook_id: Some("12345".into()),
            instagram: None,
            twitter: Some("  ".into()),
        };
        assert_eq!(
            social.links(),
            Some(vec![SocialLink {
                platform: "Facebook".into(),
                url: "https://www.facebook.com/12345".into(),
            }])
        );
    }
}
