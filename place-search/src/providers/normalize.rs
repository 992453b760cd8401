//! Normalisation shared by provider adapters.
//!
//! Every adapter funnels its output through [`finalize`], which is the
//! single point where provider data becomes a trusted [`PlaceRecord`]:
//! required fields are checked, list caps are enforced, and empty values
//! collapse to `None`.

use crate::error::SearchError;
use crate::types::{PlaceRecord, MAX_IMAGE_URLS, MAX_REVIEW_SNIPPETS, MAX_TAGS};

/// Maximum characters kept from a review or tip before truncation.
pub const SNIPPET_MAX_CHARS: usize = 150;
/// Marker appended to truncated snippets.
pub const ELLIPSIS: &str = "...";
/// Common rating scale all providers are mapped onto.
pub const RATING_SCALE: f64 = 5.0;

/// Cut `text` to [`SNIPPET_MAX_CHARS`] characters, appending [`ELLIPSIS`]
/// when anything was removed.
pub fn truncate_snippet(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Rescale a rating from a `0..=native_max` scale onto `0.0..=5.0`,
/// rounded to two decimals.
///
/// Non-finite or negative inputs yield `None`.
pub fn rescale_rating(value: f64, native_max: f64) -> Option<f64> {
    if !value.is_finite() || value < 0.0 || native_max <= 0.0 {
        return None;
    }
    let scaled = (value * RATING_SCALE / native_max).clamp(0.0, RATING_SCALE);
    Some((scaled * 100.0).round() / 100.0)
}

/// Render a 1-indexed price tier as a run of `$` of the same length.
///
/// Tiers below 1 have no symbolic form and yield `None`.
pub fn price_tier(tier: i64) -> Option<String> {
    let tier = usize::try_from(tier).ok().filter(|t| *t >= 1)?;
    Some("$".repeat(tier.min(5)))
}

/// Trim and drop blank strings.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// `None` for an empty list.
pub fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Trimmed, case-insensitively distinct, non-blank strings, keeping the
/// first spelling seen and at most `limit` entries.
pub fn distinct(values: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let key = value.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(value.to_owned());
        if out.len() == limit {
            break;
        }
    }
    out
}

/// Validate and tidy a record assembled by an adapter.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] when the name is blank or the
/// coordinate is not a real position on Earth.
pub fn finalize(mut record: PlaceRecord) -> Result<PlaceRecord, SearchError> {
    record.name = record.name.trim().to_owned();
    if record.name.is_empty() {
        return Err(SearchError::Parse(format!(
            "{} record has no name",
            record.source_name
        )));
    }
    if !record.latitude.is_finite()
        || !record.longitude.is_finite()
        || !(-90.0..=90.0).contains(&record.latitude)
        || !(-180.0..=180.0).contains(&record.longitude)
    {
        return Err(SearchError::Parse(format!(
            "{} record {:?} has an invalid coordinate",
            record.source_name, record.name
        )));
    }
    if record.category.trim().is_empty() {
        record.category = "Place".into();
    }

    record.provider_id = non_blank(record.provider_id);
    record.price_level = non_blank(record.price_level);
    record.website_url = non_blank(record.website_url);
    record.phone_number = non_blank(record.phone_number);
    record.menu_url = non_blank(record.menu_url);
    record.rating = record
        .rating
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(0.0, RATING_SCALE));

    record.image_urls = record
        .image_urls
        .map(|urls| distinct(urls, MAX_IMAGE_URLS))
        .and_then(non_empty);
    record.review_snippets = record
        .review_snippets
        .map(|snippets| {
            snippets
                .iter()
                .map(|s| truncate_snippet(s))
                .filter(|s| !s.is_empty())
                .take(MAX_REVIEW_SNIPPETS)
                .collect()
        })
        .and_then(non_empty);
    record.tags = record
        .tags
        .map(|tags| distinct(tags, MAX_TAGS))
        .and_then(non_empty);
    record.social_links = record
        .social_links
        .map(|links| {
            links
                .into_iter()
                .filter(|l| !l.platform.trim().is_empty() && !l.url.trim().is_empty())
                .collect()
        })
        .and_then(non_empty);
    // Distances belong to the ranker.
    record.distance_from_query_km = None;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SocialLink;

    fn base_record() -> PlaceRecord {
        PlaceRecord {
            source_name: "Test".into(),
            name: "Cafe".into(),
            description: "desc".into(),
            latitude: 1.0,
            longitude: 2.0,
            category: "Cafe".into(),
            ..Default::default()
        }
    }

    #[test]
    fn short_snippet_unchanged() {
        assert_eq!(truncate_snippet("Lovely espresso."), "Lovely espresso.");
    }

    #[test]
    fn long_snippet_cut_to_150_plus_ellipsis() {
        let text = "a".repeat(200);
        let cut = truncate_snippet(&text);
        assert_eq!(cut.len(), 153);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn exactly_150_chars_not_truncated() {
        let text = "b".repeat(150);
        assert_eq!(truncate_snippet(&text), text);
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let text = "é".repeat(151);
        let cut = truncate_snippet(&text);
        assert_eq!(cut.chars().count(), 153);
    }

    #[test]
    fn ten_point_scale_is_halved() {
        let rating = rescale_rating(9.1, 10.0).expect("rating");
        assert!((rating - 4.55).abs() < 1e-9);
    }

    #[test]
    fn five_point_scale_unchanged() {
        let rating = rescale_rating(4.5, 5.0).expect("rating");
        assert!((rating - 4.5).abs() < 1e-9);
    }

    #[test]
    fn rating_clamped_and_invalid_dropped() {
        assert!((rescale_rating(12.0, 10.0).expect("rating") - 5.0).abs() < 1e-9);
        assert!(rescale_rating(f64::NAN, 10.0).is_none());
        assert!(rescale_rating(-1.0, 10.0).is_none());
    }

    #[test]
    fn price_tiers_render_as_dollar_runs() {
        assert_eq!(price_tier(1).as_deref(), Some("$"));
        assert_eq!(price_tier(3).as_deref(), Some("$$$"));
        assert!(price_tier(0).is_none());
        assert!(price_tier(-2).is_none());
    }

    #[test]
    fn distinct_dedups_case_insensitively_and_caps() {
        let tags = vec![
            "Cafe".to_string(),
            "cafe".to_string(),
            " ".to_string(),
            "Bakery".to_string(),
            "Bar".to_string(),
            "Deli".to_string(),
            "Diner".to_string(),
        ];
        assert_eq!(distinct(tags, 4), vec!["Cafe", "Bakery", "Bar", "Deli"]);
    }

    #[test]
    fn finalize_collapses_empty_values() {
        let record = PlaceRecord {
            provider_id: Some("  ".into()),
            image_urls: Some(vec![]),
            review_snippets: Some(vec!["   ".into()]),
            tags: Some(vec![]),
            website_url: Some(String::new()),
            social_links: Some(vec![SocialLink {
                platform: "Instagram".into(),
                url: String::new(),
            }]),
            ..base_record()
        };
        let record = finalize(record).expect("valid");
        assert!(record.provider_id.is_none());
        assert!(record.image_urls.is_none());
        assert!(record.review_snippets.is_none());
        assert!(record.tags.is_none());
        assert!(record.website_url.is_none());
        assert!(record.social_links.is_none());
    }

    #[test]
    fn finalize_caps_lists() {
        let record = PlaceRecord {
            image_urls: Some((0..8).map(|i| format!("https://img/{i}.jpg")).collect()),
            review_snippets: Some((0..5).map(|i| format!("review {i}")).collect()),
            ..base_record()
        };
        let record = finalize(record).expect("valid");
        assert_eq!(record.image_urls.map(|v| v.len()), Some(5));
        assert_eq!(record.review_snippets.map(|v| v.len()), Some(3));
    }

    #[test]
    fn finalize_rejects_blank_name() {
        let record = PlaceRecord {
            name: "  ".into(),
            ..base_record()
        };
        assert!(finalize(record).is_err());
    }

    #[test]
    fn finalize_rejects_bad_coordinate() {
        let record = PlaceRecord {
            latitude: 120.0,
            ..base_record()
        };
        assert!(finalize(record).is_err());
    }

    #[test]
    fn finalize_defaults_blank_category() {
        let record = PlaceRecord {
            category: String::new(),
            ..base_record()
        };
        assert_eq!(finalize(record).expect("valid").category, "Place");
    }
}
