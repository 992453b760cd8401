//! Trait definition for pluggable place-data providers.
//!
//! Each provider (Google, Foursquare) implements [`PlaceProvider`] to give
//! the aggregation stage a uniform interface: one query in, at most one
//! normalised [`PlaceRecord`] out.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::geo::haversine_km;
use crate::types::PlaceRecord;

/// A pluggable place-data backend.
///
/// Implementors perform a bounded two-stage lookup against one provider:
///
/// - a location-biased text search returning ranked candidates
/// - a detail fetch for the candidate nearest the query point
///
/// and convert the provider's payload into a validated [`PlaceRecord`].
/// Unvalidated provider shapes never leave the implementation.
///
/// All implementations must be `Send + Sync` for concurrent provider queries.
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Look up the best place for `query` near `(latitude, longitude)`.
    ///
    /// Returns `Ok(None)` when the provider has no match.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if a request fails, the provider answers
    /// with a non-success status, or the payload cannot be interpreted.
    async fn fetch_place(
        &self,
        query: &str,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<Option<PlaceRecord>, SearchError>;

    /// Provider name, also used as [`PlaceRecord::source_name`].
    fn name(&self) -> &str;

    /// Like [`PlaceProvider::fetch_place`], but errors are logged and
    /// reported as "no result".
    async fn lookup(
        &self,
        query: &str,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Option<PlaceRecord> {
        match self
            .fetch_place(query, latitude, longitude, radius_meters)
            .await
        {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(provider = self.name(), error = %err, "provider lookup failed");
                None
            }
        }
    }
}

/// Pick the candidate closest to `(latitude, longitude)`.
///
/// Candidates whose coordinate cannot be determined are skipped. Ties keep
/// the earliest candidate, so the provider's own ranking breaks them.
pub fn nearest_candidate<T, F>(
    candidates: impl IntoIterator<Item = T>,
    latitude: f64,
    longitude: f64,
    coordinate: F,
) -> Option<T>
where
    F: Fn(&T) -> Option<(f64, f64)>,
{
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let (lat, lon) = coordinate(&candidate)?;
            if !lat.is_finite() || !lon.is_finite() {
                return None;
            }
            Some((haversine_km(latitude, longitude, lat, lon), candidate))
        })
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A mock provider for testing trait bounds and async execution.
    struct MockProvider {
        record: Option<PlaceRecord>,
        fail: bool,
    }

    #[async_trait]
    impl PlaceProvider for MockProvider {
        async fn fetch_place(
            &self,
            _query: &str,
            _latitude: f64,
            _longitude: f64,
            _radius_meters: f64,
        ) -> Result<Option<PlaceRecord>, SearchError> {
            if self.fail {
                return Err(SearchError::Http("mock provider failure".into()));
            }
            Ok(self.record.clone())
        }

        fn name(&self) -> &str {
            "Mock"
        }
    }

    fn record() -> PlaceRecord {
        PlaceRecord {
            source_name: "Mock".into(),
            name: "Test Place".into(),
            description: "A place".into(),
            category: "Place".into(),
            ..Default::default()
        }
    }

    #[test]
    fn mock_provider_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockProvider>();
    }

    #[tokio::test]
    async fn lookup_returns_record() {
        let provider = MockProvider {
            record: Some(record()),
            fail: false,
        };
        let found = provider.lookup("test", 0.0, 0.0, 1000.0).await;
        assert_eq!(found.map(|r| r.name), Some("Test Place".to_string()));
    }

    #[tokio::test]
    async fn lookup_swallows_errors() {
        let provider = MockProvider {
            record: Some(record()),
            fail: true,
        };
        assert!(provider.fetch_place("test", 0.0, 0.0, 1000.0).await.is_err());
        assert!(provider.lookup("test", 0.0, 0.0, 1000.0).await.is_none());
    }

    #[test]
    fn nearest_candidate_prefers_proximity_over_rank() {
        let candidates = vec![("far", 25.5, 55.5), ("near", 25.201, 55.301), ("mid", 25.3, 55.3)];
        let picked = nearest_candidate(candidates, 25.2, 55.3, |c| Some((c.1, c.2)));
        assert_eq!(picked.map(|c| c.0), Some("near"));
    }

    #[test]
    fn nearest_candidate_ties_keep_first() {
        let candidates = vec![("first", 1.0, 1.0), ("second", 1.0, 1.0)];
        let picked = nearest_candidate(candidates, 0.0, 0.0, |c| Some((c.1, c.2)));
        assert_eq!(picked.map(|c| c.0), Some("first"));
    }

    #[test]
    fn nearest_candidate_skips_unlocated() {
        let candidates = vec![("none", None), ("some", Some((10.0, 10.0)))];
        let picked = nearest_candidate(candidates, 0.0, 0.0, |c| c.1);
        assert_eq!(picked.map(|c| c.0), Some("some"));
    }

    #[test]
    fn nearest_candidate_empty_is_none() {
        let candidates: Vec<(f64, f64)> = vec![];
        assert!(nearest_candidate(candidates, 0.0, 0.0, |c| Some(*c)).is_none());
    }
}
