//! Place provider implementations.
//!
//! Each module provides a struct implementing [`crate::provider::PlaceProvider`]
//! against one place-data API. [`build_active`] instantiates the providers
//! that have credentials, in source-priority order.

pub mod foursquare;
pub mod google;
pub mod normalize;

pub use foursquare::FoursquareProvider;
pub use google::GoogleProvider;

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::provider::PlaceProvider;
use crate::types::ProviderKind;

/// Instantiate every active provider, sharing `client`.
///
/// Providers without credentials are left out entirely; they are never
/// invoked and never reported as failures.
pub fn build_active(
    config: &SearchConfig,
    client: &reqwest::Client,
) -> Vec<Arc<dyn PlaceProvider>> {
    config
        .active_providers()
        .into_iter()
        .filter_map(|kind| -> Option<Arc<dyn PlaceProvider>> {
            match kind {
                ProviderKind::Google => config.google.clone().map(|c| {
                    Arc::new(GoogleProvider::new(client.clone(), c, config.candidate_limit))
                        as Arc<dyn PlaceProvider>
                }),
                ProviderKind::Foursquare => config.foursquare.clone().map(|c| {
                    Arc::new(FoursquareProvider::new(
                        client.clone(),
                        c,
                        config.candidate_limit,
                    )) as Arc<dyn PlaceProvider>
                }),
            }
        })
        .collect()
}
