//! Trait for resolving district names to coordinates.

use crate::error::FetchError;
use crate::services::Coordinates;

/// Abstraction over a free-text geocoding provider.
#[async_trait::async_trait]
pub trait Geocoder {
    /// Returns the best match for `query`, or `None` when the provider has
    /// no result. An empty result is not an error.
    async fn locate(&self, query: &str) -> Result<Option<Coordinates>, FetchError>;
}

/// Builds the free-text query sent for one district.
pub fn district_query(district: &str, state: &str, country: &str) -> String {
    format!("{district}, {state}, {country}")
}
