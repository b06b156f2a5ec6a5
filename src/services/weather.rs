//! Trait for fetching a year of daily observations at a coordinate.

use crate::enrich::WeatherPayload;
use crate::error::FetchError;
use crate::services::Coordinates;

/// Abstraction over a daily historical-weather provider.
#[async_trait::async_trait]
pub trait WeatherSource {
    /// Fetches the daily series for the configured date range at `at`.
    async fn daily(&self, at: Coordinates) -> Result<WeatherPayload, FetchError>;
}
