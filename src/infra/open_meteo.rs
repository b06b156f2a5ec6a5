use async_trait::async_trait;

use crate::config::WeatherQuery;
use crate::enrich::WeatherPayload;
use crate::error::FetchError;
use crate::fetch::{HttpClient, fetch_json};
use crate::metrics::MetricSpec;
use crate::services::{Coordinates, WeatherSource};

pub const HISTORICAL_FORECAST_URL: &str =
    "https://historical-forecast-api.open-meteo.com/v1/forecast";

/// Open-Meteo historical forecast API, daily resolution.
///
/// Requests exactly the variables named in the metric spec over the query
/// window.
pub struct OpenMeteoClient<C> {
    client: C,
    base_url: String,
    query: WeatherQuery,
    variables: String,
}

impl<C: HttpClient> OpenMeteoClient<C> {
    pub fn new(client: C, query: WeatherQuery, spec: &MetricSpec) -> Self {
        Self {
            client,
            base_url: HISTORICAL_FORECAST_URL.to_string(),
            query,
            variables: spec.names().collect::<Vec<_>>().join(","),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn params(&self, at: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", at.lat.to_string()),
            ("longitude", at.lon.to_string()),
            ("start_date", self.query.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", self.query.end_date.format("%Y-%m-%d").to_string()),
            ("daily", self.variables.clone()),
            ("models", self.query.model.clone()),
        ]
    }
}

#[async_trait]
impl<C: HttpClient> WeatherSource for OpenMeteoClient<C> {
    async fn daily(&self, at: Coordinates) -> Result<WeatherPayload, FetchError> {
        fetch_json(&self.client, &self.base_url, &self.params(at)).await
    }
}
