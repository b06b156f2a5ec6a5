use async_trait::async_trait;
use serde::Deserialize;

use crate::error::FetchError;
use crate::fetch::auth::UrlParam;
use crate::fetch::{HttpClient, fetch_json};
use crate::services::{Coordinates, Geocoder};

pub const GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";

#[derive(Deserialize)]
struct GeoHit {
    lat: Option<f64>,
    lon: Option<f64>,
}

/// OpenWeather direct geocoding, authenticated with an `appid` parameter.
pub struct OpenWeatherGeocoder<C> {
    client: UrlParam<C>,
    base_url: String,
}

impl<C: HttpClient> OpenWeatherGeocoder<C> {
    pub fn new(inner: C, api_key: String) -> Self {
        Self {
            client: UrlParam::appid(inner, api_key),
            base_url: GEOCODING_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl<C: HttpClient> Geocoder for OpenWeatherGeocoder<C> {
    async fn locate(&self, query: &str) -> Result<Option<Coordinates>, FetchError> {
        let hits: Vec<GeoHit> = fetch_json(
            &self.client,
            &self.base_url,
            &[("q", query.to_string()), ("limit", "1".to_string())],
        )
        .await?;

        Ok(hits.into_iter().next().and_then(|hit| {
            Some(Coordinates {
                lat: hit.lat?,
                lon: hit.lon?,
            })
        }))
    }
}
