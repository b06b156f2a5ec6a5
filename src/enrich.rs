//! Turns a raw weather payload into yearly metrics for one location.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::EnrichmentError;
use crate::metrics::{AggregatedMetrics, DailySeries, MetricSpec, aggregate, daily_weather_spec};

/// Body of a daily historical-weather response.
///
/// `daily` maps each requested variable to one value per day. Values that
/// are not numbers (including the `time` array) read as missing samples.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherPayload {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub daily: Option<Map<String, Value>>,
}

/// Reads the named series out of a `daily` block. A variable missing from
/// the block, or not an array, becomes an empty series.
pub fn extract_series<'a>(
    daily: &Map<String, Value>,
    names: impl IntoIterator<Item = &'a str>,
) -> HashMap<String, DailySeries> {
    names
        .into_iter()
        .map(|name| {
            let series = daily
                .get(name)
                .and_then(Value::as_array)
                .map(|values| values.iter().map(Value::as_f64).collect())
                .unwrap_or_default();
            (name.to_string(), series)
        })
        .collect()
}

/// Aggregates a payload with the ten-variable daily weather spec.
pub fn enrich(payload: &WeatherPayload) -> Result<AggregatedMetrics, EnrichmentError> {
    enrich_with(payload, &daily_weather_spec())
}

/// Aggregates a payload with an explicit spec.
pub fn enrich_with(
    payload: &WeatherPayload,
    spec: &MetricSpec,
) -> Result<AggregatedMetrics, EnrichmentError> {
    let daily = payload
        .daily
        .as_ref()
        .ok_or(EnrichmentError::MissingDailyBlock)?;

    let series = extract_series(daily, spec.names());
    Ok(aggregate(&series, spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Reducer;
    use serde_json::json;

    fn payload(body: Value) -> WeatherPayload {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_missing_daily_block() {
        let p = payload(json!({ "latitude": 1.0, "longitude": 2.0 }));
        assert_eq!(enrich(&p), Err(EnrichmentError::MissingDailyBlock));
    }

    #[test]
    fn test_missing_series_treated_as_empty() {
        let p = payload(json!({
            "daily": {
                "time": ["2024-01-01", "2024-01-02"],
                "precipitation_sum": [1.5, null]
            }
        }));

        let metrics = enrich(&p).unwrap();
        assert_eq!(metrics.len(), 10);
        assert_eq!(metrics.value("precipitation_sum"), Some(1.5));
        assert!(metrics.contains("uv_index_max"));
        assert_eq!(metrics.value("uv_index_max"), None);
    }

    #[test]
    fn test_non_numeric_samples_are_missing() {
        let p = payload(json!({ "daily": { "t": [2.0, "n/a", 4.0, null] } }));
        let spec = MetricSpec::new().with("t", Reducer::Mean);
        assert_eq!(enrich_with(&p, &spec).unwrap().value("t"), Some(3.0));
    }

    #[test]
    fn test_synthetic_spec() {
        let p = payload(json!({
            "daily": { "a": [1.0, null, 3.0], "b": [1.0, 2.0, null] }
        }));
        let spec = MetricSpec::new()
            .with("a", Reducer::Mean)
            .with("b", Reducer::Sum);

        let metrics = enrich_with(&p, &spec).unwrap();
        assert_eq!(metrics.value("a"), Some(2.0));
        assert_eq!(metrics.value("b"), Some(3.0));
    }

    #[test]
    fn test_enrich_is_repeatable() {
        let p = payload(json!({
            "daily": {
                "temperature_2m_mean": [26.1, 27.3, null, 28.0],
                "sunshine_duration": [30000.0, 28000.5, 31000.25, null]
            }
        }));

        assert_eq!(enrich(&p).unwrap(), enrich(&p).unwrap());
    }

    #[test]
    fn test_extract_series_reads_nulls() {
        let daily = json!({ "x": [1.0, null, 2] });
        let series = extract_series(daily.as_object().unwrap(), ["x", "y"]);
        assert_eq!(series["x"], vec![Some(1.0), None, Some(2.0)]);
        assert!(series["y"].is_empty());
    }
}
