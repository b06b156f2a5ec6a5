//! Run configuration that is not a CLI flag on its own: the metric spec file
//! and the weather request window.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::metrics::{MetricSpec, Reducer};

/// Default weather model requested from the provider.
pub const DEFAULT_MODEL: &str = "best_match";

/// Loads a [`MetricSpec`] from a JSON file.
///
/// The file is a single object mapping variable names to reducers, in
/// output column order:
/// ```json
/// {
///   "temperature_2m_mean": "mean",
///   "precipitation_sum": "sum"
/// }
/// ```
pub fn load_metric_spec(path: &str) -> Result<MetricSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read metric spec '{path}'"))?;
    parse_metric_spec(&content).with_context(|| format!("invalid metric spec '{path}'"))
}

pub fn parse_metric_spec(content: &str) -> Result<MetricSpec> {
    let entries: Map<String, Value> = serde_json::from_str(content)?;
    if entries.is_empty() {
        return Err(anyhow!("metric spec has no entries"));
    }

    let mut spec = MetricSpec::new();
    for (name, value) in entries {
        let reducer: Reducer = serde_json::from_value(value)
            .with_context(|| format!("unknown reducer for '{name}'"))?;
        spec.insert(name, reducer);
    }
    Ok(spec)
}

/// The calendar window and model for daily weather requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub model: String,
}

impl WeatherQuery {
    /// January 1st through December 31st of `year`.
    pub fn calendar_year(year: i32) -> Result<Self> {
        let start_date = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| anyhow!("year {year} out of range"))?;
        let end_date = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| anyhow!("year {year} out of range"))?;
        Ok(Self {
            start_date,
            end_date,
            model: DEFAULT_MODEL.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_file_order() {
        let spec = parse_metric_spec(r#"{"z": "sum", "a": "mean", "m": "sum"}"#).unwrap();
        assert_eq!(spec.names().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(spec.reducer("a"), Some(Reducer::Mean));
    }

    #[test]
    fn test_parse_rejects_unknown_reducer() {
        assert!(parse_metric_spec(r#"{"a": "median"}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(parse_metric_spec("{}").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_metric_spec("/nonexistent/metrics.json").is_err());
    }

    #[test]
    fn test_calendar_year_window() {
        let q = WeatherQuery::calendar_year(2024).unwrap();
        assert_eq!(q.start_date.to_string(), "2024-01-01");
        assert_eq!(q.end_date.to_string(), "2024-12-31");
        assert_eq!(q.model, "best_match");
    }
}
