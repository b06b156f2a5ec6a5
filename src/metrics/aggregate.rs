use crate::metrics::types::{AggregatedMetrics, DailySeries, MetricSpec, Reducer};
use crate::metrics::utility::round_to_cents;
use std::collections::HashMap;

/// Reducer for each daily variable requested from the weather API.
/// Intensities are averaged over the year, amounts are totalled.
static DAILY_REDUCERS: &[(&str, Reducer)] = &[
    ("uv_index_max", Reducer::Mean),
    ("temperature_2m_mean", Reducer::Mean),
    ("cloud_cover_mean", Reducer::Mean),
    ("relative_humidity_2m_mean", Reducer::Mean),
    ("sunshine_duration", Reducer::Sum),
    ("precipitation_sum", Reducer::Sum),
    ("et0_fao_evapotranspiration", Reducer::Sum),
    ("temperature_2m_min", Reducer::Mean),
    ("temperature_2m_max", Reducer::Mean),
    ("shortwave_radiation_sum", Reducer::Sum),
];

/// The ten-variable spec used for district enrichment.
pub fn daily_weather_spec() -> MetricSpec {
    DAILY_REDUCERS
        .iter()
        .fold(MetricSpec::new(), |spec, (name, reducer)| {
            spec.with(*name, *reducer)
        })
}

/// Folds each series named in `spec` into one value rounded to 2 decimals.
///
/// Null samples are dropped before reducing. A series with no samples left
/// yields `None` for that variable. Rounding is applied after the mean, so a
/// mean can land up to 0.005 outside the sample range (`[0.125, 0.125]`
/// gives `0.13`). Series not named in `spec` are ignored,
/// and spec entries with no series are left out of the result.
pub fn aggregate(series: &HashMap<String, DailySeries>, spec: &MetricSpec) -> AggregatedMetrics {
    let mut metrics = AggregatedMetrics::default();

    for (name, reducer) in spec.iter() {
        let Some(samples) = series.get(name) else {
            continue;
        };

        let present: Vec<f64> = samples.iter().flatten().copied().collect();
        let value = reducer.apply(&present).map(round_to_cents);

        metrics.push(name, value);
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(entries: &[(&str, &[Option<f64>])]) -> HashMap<String, DailySeries> {
        entries
            .iter()
            .map(|(name, values)| (name.to_string(), values.to_vec()))
            .collect()
    }

    fn single(name: &str, reducer: Reducer) -> MetricSpec {
        MetricSpec::new().with(name, reducer)
    }

    #[test]
    fn test_mean_skips_nulls() {
        let input = series(&[("t", &[Some(1.0), None, Some(3.0)])]);
        let out = aggregate(&input, &single("t", Reducer::Mean));
        assert_eq!(out.value("t"), Some(2.0));
    }

    #[test]
    fn test_sum_skips_nulls() {
        let input = series(&[("p", &[Some(1.0), Some(2.0), None])]);
        let out = aggregate(&input, &single("p", Reducer::Sum));
        assert_eq!(out.value("p"), Some(3.0));
    }

    #[test]
    fn test_all_null_is_undefined() {
        let input = series(&[("p", &[None, None])]);
        let out = aggregate(&input, &single("p", Reducer::Sum));
        assert!(out.contains("p"));
        assert_eq!(out.value("p"), None);
    }

    #[test]
    fn test_empty_series_is_undefined() {
        let input = series(&[("t", &[])]);
        let out = aggregate(&input, &single("t", Reducer::Mean));
        assert!(out.contains("t"));
        assert_eq!(out.value("t"), None);
    }

    #[test]
    fn test_unknown_variables_ignored() {
        let input = series(&[("t", &[Some(1.0)]), ("time", &[Some(0.0)])]);
        let out = aggregate(&input, &single("t", Reducer::Mean));
        assert_eq!(out.len(), 1);
        assert!(!out.contains("time"));
    }

    #[test]
    fn test_spec_entry_without_series_is_omitted() {
        let input = series(&[("t", &[Some(1.0)])]);
        let spec = single("t", Reducer::Mean).with("p", Reducer::Sum);
        let out = aggregate(&input, &spec);
        assert_eq!(out.len(), 1);
        assert!(!out.contains("p"));
    }

    #[test]
    fn test_mean_within_sample_bounds() {
        let samples = [Some(12.3), None, Some(-4.1), Some(30.02), Some(7.77), None];
        let input = series(&[("t", &samples)]);
        let value = aggregate(&input, &single("t", Reducer::Mean))
            .value("t")
            .unwrap();
        assert!((-4.1..=30.02).contains(&value));
    }

    #[test]
    fn test_mean_rounding_may_leave_bounds_by_half_a_cent() {
        let input = series(&[("t", &[Some(0.125), Some(0.125)])]);
        let value = aggregate(&input, &single("t", Reducer::Mean))
            .value("t")
            .unwrap();
        assert_eq!(value, 0.13);
        assert!((value - 0.125).abs() <= 0.0051);
    }

    #[test]
    fn test_sum_order_independent() {
        let forward = [Some(0.1), Some(2.25), None, Some(13.4), Some(0.05)];
        let mut backward = forward;
        backward.reverse();
        let spec = single("p", Reducer::Sum);

        let a = aggregate(&series(&[("p", &forward)]), &spec);
        let b = aggregate(&series(&[("p", &backward)]), &spec);
        assert_eq!(a.value("p"), b.value("p"));
    }

    #[test]
    fn test_result_rounded_to_two_decimals() {
        let input = series(&[("t", &[Some(1.0), Some(1.0), Some(2.0)])]);
        let out = aggregate(&input, &single("t", Reducer::Mean));
        assert_eq!(out.value("t"), Some(1.33));
    }

    #[test]
    fn test_output_follows_spec_order() {
        let input = series(&[("b", &[Some(1.0)]), ("a", &[Some(2.0)])]);
        let spec = single("b", Reducer::Sum).with("a", Reducer::Sum);
        let out = aggregate(&input, &spec);
        let names: Vec<_> = out.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_daily_weather_spec_assignment() {
        let spec = daily_weather_spec();
        assert_eq!(spec.len(), 10);
        assert_eq!(spec.reducer("uv_index_max"), Some(Reducer::Mean));
        assert_eq!(spec.reducer("temperature_2m_max"), Some(Reducer::Mean));
        assert_eq!(spec.reducer("sunshine_duration"), Some(Reducer::Sum));
        assert_eq!(spec.reducer("shortwave_radiation_sum"), Some(Reducer::Sum));
        assert_eq!(spec.reducer("time"), None);
    }
}
