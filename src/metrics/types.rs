//! Data types used by the aggregation step.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::metrics::utility::{mean, sum};

/// One calendar year of optional daily samples for a single variable.
pub type DailySeries = Vec<Option<f64>>;

/// How a daily series is folded into a yearly value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Mean,
    Sum,
}

impl Reducer {
    /// Applies the reducer to already-filtered samples.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        match self {
            Reducer::Mean => mean(values),
            Reducer::Sum => sum(values),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Reducer::Mean => "avg",
            Reducer::Sum => "total",
        }
    }
}

/// Ordered mapping of variable name to reducer.
///
/// Each name appears at most once; inserting an existing name replaces its
/// reducer in place. The order is the output column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricSpec {
    entries: Vec<(String, Reducer)>,
}

impl MetricSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MetricSpec::insert`].
    pub fn with(mut self, name: impl Into<String>, reducer: Reducer) -> Self {
        self.insert(name, reducer);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, reducer: Reducer) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = reducer,
            None => self.entries.push((name, reducer)),
        }
    }

    pub fn reducer(&self, name: &str) -> Option<Reducer> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| *r)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.reducer(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Reducer)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), *r))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Yearly value per variable, in [`MetricSpec`] order.
///
/// `None` marks a variable whose series was empty or entirely null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedMetrics {
    values: Vec<(String, Option<f64>)>,
}

impl AggregatedMetrics {
    pub(crate) fn push(&mut self, name: &str, value: Option<f64>) {
        self.values.push((name.to_string(), value));
    }

    /// Value for `name`, `None` when absent or undefined.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| *v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for AggregatedMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_existing_entry() {
        let spec = MetricSpec::new()
            .with("a", Reducer::Mean)
            .with("b", Reducer::Sum)
            .with("a", Reducer::Sum);

        assert_eq!(spec.len(), 2);
        assert_eq!(spec.reducer("a"), Some(Reducer::Sum));
        assert_eq!(spec.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_reducer_deserializes_lowercase() {
        let r: Reducer = serde_json::from_str("\"sum\"").unwrap();
        assert_eq!(r, Reducer::Sum);
        assert!(serde_json::from_str::<Reducer>("\"median\"").is_err());
    }

    #[test]
    fn test_metrics_serialize_in_order_with_nulls() {
        let mut metrics = AggregatedMetrics::default();
        metrics.push("b", Some(1.5));
        metrics.push("a", None);

        let json = serde_json::to_string(&metrics).unwrap();
        assert_eq!(json, r#"{"b":1.5,"a":null}"#);
    }
}
