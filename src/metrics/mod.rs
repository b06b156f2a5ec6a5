//! Yearly aggregation of daily weather series.
//!
//! A [`MetricSpec`] assigns each daily variable a [`Reducer`]; [`aggregate`]
//! folds every matching series into one rounded value, skipping nulls.

pub mod aggregate;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate, daily_weather_spec};
pub use types::{AggregatedMetrics, DailySeries, MetricSpec, Reducer};
pub use utility::round_to_cents;
