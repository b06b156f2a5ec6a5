//! Traits for the two external collaborators: a geocoder and a daily
//! historical-weather provider.

pub mod geocoding;
pub mod weather;

pub use geocoding::Geocoder;
pub use weather::WeatherSource;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}
