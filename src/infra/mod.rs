//! Concrete clients for the geocoding and weather APIs.

pub mod open_meteo;
pub mod openweather;

pub use open_meteo::OpenMeteoClient;
pub use openweather::OpenWeatherGeocoder;
