//! Forecast Adapters
//!
//! - `open_meteo`: hourly forecast over HTTP from the Open-Meteo API

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;
