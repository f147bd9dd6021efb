//! Open-Meteo Client - Venue Forecast over HTTP
//!
//! Requests hourly 2 m temperature (°C) and 10 m wind speed (km/h) for the
//! venue coordinates on the game date and reports the first hour with both
//! values present. Missing series map to "no forecast".

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::WeatherConfig;
use crate::domain::tables::VenueLocation;
use crate::ports::{Forecast, ForecastSource};

#[derive(Debug, Deserialize)]
struct ForecastResponse {
  #[serde(default)]
  hourly: Option<HourlySeries>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlySeries {
  #[serde(default)]
  temperature_2m: Vec<Option<f64>>,
  #[serde(default)]
  wind_speed_10m: Vec<Option<f64>>,
}

impl ForecastResponse {
  fn first_hour(&self) -> Option<Forecast> {
    let hourly = self.hourly.as_ref()?;
    hourly
      .temperature_2m
      .iter()
      .zip(&hourly.wind_speed_10m)
      .find_map(|(t, w)| match (t, w) {
        (Some(t), Some(w)) => Some(Forecast {
          temperature_c: *t,
          wind_kmh: *w,
        }),
        _ => None,
      })
  }
}

/// HTTP forecast source backed by Open-Meteo.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
  /// Underlying HTTP client.
  http: Client,
  /// Forecast endpoint.
  base_url: String,
}

impl OpenMeteoClient {
  /// Build a client with the configured endpoint and timeout.
  pub fn new(config: &WeatherConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(config.timeout_seconds))
      .pool_max_idle_per_host(2)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self {
      http,
      base_url: config.base_url.clone(),
    })
  }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
  #[instrument(skip(self), fields(lat = location.latitude, lon = location.longitude))]
  async fn forecast(&self, location: VenueLocation, date: NaiveDate) -> Result<Option<Forecast>> {
    let day = date.format("%Y-%m-%d").to_string();
    let response = self
      .http
      .get(&self.base_url)
      .query(&[
        ("latitude", location.latitude.to_string()),
        ("longitude", location.longitude.to_string()),
        ("hourly", "temperature_2m,wind_speed_10m".to_string()),
        ("start_date", day.clone()),
        ("end_date", day),
        ("timezone", "auto".to_string()),
      ])
      .send()
      .await
      .context("Forecast request failed")?
      .error_for_status()
      .context("Forecast request rejected")?;

    let body: ForecastResponse = response
      .json()
      .await
      .context("Failed to decode forecast response")?;

    let forecast = body.first_hour();
    debug!(?forecast, "Forecast fetched");
    Ok(forecast)
  }
}
