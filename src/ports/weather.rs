//! Weather Port - Venue Forecast Interface

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::tables::VenueLocation;

/// Forecast conditions at a venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
  /// Air temperature in °C.
  pub temperature_c: f64,
  /// Wind speed in km/h.
  pub wind_kmh: f64,
}

/// Forecast provider for a venue location.
#[async_trait]
pub trait ForecastSource: Send + Sync {
  async fn forecast(
    &self,
    location: VenueLocation,
    date: NaiveDate,
  ) -> anyhow::Result<Option<Forecast>>;
}
