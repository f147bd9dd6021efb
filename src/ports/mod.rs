//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) the evaluation pipeline requires from
//! the outside world. Adapters implement these traits and are selected by
//! the caller when the evaluator is built.
//!
//! Port categories:
//! - `stats`: baseline, head-to-head, trailing form and split statistics
//! - `weather`: venue forecasts

pub mod stats;
pub mod weather;

use std::sync::Arc;

pub use stats::{
  BaselineSource, DateWindow, HomeAwaySplit, MatchupSample, MatchupSource, SplitSource,
  TrendSource,
};
pub use weather::{Forecast, ForecastSource};

/// The full set of providers an evaluator draws from.
#[derive(Clone)]
pub struct FactorSources {
  pub baseline: Arc<dyn BaselineSource>,
  pub matchup: Arc<dyn MatchupSource>,
  pub trend: Arc<dyn TrendSource>,
  pub splits: Arc<dyn SplitSource>,
  pub forecast: Arc<dyn ForecastSource>,
}

impl FactorSources {
  /// Use one adapter for every statistics port and a separate forecast source.
  pub fn from_stats<S>(stats: Arc<S>, forecast: Arc<dyn ForecastSource>) -> Self
  where
    S: BaselineSource + MatchupSource + TrendSource + SplitSource + 'static,
  {
    Self {
      baseline: stats.clone(),
      matchup: stats.clone(),
      trend: stats.clone(),
      splits: stats,
      forecast,
    }
  }
}

impl std::fmt::Debug for FactorSources {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FactorSources").finish_non_exhaustive()
  }
}
