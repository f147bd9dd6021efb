//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates configuration from `config.toml`. Every section
//! has defaults, so an empty file yields the stock pipeline. Lookup table
//! overrides live here too; nothing tunable is hardcoded in the usecases.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::domain::tables::TableOverrides;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Process identity and logging.
  #[serde(default)]
  pub engine: EngineConfig,
  /// Evaluation pipeline thresholds and weights.
  #[serde(default)]
  pub pipeline: PipelineConfig,
  /// Multi-leg optimizer limits and payout ladder.
  #[serde(default)]
  pub optimizer: OptimizerConfig,
  /// Forecast provider selection.
  #[serde(default)]
  pub weather: WeatherConfig,
  /// Metrics export.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Overrides merged over the built-in lookup tables.
  #[serde(default)]
  pub tables: TableOverrides,
}

/// Output format for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
  #[default]
  Json,
  Pretty,
}

/// Engine identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
  /// Human-readable name, logged at startup.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  #[serde(default)]
  pub log_format: LogFormat,
  /// Evaluations in flight at once during a batch.
  #[serde(default = "default_concurrency")]
  pub concurrency: usize,
}

/// Evaluation pipeline parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
  /// Minimum head-to-head plate appearances before blending.
  #[serde(default = "default_matchup_min_pa")]
  pub matchup_min_pa: u32,
  /// Weight given to the head-to-head rate; the baseline keeps the rest.
  #[serde(default = "default_matchup_weight")]
  pub matchup_weight: f64,
  /// Short form window (days).
  #[serde(default = "default_trend_short_days")]
  pub trend_short_days: u32,
  /// Long form window (days).
  #[serde(default = "default_trend_long_days")]
  pub trend_long_days: u32,
  /// Minimum at-bats on each side of the home/away split.
  #[serde(default = "default_home_away_min_ab")]
  pub home_away_min_ab: u32,
  #[serde(default = "default_probability_floor")]
  pub probability_floor: f64,
  #[serde(default = "default_probability_ceiling")]
  pub probability_ceiling: f64,
}

/// One rung of the payout ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutTier {
  /// Legs in the entry.
  pub legs: usize,
  /// Fixed payout multiplier for hitting every leg.
  pub multiplier: f64,
}

/// Multi-leg optimizer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
  /// Combos returned per request.
  #[serde(default = "default_top_k")]
  pub top_k: usize,
  /// Largest C(pool, legs) the optimizer will enumerate.
  #[serde(default = "default_max_combinations")]
  pub max_combinations: u64,
  /// Whether one player may fill more than one leg.
  #[serde(default = "default_true")]
  pub allow_same_player: bool,
  /// Entries scored for each batch.
  #[serde(default = "default_payouts")]
  pub payouts: Vec<PayoutTier>,
}

/// Forecast provider choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherProvider {
  #[default]
  OpenMeteo,
  #[serde(alias = "none")]
  Disabled,
}

/// Forecast configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
  #[serde(default)]
  pub provider: WeatherProvider,
  /// Forecast API endpoint.
  #[serde(default = "default_weather_url")]
  pub base_url: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
  /// Where to write a Prometheus text snapshot after a batch.
  #[serde(default)]
  pub export_path: Option<String>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      log_format: LogFormat::default(),
      concurrency: default_concurrency(),
    }
  }
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      matchup_min_pa: default_matchup_min_pa(),
      matchup_weight: default_matchup_weight(),
      trend_short_days: default_trend_short_days(),
      trend_long_days: default_trend_long_days(),
      home_away_min_ab: default_home_away_min_ab(),
      probability_floor: default_probability_floor(),
      probability_ceiling: default_probability_ceiling(),
    }
  }
}

impl Default for OptimizerConfig {
  fn default() -> Self {
    Self {
      top_k: default_top_k(),
      max_combinations: default_max_combinations(),
      allow_same_player: true,
      payouts: default_payouts(),
    }
  }
}

impl Default for WeatherConfig {
  fn default() -> Self {
    Self {
      provider: WeatherProvider::default(),
      base_url: default_weather_url(),
      timeout_seconds: default_timeout(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "prop-edge".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_concurrency() -> usize {
  8
}

fn default_true() -> bool {
  true
}

fn default_matchup_min_pa() -> u32 {
  5
}

fn default_matchup_weight() -> f64 {
  0.3
}

fn default_trend_short_days() -> u32 {
  5
}

fn default_trend_long_days() -> u32 {
  15
}

fn default_home_away_min_ab() -> u32 {
  30
}

fn default_probability_floor() -> f64 {
  0.01
}

fn default_probability_ceiling() -> f64 {
  0.99
}

fn default_top_k() -> usize {
  5
}

fn default_max_combinations() -> u64 {
  2_000_000
}

fn default_payouts() -> Vec<PayoutTier> {
  vec![
    PayoutTier { legs: 2, multiplier: 3.0 },
    PayoutTier { legs: 3, multiplier: 5.0 },
    PayoutTier { legs: 5, multiplier: 10.0 },
  ]
}

fn default_weather_url() -> String {
  "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timeout() -> u64 {
  10
}
