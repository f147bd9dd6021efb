//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    top_k = config.optimizer.top_k,
    ceiling = config.optimizer.max_combinations,
    payout_tiers = config.optimizer.payouts.len(),
    table_overrides = !config.tables.is_empty(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A matchup blend weight inside [0, 1]
/// - Positive sample thresholds and a short window inside the long one
/// - An ordered probability band inside (0, 1)
/// - Sensible optimizer limits and payout tiers
pub fn validate_config(config: &AppConfig) -> Result<()> {
  let p = &config.pipeline;

  anyhow::ensure!(
    (0.0..=1.0).contains(&p.matchup_weight),
    "matchup_weight must be in [0, 1], got {}",
    p.matchup_weight
  );
  anyhow::ensure!(p.matchup_min_pa > 0, "matchup_min_pa must be positive");
  anyhow::ensure!(p.home_away_min_ab > 0, "home_away_min_ab must be positive");
  anyhow::ensure!(
    p.trend_short_days > 0 && p.trend_short_days < p.trend_long_days,
    "trend windows must satisfy 0 < short < long, got {} / {}",
    p.trend_short_days,
    p.trend_long_days
  );
  anyhow::ensure!(
    p.probability_floor > 0.0
      && p.probability_floor < p.probability_ceiling
      && p.probability_ceiling < 1.0,
    "probability band must satisfy 0 < floor < ceiling < 1, got [{}, {}]",
    p.probability_floor,
    p.probability_ceiling
  );

  let o = &config.optimizer;
  anyhow::ensure!(o.top_k > 0, "optimizer top_k must be positive");
  anyhow::ensure!(
    o.max_combinations > 0,
    "optimizer max_combinations must be positive"
  );
  for (i, tier) in o.payouts.iter().enumerate() {
    anyhow::ensure!(
      tier.legs >= 2,
      "Payout tier {} needs at least 2 legs, got {}",
      i,
      tier.legs
    );
    anyhow::ensure!(
      tier.multiplier.is_finite() && tier.multiplier > 0.0,
      "Payout tier {} multiplier must be positive, got {}",
      i,
      tier.multiplier
    );
  }

  anyhow::ensure!(
    config.engine.concurrency > 0,
    "engine concurrency must be positive"
  );
  anyhow::ensure!(
    config.weather.timeout_seconds > 0,
    "weather timeout_seconds must be positive"
  );

  for (venue, factor) in &config.tables.park_run {
    anyhow::ensure!(
      factor.is_finite() && *factor > 0.0,
      "Park factor for {} must be positive, got {}",
      venue,
      factor
    );
  }
  for (venue, by_category) in &config.tables.park_prop {
    for (category, factor) in by_category {
      anyhow::ensure!(
        factor.is_finite() && *factor > 0.0,
        "Park {} factor for {} must be positive, got {}",
        category,
        venue,
        factor
      );
    }
  }

  for (name, tendency) in &config.tables.umpires {
    for (field, value) in [("k_boost", tendency.k_boost), ("bb_suppress", tendency.bb_suppress)] {
      if let Some(v) = value {
        anyhow::ensure!(
          v.is_finite() && v > 0.0,
          "Umpire {} for {} must be positive, got {}",
          field,
          name,
          v
        );
      }
    }
    if let Some(v) = tendency.over_tendency {
      anyhow::ensure!(
        (0.0..=1.0).contains(&v),
        "Umpire over_tendency for {} must be in [0, 1], got {}",
        name,
        v
      );
    }
  }

  Ok(())
}
