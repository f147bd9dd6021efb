//! Prop Evaluator - Ordered Factor Composition Pipeline
//!
//! Turns a season baseline into a calibrated probability:
//! 1. Baseline rate for the category's season statistic
//! 2. Head-to-head blend (batters with a known opposing pitcher)
//! 3. Recent-trend multiplier (short window over long window)
//! 4. Home/away split multiplier
//! 5. Venue run and category park factors
//! 6. Umpire strikeout/walk factor, plus the informational over tendency
//! 7. Weather multiplier at the venue
//! 8. Side resolution and clamping
//! 9. Directional confidence
//!
//! Later factors compound on earlier ones, so the order is fixed in
//! `FactorStep::ORDER`. Every factor lookup is independently
//! fault-tolerant: absent, invalid or failed data degrades that factor
//! to neutral and is recorded in the explanation.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::config::PipelineConfig;
use crate::domain::evaluation::{clamp_probability, confidence, resolve_side, round_to};
use crate::domain::factor::{DegradeReason, Explanation, FactorKind, FactorResult, NEUTRAL};
use crate::domain::prop::{PlayerRole, PropRequest, UmpireStat};
use crate::domain::tables::{FactorTables, NEUTRAL_OVER_TENDENCY};
use crate::domain::weather::weather_multiplier;
use crate::domain::EvaluationResult;
use crate::error::{BaselineError, EvaluationError};
use crate::ports::{DateWindow, FactorSources};

/// Situational steps applied after the baseline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorStep {
  Matchup,
  RecentTrend,
  HomeAway,
  Venue,
  Umpire,
  Weather,
}

impl FactorStep {
  pub const ORDER: [Self; 6] = [
    Self::Matchup,
    Self::RecentTrend,
    Self::HomeAway,
    Self::Venue,
    Self::Umpire,
    Self::Weather,
  ];
}

/// Result of resolving one factor before it touches the running rate.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Resolved {
  Apply(FactorResult),
  Default {
    kind: FactorKind,
    value: f64,
    reason: DegradeReason,
  },
}

impl Resolved {
  const fn neutral(kind: FactorKind, reason: DegradeReason) -> Self {
    Self::Default {
      kind,
      value: NEUTRAL,
      reason,
    }
  }
}

/// Evaluation pipeline over injected providers and tables.
#[derive(Debug, Clone)]
pub struct PropEvaluator {
  sources: FactorSources,
  tables: Arc<FactorTables>,
  config: PipelineConfig,
}

impl PropEvaluator {
  pub fn new(sources: FactorSources, tables: Arc<FactorTables>, config: PipelineConfig) -> Self {
    Self {
      sources,
      tables,
      config,
    }
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  pub fn tables(&self) -> &FactorTables {
    &self.tables
  }

  /// Evaluate one prop.
  ///
  /// # Errors
  /// Fails only for a malformed request or when the baseline source
  /// reports that it cannot serve the category. Missing data never fails.
  #[instrument(
    skip(self, request),
    fields(player = %request.player, category = %request.category, side = %request.side)
  )]
  pub async fn evaluate(&self, request: &PropRequest) -> Result<EvaluationResult, EvaluationError> {
    validate_request(request)?;

    let mut explanation = Explanation::new();
    let mut rate = self.baseline(request, &mut explanation).await?;

    for step in FactorStep::ORDER {
      for resolved in self.run_step(step, request).await {
        match resolved {
          Resolved::Apply(factor) => {
            rate = factor.apply(rate);
            explanation.record_result(&factor);
          }
          Resolved::Default { kind, value, reason } => {
            debug!(factor = %kind, reason = reason.as_str(), "Factor defaulted");
            explanation.record_default(kind, value, reason);
          }
        }
      }
    }

    let unclamped = resolve_side(rate, request.side);
    let probability = clamp_probability(
      unclamped,
      self.config.probability_floor,
      self.config.probability_ceiling,
    );
    let confidence = confidence(probability);

    debug!(
      adjusted_rate = rate,
      probability = probability,
      confidence = confidence,
      degraded = explanation.degraded().count(),
      "Prop evaluated"
    );

    Ok(EvaluationResult {
      request: request.clone(),
      probability,
      confidence,
      adjusted_rate: rate,
      explanation,
    })
  }

  /// Step 1: season baseline. A missing baseline proceeds as 0.0.
  async fn baseline(
    &self,
    request: &PropRequest,
    explanation: &mut Explanation,
  ) -> Result<f64, EvaluationError> {
    let lookup = self
      .sources
      .baseline
      .baseline(&request.player, request.category)
      .await;

    let (rate, reason) = match lookup {
      Ok(Some(v)) if v.is_finite() && v >= 0.0 => (v, None),
      Ok(Some(v)) => {
        debug!(value = v, "Baseline value out of range");
        (0.0, Some(DegradeReason::Invalid))
      }
      Ok(None) => (0.0, Some(DegradeReason::Absent)),
      Err(BaselineError::Unsupported { category, reason }) => {
        return Err(EvaluationError::Configuration { category, reason });
      }
      Err(BaselineError::Unavailable(e)) => {
        warn!(error = %e, "Baseline lookup failed, using 0.0");
        (0.0, Some(DegradeReason::ProviderFailed))
      }
    };

    match reason {
      None => explanation.record_result(&FactorResult::multiplier(FactorKind::BaseRate, rate)),
      Some(reason) => explanation.record_default(FactorKind::BaseRate, rate, reason),
    }
    Ok(rate)
  }

  async fn run_step(&self, step: FactorStep, request: &PropRequest) -> Vec<Resolved> {
    match step {
      FactorStep::Matchup => self.matchup(request).await.into_iter().collect(),
      FactorStep::RecentTrend => vec![self.recent_trend(request).await],
      FactorStep::HomeAway => self.home_away(request).await.into_iter().collect(),
      FactorStep::Venue => self.venue(request),
      FactorStep::Umpire => self.umpire(request),
      FactorStep::Weather => self.weather(request).await.into_iter().collect(),
    }
  }

  /// Step 2: head-to-head blend, batters only, above the PA threshold.
  async fn matchup(&self, request: &PropRequest) -> Option<Resolved> {
    let pitcher = request.opposing_pitcher.as_deref()?;
    if request.role() != PlayerRole::Batter {
      return None;
    }

    let kind = FactorKind::Matchup;
    let resolved = match self.sources.matchup.matchup(&request.player, pitcher).await {
      Ok(Some(s)) if !(0.0..=1.0).contains(&s.average) => Resolved::Default {
        kind,
        value: 0.0,
        reason: DegradeReason::Invalid,
      },
      Ok(Some(s)) if s.plate_appearances < self.config.matchup_min_pa => Resolved::Default {
        kind,
        value: s.average,
        reason: DegradeReason::InsufficientSample,
      },
      Ok(Some(s)) => Resolved::Apply(FactorResult::blend(
        kind,
        s.average,
        self.config.matchup_weight,
      )),
      Ok(None) => Resolved::Default {
        kind,
        value: 0.0,
        reason: DegradeReason::Absent,
      },
      Err(e) => {
        warn!(error = %e, pitcher = pitcher, "Matchup lookup failed");
        Resolved::Default {
          kind,
          value: 0.0,
          reason: DegradeReason::ProviderFailed,
        }
      }
    };
    Some(resolved)
  }

  /// Step 3: short-window rate over long-window rate, rounded to 2 dp.
  async fn recent_trend(&self, request: &PropRequest) -> Resolved {
    let kind = FactorKind::RecentTrend;
    let role = request.role();
    let short = DateWindow::trailing(request.game_date, self.config.trend_short_days);
    let long = DateWindow::trailing(request.game_date, self.config.trend_long_days);

    let trend = &self.sources.trend;
    let short_rate = trend.window_rate(&request.player, role, short).await;
    let long_rate = trend.window_rate(&request.player, role, long).await;

    match (short_rate, long_rate) {
      (Err(e), _) | (_, Err(e)) => {
        warn!(error = %e, "Trend lookup failed");
        Resolved::neutral(kind, DegradeReason::ProviderFailed)
      }
      (Ok(Some(s)), Ok(Some(l))) => {
        if !s.is_finite() || !l.is_finite() || s < 0.0 || l <= 0.0 {
          return Resolved::neutral(kind, DegradeReason::Invalid);
        }
        Resolved::Apply(FactorResult::multiplier(kind, round_to(s / l, 2)))
      }
      _ => Resolved::neutral(kind, DegradeReason::Absent),
    }
  }

  /// Step 4: home/away batting split, both sides above the AB threshold.
  async fn home_away(&self, request: &PropRequest) -> Option<Resolved> {
    let is_home = request.is_home?;
    let kind = FactorKind::HomeAway;
    let min_ab = self.config.home_away_min_ab;

    let resolved = match self.sources.splits.home_away(&request.player).await {
      Ok(Some(split)) => {
        if split.home_hits > split.home_at_bats || split.away_hits > split.away_at_bats {
          Resolved::neutral(kind, DegradeReason::Invalid)
        } else if split.home_at_bats < min_ab || split.away_at_bats < min_ab {
          Resolved::neutral(kind, DegradeReason::InsufficientSample)
        } else {
          match (split.home_average(), split.away_average()) {
            (Some(home), Some(away)) if home > 0.0 && away > 0.0 => {
              let ratio = home / away;
              let value = if is_home { ratio } else { 1.0 / ratio };
              Resolved::Apply(FactorResult::multiplier(kind, value))
            }
            _ => Resolved::neutral(kind, DegradeReason::Invalid),
          }
        }
      }
      Ok(None) => Resolved::neutral(kind, DegradeReason::Absent),
      Err(e) => {
        warn!(error = %e, "Split lookup failed");
        Resolved::neutral(kind, DegradeReason::ProviderFailed)
      }
    };
    Some(resolved)
  }

  /// Step 5: run-environment factor, then the category park factor.
  fn venue(&self, request: &PropRequest) -> Vec<Resolved> {
    let Some(venue) = request.venue.as_deref() else {
      return Vec::new();
    };

    let run = self.tables.park_run_factor(venue).map_or(
      Resolved::neutral(FactorKind::ParkRun, DegradeReason::Unlisted),
      |f| Resolved::Apply(FactorResult::multiplier(FactorKind::ParkRun, f)),
    );
    let prop = self.tables.park_prop_factor(venue, request.category).map_or(
      Resolved::neutral(FactorKind::ParkProp, DegradeReason::Unlisted),
      |f| Resolved::Apply(FactorResult::multiplier(FactorKind::ParkProp, f)),
    );
    vec![run, prop]
  }

  /// Step 6: umpire factor for strikeout and walk props. The over
  /// tendency is recorded for any prop with a known umpire but never
  /// multiplied in.
  fn umpire(&self, request: &PropRequest) -> Vec<Resolved> {
    let Some(umpire) = request.umpire.as_deref() else {
      return Vec::new();
    };
    let tendency = self.tables.umpire(umpire);
    let mut steps = Vec::with_capacity(2);

    if let Some(stat) = request.category.umpire_stat() {
      let kind = match stat {
        UmpireStat::Strikeout => FactorKind::UmpireStrikeout,
        UmpireStat::Walk => FactorKind::UmpireWalk,
      };
      steps.push(tendency.and_then(|t| t.factor(stat)).map_or(
        Resolved::neutral(kind, DegradeReason::Unlisted),
        |f| Resolved::Apply(FactorResult::multiplier(kind, f)),
      ));
    }

    steps.push(tendency.and_then(|t| t.over_tendency).map_or(
      Resolved::Default {
        kind: FactorKind::UmpireOverTendency,
        value: NEUTRAL_OVER_TENDENCY,
        reason: DegradeReason::Unlisted,
      },
      |v| Resolved::Apply(FactorResult::informational(FactorKind::UmpireOverTendency, v)),
    ));
    steps
  }

  /// Step 7: forecast-driven multiplier. Skipped without a venue.
  async fn weather(&self, request: &PropRequest) -> Option<Resolved> {
    let venue = request.venue.as_deref()?;
    let kind = FactorKind::Weather;

    let Some(location) = self.tables.venue_location(venue) else {
      return Some(Resolved::neutral(kind, DegradeReason::Unlisted));
    };

    let resolved = match self.sources.forecast.forecast(location, request.game_date).await {
      Ok(Some(f)) => match weather_multiplier(f.temperature_c, f.wind_kmh) {
        Some(m) => Resolved::Apply(FactorResult::multiplier(kind, m)),
        None => Resolved::neutral(kind, DegradeReason::Invalid),
      },
      Ok(None) => Resolved::neutral(kind, DegradeReason::Absent),
      Err(e) => {
        warn!(error = %e, venue = venue, "Forecast lookup failed");
        Resolved::neutral(kind, DegradeReason::ProviderFailed)
      }
    };
    Some(resolved)
  }
}

fn validate_request(request: &PropRequest) -> Result<(), EvaluationError> {
  if request.player.trim().is_empty() {
    return Err(EvaluationError::InvalidRequest("empty player name".to_string()));
  }
  if !request.line.is_finite() || request.line < 0.0 {
    return Err(EvaluationError::InvalidRequest(format!(
      "line must be finite and non-negative, got {}",
      request.line
    )));
  }
  Ok(())
}
