//! Statistics Ports - Player Performance Data Interfaces
//!
//! Defines the traits the evaluator needs from statistics providers.
//! Every factor port answers `Ok(None)` when it has no data and `Err`
//! when the lookup itself failed; the evaluator treats both as a neutral
//! factor. Only the baseline port can signal a configuration defect.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::prop::{PlayerRole, PropCategory};
use crate::error::BaselineError;

/// Head-to-head sample between a batter and a pitcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchupSample {
  /// Plate appearances in the sample.
  pub plate_appearances: u32,
  /// Batting average over the sample.
  pub average: f64,
}

/// Season batting split by venue side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeAwaySplit {
  pub home_at_bats: u32,
  pub home_hits: u32,
  pub away_at_bats: u32,
  pub away_hits: u32,
}

impl HomeAwaySplit {
  pub fn home_average(&self) -> Option<f64> {
    ratio(self.home_hits, self.home_at_bats)
  }

  pub fn away_average(&self) -> Option<f64> {
    ratio(self.away_hits, self.away_at_bats)
  }
}

fn ratio(hits: u32, at_bats: u32) -> Option<f64> {
  (at_bats > 0).then(|| f64::from(hits) / f64::from(at_bats))
}

/// Inclusive calendar window ending on a game date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl DateWindow {
  /// Window covering the `days` days up to and including `end`.
  pub fn trailing(end: NaiveDate, days: u32) -> Self {
    Self {
      start: end - Duration::days(i64::from(days)),
      end,
    }
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date >= self.start && date <= self.end
  }
}

/// Season-long baseline statistic.
#[async_trait]
pub trait BaselineSource: Send + Sync {
  /// Baseline rate for `player` in `category`, already converted from the
  /// raw season statistic (see `BaselineStat::to_rate`).
  async fn baseline(
    &self,
    player: &str,
    category: PropCategory,
  ) -> Result<Option<f64>, BaselineError>;
}

/// Batter-versus-pitcher history.
#[async_trait]
pub trait MatchupSource: Send + Sync {
  async fn matchup(
    &self,
    batter: &str,
    pitcher: &str,
  ) -> anyhow::Result<Option<MatchupSample>>;
}

/// Trailing-window form.
#[async_trait]
pub trait TrendSource: Send + Sync {
  /// Rate for `player` over the window, in the same units as the baseline
  /// for the role (batting average for batters).
  async fn window_rate(
    &self,
    player: &str,
    role: PlayerRole,
    window: DateWindow,
  ) -> anyhow::Result<Option<f64>>;
}

/// Home/away batting splits.
#[async_trait]
pub trait SplitSource: Send + Sync {
  async fn home_away(&self, player: &str) -> anyhow::Result<Option<HomeAwaySplit>>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_trailing_window() {
    let end = NaiveDate::from_ymd_opt(2025, 7, 20).unwrap();
    let w = DateWindow::trailing(end, 5);
    assert_eq!(w.start, NaiveDate::from_ymd_opt(2025, 7, 15).unwrap());
    assert!(w.contains(end));
    assert!(w.contains(w.start));
    assert!(!w.contains(NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()));
  }

  #[test]
  fn test_split_averages() {
    let split = HomeAwaySplit {
      home_at_bats: 200,
      home_hits: 60,
      away_at_bats: 0,
      away_hits: 0,
    };
    assert_eq!(split.home_average(), Some(0.3));
    assert_eq!(split.away_average(), None);
  }
}
