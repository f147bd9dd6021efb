//! Combo Optimizer - Exhaustive Multi-Leg Search
//!
//! Scores every n-leg subset of an evaluated pool under a fixed payout
//! multiplier:
//!
//!   edge = m * p_1 * p_2 * ... * p_n - 1
//!
//! Legs are treated as independent. Same-game or same-team correlation is
//! not modelled, so edges on correlated legs are optimistic.
//!
//! Subsets are enumerated lexicographically and kept in a bounded top-k
//! list; a candidate only displaces entries with a strictly lower edge,
//! so ties keep pool order.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::OptimizerConfig;
use crate::domain::combinatorics::{n_choose_k, Combinations};
use crate::domain::EvaluationResult;
use crate::error::OptimizerError;

/// One ranked subset of the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboCandidate {
  /// Pool positions of the legs, ascending.
  pub indices: Vec<usize>,
  /// Short labels of the legs, in the same order.
  pub labels: Vec<String>,
  /// Product of the leg probabilities.
  pub joint_probability: f64,
  /// Expected net return per unit staked.
  pub expected_edge: f64,
}

/// Outcome of one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboSearch {
  pub legs: usize,
  pub payout_multiplier: f64,
  /// Per-leg probability needed to break even.
  pub breakeven: f64,
  /// Subsets enumerated.
  pub considered: u64,
  /// Subsets skipped for repeating a player.
  pub skipped: u64,
  /// Best subsets, highest edge first.
  pub top: Vec<ComboCandidate>,
}

/// Per-leg probability at which an n-leg entry paying `m` breaks even.
pub fn breakeven_probability(legs: usize, payout_multiplier: f64) -> f64 {
  let n = f64::from(u32::try_from(legs).unwrap_or(u32::MAX));
  (1.0 / payout_multiplier).powf(1.0 / n)
}

/// Stateless search over evaluated props.
#[derive(Debug, Clone)]
pub struct ComboOptimizer {
  top_k: usize,
  max_combinations: u64,
  allow_same_player: bool,
}

impl ComboOptimizer {
  pub fn new(top_k: usize, max_combinations: u64) -> Self {
    Self {
      top_k,
      max_combinations,
      allow_same_player: true,
    }
  }

  pub fn from_config(config: &OptimizerConfig) -> Self {
    Self::new(config.top_k, config.max_combinations).allow_same_player(config.allow_same_player)
  }

  #[must_use]
  pub fn allow_same_player(mut self, allow: bool) -> Self {
    self.allow_same_player = allow;
    self
  }

  /// Best `top_k` subsets of `legs` props from `pool`.
  ///
  /// # Errors
  /// Rejects fewer than two legs, a non-positive multiplier, and pools
  /// whose subset count exceeds the configured ceiling. Nothing is
  /// enumerated in the error cases.
  pub fn top_combos(
    &self,
    pool: &[EvaluationResult],
    legs: usize,
    payout_multiplier: f64,
  ) -> Result<Vec<ComboCandidate>, OptimizerError> {
    self.search(pool, legs, payout_multiplier).map(|s| s.top)
  }

  /// Like `top_combos`, with search counters.
  ///
  /// # Errors
  /// See `top_combos`.
  #[instrument(skip(self, pool), fields(pool = pool.len()))]
  pub fn search(
    &self,
    pool: &[EvaluationResult],
    legs: usize,
    payout_multiplier: f64,
  ) -> Result<ComboSearch, OptimizerError> {
    if legs < 2 {
      return Err(OptimizerError::InvalidLegCount(legs));
    }
    if !payout_multiplier.is_finite() || payout_multiplier <= 0.0 {
      return Err(OptimizerError::InvalidPayout(payout_multiplier));
    }

    let combinations = n_choose_k(pool.len(), legs);
    if combinations > self.max_combinations {
      return Err(OptimizerError::PoolTooLarge {
        pool: pool.len(),
        legs,
        combinations,
        ceiling: self.max_combinations,
      });
    }

    let players: Vec<String> = pool
      .iter()
      .map(|r| r.request.player.trim().to_lowercase())
      .collect();

    let mut top: Vec<(f64, f64, Vec<usize>)> = Vec::with_capacity(self.top_k + 1);
    let mut considered = 0u64;
    let mut skipped = 0u64;

    for indices in Combinations::new(pool.len(), legs) {
      considered += 1;

      if !self.allow_same_player && repeats_player(&players, &indices) {
        skipped += 1;
        continue;
      }

      let joint: f64 = indices.iter().map(|&i| pool[i].probability).product();
      let edge = payout_multiplier * joint - 1.0;

      let pos = top.partition_point(|(e, _, _)| *e >= edge);
      if pos < self.top_k {
        top.insert(pos, (edge, joint, indices));
        top.truncate(self.top_k);
      }
    }

    debug!(
      legs = legs,
      considered = considered,
      skipped = skipped,
      best_edge = top.first().map(|(e, _, _)| *e),
      "Combo search complete"
    );

    let top = top
      .into_iter()
      .map(|(expected_edge, joint_probability, indices)| ComboCandidate {
        labels: indices.iter().map(|&i| pool[i].request.label()).collect(),
        indices,
        joint_probability,
        expected_edge,
      })
      .collect();

    Ok(ComboSearch {
      legs,
      payout_multiplier,
      breakeven: breakeven_probability(legs, payout_multiplier),
      considered,
      skipped,
      top,
    })
  }
}

fn repeats_player(players: &[String], indices: &[usize]) -> bool {
  indices
    .iter()
    .enumerate()
    .any(|(a, &i)| indices[a + 1..].iter().any(|&j| players[i] == players[j]))
}
