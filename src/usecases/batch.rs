//! Batch Runner - Slate Evaluation and Combo Ranking
//!
//! Evaluates a slate of requests concurrently (order preserved), then
//! ranks multi-leg entries for every configured payout tier. A failed
//! request is reported and skipped; it never aborts the batch.

use std::sync::Arc;

use futures_util::{stream, StreamExt};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::adapters::metrics::EvaluationMetrics;
use crate::config::PayoutTier;
use crate::domain::evaluation::{Recommendation, Tier};
use crate::domain::prop::PropRequest;
use crate::domain::EvaluationResult;

use super::evaluator::PropEvaluator;
use super::optimizer::{ComboOptimizer, ComboSearch};

/// One evaluation with its slate-level classification.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedProp {
  pub index: usize,
  #[serde(flatten)]
  pub result: EvaluationResult,
  pub tier: Tier,
  pub recommendation: Recommendation,
  /// Edge of an entry made only of legs like this one, at the first payout tier.
  pub value_edge: Option<f64>,
}

/// A request that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
  pub index: usize,
  pub player: String,
  pub reason: String,
}

/// A payout tier the optimizer refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTier {
  pub tier: PayoutTier,
  pub reason: String,
}

/// Everything produced for one slate.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
  pub evaluations: Vec<EvaluatedProp>,
  pub failures: Vec<BatchFailure>,
  pub combos: Vec<ComboSearch>,
  pub skipped_tiers: Vec<SkippedTier>,
}

/// Runs slates through the evaluator and optimizer.
#[derive(Debug, Clone)]
pub struct BatchRunner {
  evaluator: Arc<PropEvaluator>,
  optimizer: ComboOptimizer,
  payouts: Vec<PayoutTier>,
  concurrency: usize,
  metrics: Option<Arc<EvaluationMetrics>>,
}

impl BatchRunner {
  pub fn new(
    evaluator: Arc<PropEvaluator>,
    optimizer: ComboOptimizer,
    payouts: Vec<PayoutTier>,
    concurrency: usize,
  ) -> Self {
    Self {
      evaluator,
      optimizer,
      payouts,
      concurrency: concurrency.max(1),
      metrics: None,
    }
  }

  #[must_use]
  pub fn with_metrics(mut self, metrics: Arc<EvaluationMetrics>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  /// Evaluate every request, then search each payout tier.
  #[instrument(skip(self, requests), fields(requests = requests.len()))]
  pub async fn run(&self, requests: &[PropRequest]) -> BatchReport {
    let evaluator = &self.evaluator;
    let outcomes: Vec<_> = stream::iter(requests.iter().enumerate())
      .map(|(index, request)| async move { (index, request, evaluator.evaluate(request).await) })
      .buffered(self.concurrency)
      .collect()
      .await;

    let mut pool = Vec::with_capacity(requests.len());
    let mut positions = Vec::with_capacity(requests.len());
    let mut failures = Vec::new();

    for (index, request, outcome) in outcomes {
      match outcome {
        Ok(result) => {
          if let Some(m) = &self.metrics {
            m.record_evaluation(&result);
          }
          positions.push(index);
          pool.push(result);
        }
        Err(e) => {
          warn!(index = index, player = %request.player, error = %e, "Evaluation failed");
          if let Some(m) = &self.metrics {
            m.record_failure(request.category);
          }
          failures.push(BatchFailure {
            index,
            player: request.player.clone(),
            reason: e.to_string(),
          });
        }
      }
    }

    let mut combos = Vec::with_capacity(self.payouts.len());
    let mut skipped_tiers = Vec::new();
    for tier in &self.payouts {
      match self.optimizer.search(&pool, tier.legs, tier.multiplier) {
        Ok(search) => {
          if let Some(m) = &self.metrics {
            m.record_combos(tier.legs, search.considered);
          }
          combos.push(search);
        }
        Err(e) => {
          warn!(legs = tier.legs, error = %e, "Payout tier skipped");
          skipped_tiers.push(SkippedTier {
            tier: *tier,
            reason: e.to_string(),
          });
        }
      }
    }

    let edge_tier = self.payouts.first().copied();
    let evaluations: Vec<EvaluatedProp> = pool
      .into_iter()
      .zip(positions)
      .map(|(result, index)| EvaluatedProp {
        index,
        tier: result.tier(),
        recommendation: result.recommendation(),
        value_edge: edge_tier.and_then(|t| {
          u32::try_from(t.legs)
            .ok()
            .map(|legs| result.value_edge(legs, t.multiplier))
        }),
        result,
      })
      .collect();

    info!(
      evaluated = evaluations.len(),
      failed = failures.len(),
      tiers = combos.len(),
      "Batch complete"
    );

    BatchReport {
      evaluations,
      failures,
      combos,
      skipped_tiers,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::sample::{NoData, SampleStats};
  use crate::config::PipelineConfig;
  use crate::domain::prop::{BaselineStat, PropCategory, Side};
  use crate::domain::tables::FactorTables;
  use crate::ports::FactorSources;
  use chrono::NaiveDate;

  fn runner(payouts: Vec<PayoutTier>, ceiling: u64) -> BatchRunner {
    let stats = SampleStats::default()
      .with_season_stat("A", BaselineStat::BattingAverage, 0.80)
      .with_season_stat("B", BaselineStat::BattingAverage, 0.60)
      .with_season_stat("C", BaselineStat::BattingAverage, 0.50);
    let sources = FactorSources::from_stats(Arc::new(stats), Arc::new(NoData));
    let evaluator = PropEvaluator::new(
      sources,
      Arc::new(FactorTables::default()),
      PipelineConfig::default(),
    );
    BatchRunner::new(
      Arc::new(evaluator),
      ComboOptimizer::new(5, ceiling),
      payouts,
      4,
    )
  }

  fn request(player: &str) -> PropRequest {
    let date = NaiveDate::from_ymd_opt(2025, 7, 20).unwrap();
    PropRequest::new(player, PropCategory::Hits, 0.5, Side::Over, date)
  }

  #[tokio::test]
  async fn test_batch_skips_failures_and_keeps_order() {
    let runner = runner(vec![PayoutTier { legs: 2, multiplier: 3.0 }], 1_000);
    let requests = vec![request("A"), request(""), request("B"), request("C")];
    let report = runner.run(&requests).await;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    let indices: Vec<usize> = report.evaluations.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![0, 2, 3]);
    assert_eq!(report.evaluations[0].tier, Tier::Top);
    assert_eq!(report.evaluations[2].recommendation, Recommendation::Pass);

    let search = &report.combos[0];
    assert_eq!(search.considered, 3);
    assert_eq!(search.top[0].labels, vec!["A hits over 0.5", "B hits over 0.5"]);
    assert!((search.top[0].expected_edge - 0.44).abs() < 1e-12);
  }

  #[tokio::test]
  async fn test_oversized_tier_is_skipped() {
    let runner = runner(
      vec![
        PayoutTier { legs: 2, multiplier: 3.0 },
        PayoutTier { legs: 3, multiplier: 5.0 },
      ],
      2,
    );
    // C(3, 2) = 3 is over the ceiling, C(3, 3) = 1 is not.
    let report = runner.run(&[request("A"), request("B"), request("C")]).await;
    assert_eq!(report.skipped_tiers.len(), 1);
    assert_eq!(report.skipped_tiers[0].tier.legs, 2);
    assert_eq!(report.combos.len(), 1);
    assert_eq!(report.combos[0].legs, 3);
    assert_eq!(report.combos[0].top[0].indices, vec![0, 1, 2]);
  }

  #[tokio::test]
  async fn test_value_edge_uses_first_tier() {
    let runner = runner(vec![PayoutTier { legs: 2, multiplier: 3.0 }], 1_000);
    let report = runner.run(&[request("B")]).await;
    let edge = report.evaluations[0].value_edge.unwrap();
    assert!((edge - (3.0 * 0.36 - 1.0)).abs() < 1e-12);
  }
}
