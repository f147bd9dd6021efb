//! Prometheus Metrics Registry - Evaluation Observability
//!
//! Counts evaluations, degraded factors and scored combinations, and
//! tracks the distribution of final probabilities. Rendered to the
//! Prometheus text format for scraping or a file snapshot.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::domain::prop::PropCategory;
use crate::domain::{EvaluationResult, FactorOutcome};

/// Centralized Prometheus metrics for the evaluation engine.
///
/// All metrics follow the naming convention `prop_edge_*`.
pub struct EvaluationMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Evaluations by category and outcome (ok, error).
    pub evaluations: IntCounterVec,
    /// Factors that fell back to a default, by factor and reason.
    pub factor_degraded: IntCounterVec,
    /// Subsets enumerated by the optimizer, by leg count.
    pub combos_scored: IntCounterVec,
    /// Final probabilities of successful evaluations.
    pub probability: Histogram,
}

impl EvaluationMetrics {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let evaluations = IntCounterVec::new(
            Opts::new("prop_edge_evaluations_total", "Prop evaluations attempted"),
            &["category", "outcome"],
        )?;

        let factor_degraded = IntCounterVec::new(
            Opts::new(
                "prop_edge_factor_degraded_total",
                "Factors that fell back to a default value",
            ),
            &["factor", "reason"],
        )?;

        let combos_scored = IntCounterVec::new(
            Opts::new(
                "prop_edge_combos_scored_total",
                "Multi-leg subsets enumerated by the optimizer",
            ),
            &["legs"],
        )?;

        let probability = Histogram::with_opts(
            HistogramOpts::new(
                "prop_edge_probability",
                "Final clamped probability per evaluation",
            )
            .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.45, 0.5, 0.55, 0.6, 0.65, 0.7, 0.8, 0.9]),
        )?;

        // Register all metrics
        registry.register(Box::new(evaluations.clone()))?;
        registry.register(Box::new(factor_degraded.clone()))?;
        registry.register(Box::new(combos_scored.clone()))?;
        registry.register(Box::new(probability.clone()))?;

        Ok(Self {
            registry,
            evaluations,
            factor_degraded,
            combos_scored,
            probability,
        })
    }

    /// Record a successful evaluation and its degraded factors.
    pub fn record_evaluation(&self, result: &EvaluationResult) {
        self.evaluations
            .with_label_values(&[result.request.category.key(), "ok"])
            .inc();
        self.probability.observe(result.probability);
        for entry in result.explanation.degraded() {
            if let FactorOutcome::Defaulted { reason, .. } = entry.outcome {
                self.factor_degraded
                    .with_label_values(&[entry.factor.name(), reason.as_str()])
                    .inc();
            }
        }
    }

    pub fn record_failure(&self, category: PropCategory) {
        self.evaluations
            .with_label_values(&[category.key(), "error"])
            .inc();
    }

    pub fn record_combos(&self, legs: usize, considered: u64) {
        let legs = legs.to_string();
        self.combos_scored
            .with_label_values(&[legs.as_str()])
            .inc_by(considered);
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl std::fmt::Debug for EvaluationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationMetrics").finish_non_exhaustive()
    }
}
