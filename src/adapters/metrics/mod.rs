//! Metrics Adapters
//!
//! Prometheus registry for evaluation and optimizer counters. The binary
//! writes a text snapshot after each batch when an export path is set.

pub mod prometheus;

pub use self::prometheus::EvaluationMetrics;
