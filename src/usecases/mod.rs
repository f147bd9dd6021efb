//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces. Each use case is a
//! self-contained operation.
//!
//! Use cases:
//! - `PropEvaluator`: ordered factor pipeline for a single prop
//! - `ComboOptimizer`: exhaustive multi-leg ranking under a fixed payout
//! - `BatchRunner`: slate evaluation plus combos per payout tier

pub mod batch;
pub mod evaluator;
pub mod optimizer;

pub use batch::{BatchFailure, BatchReport, BatchRunner, EvaluatedProp, SkippedTier};
pub use evaluator::{FactorStep, PropEvaluator};
pub use optimizer::{breakeven_probability, ComboCandidate, ComboOptimizer, ComboSearch};
