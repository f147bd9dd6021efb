//! Domain layer - Core evaluation types and math.
//!
//! Pure logic with no I/O: prop requests, factor results and the
//! explanation trail, final probability resolution, static lookup tables
//! and subset enumeration. Everything here is testable in isolation.

pub mod combinatorics;
pub mod evaluation;
pub mod factor;
pub mod prop;
pub mod tables;
pub mod weather;

// Re-export core types for convenience
pub use evaluation::{EvaluationResult, Recommendation, Tier};
pub use factor::{
    Adjustment, DegradeReason, Explanation, ExplanationEntry, FactorKind, FactorOutcome,
    FactorResult,
};
pub use prop::{BaselineStat, PlayerRole, PropCategory, PropRequest, Side, UmpireStat};
pub use tables::{FactorTables, TableOverrides, UmpireTendency, VenueLocation};
