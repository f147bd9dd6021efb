//! Error taxonomy.
//!
//! Missing or malformed factor data is never an error: it degrades the
//! factor to neutral and shows up in the explanation trail. Only the
//! cases below surface to callers.

use thiserror::Error;

use crate::domain::prop::PropCategory;

/// Failure of a baseline lookup at the port boundary.
#[derive(Error, Debug)]
pub enum BaselineError {
    /// The source has no statistic mapping for this category.
    #[error("no baseline statistic for {category}: {reason}")]
    Unsupported {
        category: PropCategory,
        reason: String,
    },

    /// The source could not be reached or failed mid-lookup.
    #[error("baseline source unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

/// Hard failure of a single evaluation.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("configuration error for {category}: {reason}")]
    Configuration {
        category: PropCategory,
        reason: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Rejected optimizer request.
#[derive(Error, Debug, PartialEq)]
pub enum OptimizerError {
    #[error("combos need at least 2 legs, got {0}")]
    InvalidLegCount(usize),

    #[error("payout multiplier must be finite and positive, got {0}")]
    InvalidPayout(f64),

    #[error("pool of {pool} choose {legs} yields {combinations} combinations, above the ceiling of {ceiling}")]
    PoolTooLarge {
        pool: usize,
        legs: usize,
        combinations: u64,
        ceiling: u64,
    },
}
