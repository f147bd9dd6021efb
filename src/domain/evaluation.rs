//! Evaluation output and the final resolution math.
//!
//! Side resolution, clamping and confidence are pure functions so they can
//! be checked independently of the provider plumbing.

use serde::{Deserialize, Serialize};

use super::factor::Explanation;
use super::prop::{PropRequest, Side};

/// Lower probability bound.
pub const PROBABILITY_FLOOR: f64 = 0.01;
/// Upper probability bound.
pub const PROBABILITY_CEILING: f64 = 0.99;

/// Resolve the adjusted rate to the wagered side, before clamping.
pub fn resolve_side(rate: f64, side: Side) -> f64 {
    match side {
        Side::Over => rate,
        Side::Under => 1.0 - rate,
    }
}

/// Clamp a probability into `[floor, ceiling]`. NaN maps to the floor.
pub fn clamp_probability(p: f64, floor: f64, ceiling: f64) -> f64 {
    if p.is_nan() {
        return floor;
    }
    p.clamp(floor, ceiling)
}

/// Directional confidence: `0.5 + 0.5 * (1 - |p - 0.5|)`, rounded to 2 dp.
pub fn confidence(probability: f64) -> f64 {
    round_to(0.5 + 0.5 * (1.0 - (probability - 0.5).abs()), 2)
}

/// Round to `dp` decimal places.
pub fn round_to(value: f64, dp: i32) -> f64 {
    let scale = 10f64.powi(dp);
    (value * scale).round() / scale
}

/// Immutable result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Originating request, kept for labeling combos.
    pub request: PropRequest,
    /// Final clamped probability for the requested side.
    pub probability: f64,
    /// Directional confidence in [0.5, 1.0].
    pub confidence: f64,
    /// Running rate after every factor, before side resolution.
    pub adjusted_rate: f64,
    /// Factors in application order.
    pub explanation: Explanation,
}

impl EvaluationResult {
    pub fn tier(&self) -> Tier {
        Tier::classify(self.probability)
    }

    pub fn recommendation(&self) -> Recommendation {
        Recommendation::classify(self.probability)
    }

    /// Edge of this prop if every leg of an n-leg entry hit at the same rate.
    pub fn value_edge(&self, legs: u32, payout_multiplier: f64) -> f64 {
        payout_multiplier * self.probability.powf(f64::from(legs)) - 1.0
    }
}

/// Probability bands used to group a slate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// p >= 0.65
    Top,
    /// 0.55 <= p < 0.65
    Recommended,
    /// 0.45 <= p < 0.55
    NoEdge,
    /// p < 0.45
    Avoid,
}

impl Tier {
    pub fn classify(probability: f64) -> Self {
        if probability >= 0.65 {
            Self::Top
        } else if probability >= 0.55 {
            Self::Recommended
        } else if probability >= 0.45 {
            Self::NoEdge
        } else {
            Self::Avoid
        }
    }
}

/// Action suggested for a single prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Take,
    Pass,
    Fade,
}

impl Recommendation {
    pub fn classify(probability: f64) -> Self {
        if probability > 0.55 {
            Self::Take
        } else if probability < 0.45 {
            Self::Fade
        } else {
            Self::Pass
        }
    }
}
