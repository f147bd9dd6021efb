//! Factor results and the explanation trail.
//!
//! Each situational dimension produces a `FactorResult` on its own; the
//! evaluator composes them in a fixed order. The `Explanation` records
//! every factor at the moment it is applied, so degraded factors stay
//! distinguishable from factors that were genuinely neutral.

use serde::{Deserialize, Serialize};

/// Neutral multiplier value.
pub const NEUTRAL: f64 = 1.0;

/// Named entries of the explanation trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    /// Season baseline rate.
    BaseRate,
    /// Head-to-head rate blended into the baseline.
    Matchup,
    /// Short-window over long-window form ratio.
    RecentTrend,
    /// Home/away batting split ratio.
    HomeAway,
    /// Venue run-environment factor.
    ParkRun,
    /// Venue factor specific to the prop category.
    ParkProp,
    /// Umpire strikeout boost.
    UmpireStrikeout,
    /// Umpire walk suppression.
    UmpireWalk,
    /// Umpire over tendency. Recorded, never applied.
    UmpireOverTendency,
    /// Forecast temperature and wind at the venue.
    Weather,
}

impl FactorKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::BaseRate => "base_rate",
            Self::Matchup => "matchup",
            Self::RecentTrend => "recent_trend",
            Self::HomeAway => "home_away",
            Self::ParkRun => "park_run",
            Self::ParkProp => "park_prop",
            Self::UmpireStrikeout => "umpire_strikeout",
            Self::UmpireWalk => "umpire_walk",
            Self::UmpireOverTendency => "umpire_over_tendency",
            Self::Weather => "weather",
        }
    }
}

impl std::fmt::Display for FactorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a factor changes the running rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Adjustment {
    /// Multiply the running rate.
    Multiplier { value: f64 },
    /// Weighted blend of the running rate with an absolute rate in [0, 1].
    Blend { rate: f64, weight: f64 },
    /// Recorded for audit only.
    Informational { value: f64 },
}

/// A single factor's contribution, tagged with its name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorResult {
    pub kind: FactorKind,
    pub adjustment: Adjustment,
}

impl FactorResult {
    pub const fn multiplier(kind: FactorKind, value: f64) -> Self {
        Self {
            kind,
            adjustment: Adjustment::Multiplier { value },
        }
    }

    pub const fn blend(kind: FactorKind, rate: f64, weight: f64) -> Self {
        Self {
            kind,
            adjustment: Adjustment::Blend { rate, weight },
        }
    }

    pub const fn informational(kind: FactorKind, value: f64) -> Self {
        Self {
            kind,
            adjustment: Adjustment::Informational { value },
        }
    }

    /// Apply this factor to the running rate.
    pub fn apply(&self, rate: f64) -> f64 {
        match self.adjustment {
            Adjustment::Multiplier { value } => rate * value,
            Adjustment::Blend { rate: other, weight } => (1.0 - weight) * rate + weight * other,
            Adjustment::Informational { .. } => rate,
        }
    }

    /// Value written to the explanation trail.
    pub const fn recorded_value(&self) -> f64 {
        match self.adjustment {
            Adjustment::Multiplier { value } | Adjustment::Informational { value } => value,
            Adjustment::Blend { rate, .. } => rate,
        }
    }
}

/// Why a factor fell back to neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradeReason {
    /// Provider had no data.
    Absent,
    /// Provider returned a malformed or out-of-range value.
    Invalid,
    /// Provider call failed.
    ProviderFailed,
    /// Sample below the minimum size.
    InsufficientSample,
    /// A static table had no entry for the key.
    Unlisted,
}

impl DegradeReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Invalid => "invalid",
            Self::ProviderFailed => "provider_failed",
            Self::InsufficientSample => "insufficient_sample",
            Self::Unlisted => "unlisted",
        }
    }
}

/// What happened to a factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FactorOutcome {
    /// Factor changed the running rate; `value` is the multiplier or blended-in rate.
    Applied { value: f64 },
    /// Factor ran but fell back to a default value.
    Defaulted { value: f64, reason: DegradeReason },
    /// Recorded for audit, not applied.
    Informational { value: f64 },
}

impl FactorOutcome {
    pub const fn value(&self) -> f64 {
        match *self {
            Self::Applied { value }
            | Self::Defaulted { value, .. }
            | Self::Informational { value } => value,
        }
    }

    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }
}

/// One line of the explanation trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplanationEntry {
    pub factor: FactorKind,
    #[serde(flatten)]
    pub outcome: FactorOutcome,
}

/// Ordered record of every factor, in application order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Explanation {
    entries: Vec<ExplanationEntry>,
}

impl Explanation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, factor: FactorKind, outcome: FactorOutcome) {
        self.entries.push(ExplanationEntry { factor, outcome });
    }

    /// Record an applied factor result.
    pub fn record_result(&mut self, result: &FactorResult) {
        let outcome = match result.adjustment {
            Adjustment::Informational { value } => FactorOutcome::Informational { value },
            _ => FactorOutcome::Applied {
                value: result.recorded_value(),
            },
        };
        self.record(result.kind, outcome);
    }

    pub fn record_default(&mut self, factor: FactorKind, value: f64, reason: DegradeReason) {
        self.record(factor, FactorOutcome::Defaulted { value, reason });
    }

    pub fn get(&self, factor: FactorKind) -> Option<&FactorOutcome> {
        self.entries
            .iter()
            .find(|e| e.factor == factor)
            .map(|e| &e.outcome)
    }

    pub fn contains(&self, factor: FactorKind) -> bool {
        self.get(factor).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExplanationEntry> {
        self.entries.iter()
    }

    /// Factor names in application order.
    pub fn order(&self) -> Vec<FactorKind> {
        self.entries.iter().map(|e| e.factor).collect()
    }

    pub fn degraded(&self) -> impl Iterator<Item = &ExplanationEntry> {
        self.entries.iter().filter(|e| e.outcome.is_degraded())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_apply() {
        let f = FactorResult::multiplier(FactorKind::ParkRun, 1.2);
        assert!((f.apply(0.25) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_blend_apply() {
        let f = FactorResult::blend(FactorKind::Matchup, 0.444, 0.3);
        let expected = 0.7 * 0.280 + 0.3 * 0.444;
        assert!((f.apply(0.280) - expected).abs() < 1e-12);
        assert!((f.recorded_value() - 0.444).abs() < f64::EPSILON);
    }

    #[test]
    fn test_informational_leaves_rate() {
        let f = FactorResult::informational(FactorKind::UmpireOverTendency, 0.58);
        assert!((f.apply(0.31) - 0.31).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explanation_keeps_order() {
        let mut ex = Explanation::new();
        ex.record_result(&FactorResult::multiplier(FactorKind::RecentTrend, 1.1));
        ex.record_default(FactorKind::HomeAway, NEUTRAL, DegradeReason::InsufficientSample);
        ex.record_result(&FactorResult::informational(FactorKind::UmpireOverTendency, 0.5));

        assert_eq!(
            ex.order(),
            vec![
                FactorKind::RecentTrend,
                FactorKind::HomeAway,
                FactorKind::UmpireOverTendency
            ]
        );
        assert_eq!(ex.degraded().count(), 1);
        assert!(matches!(
            ex.get(FactorKind::UmpireOverTendency),
            Some(FactorOutcome::Informational { .. })
        ));
    }

    #[test]
    fn test_explanation_serializes_as_list() {
        let mut ex = Explanation::new();
        ex.record_default(FactorKind::Weather, NEUTRAL, DegradeReason::Absent);
        let json = serde_json::to_value(&ex).unwrap();
        assert_eq!(json[0]["factor"], "weather");
        assert_eq!(json[0]["status"], "defaulted");
        assert_eq!(json[0]["reason"], "absent");
    }
}
