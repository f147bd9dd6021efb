//! Prop request types.
//!
//! A prop is a single player-performance proposition: a category, a
//! numeric line and the side being wagered. The category decides whether
//! the subject is a batter or a pitcher and which season statistic seeds
//! the evaluation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────
// Enums shared across domain and ports
// ────────────────────────────────────────────

/// Whether the subject of a prop is hitting or pitching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    Batter,
    Pitcher,
}

/// Supported prop categories.
///
/// Aliases accept the market names used by common prop sheets so a slate
/// exported from a book can be deserialized without remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropCategory {
    #[serde(alias = "Hits", alias = "Singles")]
    Hits,
    #[serde(alias = "Total Bases")]
    TotalBases,
    #[serde(alias = "Walks")]
    Walks,
    #[serde(alias = "Batter Strikeouts")]
    BatterStrikeouts,
    #[serde(alias = "strikeouts", alias = "Strikeouts", alias = "Pitcher Strikeouts")]
    PitcherStrikeouts,
    #[serde(alias = "Earned Runs")]
    EarnedRuns,
    #[serde(alias = "Outs")]
    Outs,
    #[serde(
        alias = "hrr",
        alias = "Hits + Runs + RBIs",
        alias = "Hits+Runs+RBIs",
        alias = "Home Runs"
    )]
    HitsRunsRbis,
}

impl PropCategory {
    /// All categories, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Hits,
        Self::TotalBases,
        Self::Walks,
        Self::BatterStrikeouts,
        Self::PitcherStrikeouts,
        Self::EarnedRuns,
        Self::Outs,
        Self::HitsRunsRbis,
    ];

    /// Role of the player this category is about.
    pub const fn role(self) -> PlayerRole {
        match self {
            Self::PitcherStrikeouts | Self::EarnedRuns | Self::Outs => PlayerRole::Pitcher,
            _ => PlayerRole::Batter,
        }
    }

    /// Season statistic used as the baseline for this category.
    pub const fn baseline_stat(self) -> BaselineStat {
        match self {
            Self::Hits | Self::TotalBases | Self::HitsRunsRbis => BaselineStat::BattingAverage,
            Self::Walks => BaselineStat::WalkPercent,
            Self::BatterStrikeouts => BaselineStat::StrikeoutPercent,
            Self::PitcherStrikeouts => BaselineStat::StrikeoutsPerNine,
            Self::EarnedRuns => BaselineStat::EarnedRunAverage,
            Self::Outs => BaselineStat::InningsPerGame,
        }
    }

    /// Umpire tendency relevant to this category, if any.
    pub const fn umpire_stat(self) -> Option<UmpireStat> {
        match self {
            Self::PitcherStrikeouts | Self::BatterStrikeouts => Some(UmpireStat::Strikeout),
            Self::Walks => Some(UmpireStat::Walk),
            _ => None,
        }
    }

    /// Stable snake_case key, used for table lookups and metric labels.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hits => "hits",
            Self::TotalBases => "total_bases",
            Self::Walks => "walks",
            Self::BatterStrikeouts => "batter_strikeouts",
            Self::PitcherStrikeouts => "pitcher_strikeouts",
            Self::EarnedRuns => "earned_runs",
            Self::Outs => "outs",
            Self::HitsRunsRbis => "hits_runs_rbis",
        }
    }
}

impl std::fmt::Display for PropCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Umpire tendency dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UmpireStat {
    Strikeout,
    Walk,
}

/// Raw season statistic a baseline rate is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStat {
    /// AVG, already a rate.
    BattingAverage,
    /// BB% expressed as a percentage (e.g. 9.5).
    WalkPercent,
    /// K% expressed as a percentage (e.g. 22.1).
    StrikeoutPercent,
    /// K/9.
    StrikeoutsPerNine,
    /// ERA.
    EarnedRunAverage,
    /// Innings pitched per game started.
    InningsPerGame,
}

impl BaselineStat {
    /// Convert a raw season value into the rate fed to the pipeline.
    ///
    /// `InningsPerGame` converts to outs per game, which is not a
    /// probability; the final clamp bounds it like any other rate.
    pub fn to_rate(self, raw: f64) -> f64 {
        match self {
            Self::BattingAverage => raw,
            Self::WalkPercent | Self::StrikeoutPercent => raw / 100.0,
            Self::StrikeoutsPerNine => raw / 27.0,
            Self::EarnedRunAverage => raw / 9.0,
            Self::InningsPerGame => raw * 3.0,
        }
    }
}

/// Side of the line being wagered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[serde(alias = "more", alias = "Over", alias = "More")]
    Over,
    #[serde(alias = "less", alias = "Under", alias = "Less")]
    Under,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Over => write!(f, "over"),
            Self::Under => write!(f, "under"),
        }
    }
}

// ────────────────────────────────────────────
// Request
// ────────────────────────────────────────────

/// Immutable input to a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropRequest {
    /// Player the prop is about.
    pub player: String,
    /// Prop category.
    pub category: PropCategory,
    /// Posted line.
    pub line: f64,
    /// Side being wagered.
    pub side: Side,
    /// Date of the game; anchors the trailing form windows.
    pub game_date: NaiveDate,
    /// Opposing starting pitcher, for batter props.
    #[serde(default)]
    pub opposing_pitcher: Option<String>,
    /// Venue name.
    #[serde(default)]
    pub venue: Option<String>,
    /// Home plate umpire.
    #[serde(default)]
    pub umpire: Option<String>,
    /// Whether the player's team is at home.
    #[serde(default)]
    pub is_home: Option<bool>,
}

impl PropRequest {
    pub fn new(
        player: impl Into<String>,
        category: PropCategory,
        line: f64,
        side: Side,
        game_date: NaiveDate,
    ) -> Self {
        Self {
            player: player.into(),
            category,
            line,
            side,
            game_date,
            opposing_pitcher: None,
            venue: None,
            umpire: None,
            is_home: None,
        }
    }

    #[must_use]
    pub fn against(mut self, pitcher: impl Into<String>) -> Self {
        self.opposing_pitcher = Some(pitcher.into());
        self
    }

    #[must_use]
    pub fn at_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    #[must_use]
    pub fn with_umpire(mut self, umpire: impl Into<String>) -> Self {
        self.umpire = Some(umpire.into());
        self
    }

    #[must_use]
    pub const fn home(mut self, is_home: bool) -> Self {
        self.is_home = Some(is_home);
        self
    }

    /// Same request on the opposite side of the line.
    #[must_use]
    pub fn flipped(&self) -> Self {
        let mut other = self.clone();
        other.side = match self.side {
            Side::Over => Side::Under,
            Side::Under => Side::Over,
        };
        other
    }

    pub const fn role(&self) -> PlayerRole {
        self.category.role()
    }

    /// Short label for logs and combo output, e.g. `Mookie Betts hits over 0.5`.
    pub fn label(&self) -> String {
        format!("{} {} {} {}", self.player, self.category, self.side, self.line)
    }
}
