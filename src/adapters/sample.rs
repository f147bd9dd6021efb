//! Sample Data Adapter - File-backed Statistics Provider
//!
//! Serves every statistics port from a JSON document loaded once at
//! startup. Used for offline slates, demos and tests. Player names match
//! case-insensitively.
//!
//! ```json
//! {
//!   "players": {
//!     "Freddie Freeman": {
//!       "season": { "batting_average": 0.302 },
//!       "games": [{ "date": "2025-07-18", "opportunities": 4, "successes": 2 }],
//!       "split": { "home_at_bats": 210, "home_hits": 68, "away_at_bats": 205, "away_hits": 58 }
//!     }
//!   },
//!   "matchups": [{ "batter": "Freddie Freeman", "pitcher": "Yu Darvish", "plate_appearances": 18, "average": 0.444 }],
//!   "forecasts": [{ "latitude": 39.7562, "longitude": -104.9942, "temperature_c": 28.0, "wind_kmh": 12.0 }]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::domain::prop::{BaselineStat, PlayerRole, PropCategory};
use crate::domain::tables::VenueLocation;
use crate::error::BaselineError;
use crate::ports::{
    BaselineSource, DateWindow, Forecast, ForecastSource, HomeAwaySplit, MatchupSample,
    MatchupSource, SplitSource, TrendSource,
};

/// Coordinate tolerance when matching a forecast to a venue.
const LOCATION_EPSILON: f64 = 1e-4;

/// Head-to-head samples used when a data file has none for a pair.
const BUILTIN_MATCHUPS: &[(&str, &str, u32, f64)] = &[
    ("Freddie Freeman", "Yu Darvish", 18, 0.444),
    ("Mookie Betts", "Yu Darvish", 12, 0.250),
    ("Bryce Harper", "Kodai Senga", 10, 0.600),
];

/// One game of a player's log. For batters, opportunities are at-bats and
/// successes are hits; for pitchers, batters faced and strikeouts.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GameLine {
    pub date: NaiveDate,
    pub opportunities: u32,
    pub successes: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PlayerRecord {
    #[serde(default)]
    season: HashMap<BaselineStat, f64>,
    #[serde(default)]
    games: Vec<GameLine>,
    #[serde(default)]
    split: Option<HomeAwaySplit>,
}

#[derive(Debug, Clone, Deserialize)]
struct MatchupRecord {
    batter: String,
    pitcher: String,
    #[serde(flatten)]
    sample: MatchupSample,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct ForecastRecord {
    #[serde(flatten)]
    location: VenueLocation,
    #[serde(flatten)]
    forecast: Forecast,
}

#[derive(Debug, Default, Deserialize)]
struct SampleFile {
    #[serde(default)]
    players: HashMap<String, PlayerRecord>,
    #[serde(default)]
    matchups: Vec<MatchupRecord>,
    #[serde(default)]
    forecasts: Vec<ForecastRecord>,
}

fn player_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// In-memory statistics and forecasts.
#[derive(Debug, Clone, Default)]
pub struct SampleStats {
    players: HashMap<String, PlayerRecord>,
    matchups: HashMap<(String, String), MatchupSample>,
    forecasts: Vec<ForecastRecord>,
}

impl SampleStats {
    /// Load a sample data file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not valid sample JSON.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read sample data: {path}"))?;
        let stats = Self::from_json(&content)
            .with_context(|| format!("Failed to parse sample data: {path}"))?;

        info!(
            players = stats.players.len(),
            matchups = stats.matchups.len(),
            forecasts = stats.forecasts.len(),
            "Sample data loaded"
        );
        Ok(stats)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: SampleFile = serde_json::from_str(content)?;
        let mut stats = Self::default();

        for (name, record) in file.players {
            stats.players.insert(player_key(&name), record);
        }
        for m in file.matchups {
            stats
                .matchups
                .insert((player_key(&m.batter), player_key(&m.pitcher)), m.sample);
        }
        stats.forecasts = file.forecasts;
        Ok(stats)
    }

    /// Add the built-in head-to-head samples for pairs not already present.
    #[must_use]
    pub fn with_builtin_matchups(mut self) -> Self {
        for &(batter, pitcher, plate_appearances, average) in BUILTIN_MATCHUPS {
            self.matchups
                .entry((player_key(batter), player_key(pitcher)))
                .or_insert(MatchupSample {
                    plate_appearances,
                    average,
                });
        }
        self
    }

    #[must_use]
    pub fn with_season_stat(mut self, player: &str, stat: BaselineStat, raw: f64) -> Self {
        self.player_mut(player).season.insert(stat, raw);
        self
    }

    #[must_use]
    pub fn with_game(
        mut self,
        player: &str,
        date: NaiveDate,
        opportunities: u32,
        successes: u32,
    ) -> Self {
        self.player_mut(player).games.push(GameLine {
            date,
            opportunities,
            successes,
        });
        self
    }

    #[must_use]
    pub fn with_split(mut self, player: &str, split: HomeAwaySplit) -> Self {
        self.player_mut(player).split = Some(split);
        self
    }

    #[must_use]
    pub fn with_matchup(mut self, batter: &str, pitcher: &str, sample: MatchupSample) -> Self {
        self.matchups
            .insert((player_key(batter), player_key(pitcher)), sample);
        self
    }

    #[must_use]
    pub fn with_forecast(mut self, location: VenueLocation, forecast: Forecast) -> Self {
        self.forecasts.push(ForecastRecord { location, forecast });
        self
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    fn player_mut(&mut self, name: &str) -> &mut PlayerRecord {
        self.players.entry(player_key(name)).or_default()
    }

    fn player(&self, name: &str) -> Option<&PlayerRecord> {
        self.players.get(&player_key(name))
    }
}

#[async_trait]
impl BaselineSource for SampleStats {
    async fn baseline(
        &self,
        player: &str,
        category: PropCategory,
    ) -> Result<Option<f64>, BaselineError> {
        let stat = category.baseline_stat();
        Ok(self
            .player(player)
            .and_then(|p| p.season.get(&stat))
            .map(|raw| stat.to_rate(*raw)))
    }
}

#[async_trait]
impl MatchupSource for SampleStats {
    async fn matchup(&self, batter: &str, pitcher: &str) -> Result<Option<MatchupSample>> {
        Ok(self
            .matchups
            .get(&(player_key(batter), player_key(pitcher)))
            .copied())
    }
}

#[async_trait]
impl TrendSource for SampleStats {
    async fn window_rate(
        &self,
        player: &str,
        _role: PlayerRole,
        window: DateWindow,
    ) -> Result<Option<f64>> {
        let Some(record) = self.player(player) else {
            return Ok(None);
        };

        let (opportunities, successes) = record
            .games
            .iter()
            .filter(|g| window.contains(g.date))
            .try_fold((0u32, 0u32), |(o, s), g| {
                Some((o.checked_add(g.opportunities)?, s.checked_add(g.successes)?))
            })
            .with_context(|| format!("game log totals overflow for {player}"))?;

        if opportunities == 0 {
            return Ok(None);
        }
        Ok(Some(f64::from(successes) / f64::from(opportunities)))
    }
}

#[async_trait]
impl SplitSource for SampleStats {
    async fn home_away(&self, player: &str) -> Result<Option<HomeAwaySplit>> {
        Ok(self.player(player).and_then(|p| p.split))
    }
}

#[async_trait]
impl ForecastSource for SampleStats {
    async fn forecast(&self, location: VenueLocation, _date: NaiveDate) -> Result<Option<Forecast>> {
        Ok(self
            .forecasts
            .iter()
            .find(|r| {
                (r.location.latitude - location.latitude).abs() < LOCATION_EPSILON
                    && (r.location.longitude - location.longitude).abs() < LOCATION_EPSILON
            })
            .map(|r| r.forecast))
    }
}

/// Provider with no data at all. Every factor degrades to neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoData;

#[async_trait]
impl BaselineSource for NoData {
    async fn baseline(&self, _: &str, _: PropCategory) -> Result<Option<f64>, BaselineError> {
        Ok(None)
    }
}

#[async_trait]
impl MatchupSource for NoData {
    async fn matchup(&self, _: &str, _: &str) -> Result<Option<MatchupSample>> {
        Ok(None)
    }
}

#[async_trait]
impl TrendSource for NoData {
    async fn window_rate(&self, _: &str, _: PlayerRole, _: DateWindow) -> Result<Option<f64>> {
        Ok(None)
    }
}

#[async_trait]
impl SplitSource for NoData {
    async fn home_away(&self, _: &str) -> Result<Option<HomeAwaySplit>> {
        Ok(None)
    }
}

#[async_trait]
impl ForecastSource for NoData {
    async fn forecast(&self, _: VenueLocation, _: NaiveDate) -> Result<Option<Forecast>> {
        Ok(None)
    }
}
