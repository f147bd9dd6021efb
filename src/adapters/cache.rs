//! Per-batch memoization of provider lookups.
//!
//! A slate usually repeats players, pitchers and venues, so the same
//! provider call would otherwise run many times per batch. Successful
//! answers (including "no data") are cached in `DashMap`s; failures are
//! not, so a transient error is retried on the next request. Keys are the
//! names exactly as requested; providers decide how names match.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use crate::domain::prop::{PlayerRole, PropCategory};
use crate::domain::tables::VenueLocation;
use crate::error::BaselineError;
use crate::ports::{
    BaselineSource, DateWindow, FactorSources, Forecast, ForecastSource, HomeAwaySplit,
    MatchupSample, MatchupSource, SplitSource, TrendSource,
};

type ForecastKey = (u64, u64, NaiveDate);

/// Memoizing wrapper around a full set of providers.
pub struct CachedSources {
    inner: FactorSources,
    baselines: DashMap<(String, PropCategory), Option<f64>>,
    matchups: DashMap<(String, String), Option<MatchupSample>>,
    windows: DashMap<(String, PlayerRole, DateWindow), Option<f64>>,
    splits: DashMap<String, Option<HomeAwaySplit>>,
    forecasts: DashMap<ForecastKey, Option<Forecast>>,
}

impl CachedSources {
    pub fn new(inner: FactorSources) -> Self {
        Self {
            inner,
            baselines: DashMap::new(),
            matchups: DashMap::new(),
            windows: DashMap::new(),
            splits: DashMap::new(),
            forecasts: DashMap::new(),
        }
    }

    /// Wrap `inner` and hand back a source set that routes every port
    /// through the cache.
    pub fn wrap(inner: FactorSources) -> FactorSources {
        let cached = Arc::new(Self::new(inner));
        FactorSources {
            baseline: cached.clone(),
            matchup: cached.clone(),
            trend: cached.clone(),
            splits: cached.clone(),
            forecast: cached,
        }
    }

    /// Number of memoized answers across all ports.
    pub fn len(&self) -> usize {
        self.baselines.len()
            + self.matchups.len()
            + self.windows.len()
            + self.splits.len()
            + self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CachedSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSources")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BaselineSource for CachedSources {
    async fn baseline(
        &self,
        player: &str,
        category: PropCategory,
    ) -> Result<Option<f64>, BaselineError> {
        let key = (player.to_string(), category);
        if let Some(hit) = self.baselines.get(&key) {
            return Ok(*hit);
        }
        let value = self.inner.baseline.baseline(player, category).await?;
        self.baselines.insert(key, value);
        Ok(value)
    }
}

#[async_trait]
impl MatchupSource for CachedSources {
    async fn matchup(&self, batter: &str, pitcher: &str) -> Result<Option<MatchupSample>> {
        let key = (batter.to_string(), pitcher.to_string());
        if let Some(hit) = self.matchups.get(&key) {
            return Ok(*hit);
        }
        let value = self.inner.matchup.matchup(batter, pitcher).await?;
        self.matchups.insert(key, value);
        Ok(value)
    }
}

#[async_trait]
impl TrendSource for CachedSources {
    async fn window_rate(
        &self,
        player: &str,
        role: PlayerRole,
        window: DateWindow,
    ) -> Result<Option<f64>> {
        let key = (player.to_string(), role, window);
        if let Some(hit) = self.windows.get(&key) {
            return Ok(*hit);
        }
        let value = self.inner.trend.window_rate(player, role, window).await?;
        self.windows.insert(key, value);
        Ok(value)
    }
}

#[async_trait]
impl SplitSource for CachedSources {
    async fn home_away(&self, player: &str) -> Result<Option<HomeAwaySplit>> {
        let key = player.to_string();
        if let Some(hit) = self.splits.get(&key) {
            return Ok(*hit);
        }
        let value = self.inner.splits.home_away(player).await?;
        self.splits.insert(key, value);
        Ok(value)
    }
}

#[async_trait]
impl ForecastSource for CachedSources {
    async fn forecast(&self, location: VenueLocation, date: NaiveDate) -> Result<Option<Forecast>> {
        let key = (location.latitude.to_bits(), location.longitude.to_bits(), date);
        if let Some(hit) = self.forecasts.get(&key) {
            return Ok(*hit);
        }
        let value = self.inner.forecast.forecast(location, date).await?;
        self.forecasts.insert(key, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sample::NoData;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Split source that counts calls and fails on the first one.
    #[derive(Default)]
    struct FlakySplits {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SplitSource for FlakySplits {
        async fn home_away(&self, _: &str) -> Result<Option<HomeAwaySplit>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("timeout");
            }
            Ok(Some(HomeAwaySplit {
                home_at_bats: 100,
                home_hits: 30,
                away_at_bats: 100,
                away_hits: 25,
            }))
        }
    }

    #[test]
    fn test_errors_not_cached_answers_are() {
        let flaky = Arc::new(FlakySplits::default());
        let mut inner = FactorSources::from_stats(Arc::new(NoData), Arc::new(NoData));
        inner.splits = flaky.clone();
        let cache = CachedSources::new(inner);

        assert!(tokio_test::block_on(cache.home_away("A")).is_err());
        assert!(tokio_test::block_on(cache.home_away("A")).unwrap().is_some());
        assert!(tokio_test::block_on(cache.home_away("A")).unwrap().is_some());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
    }

    /// Baseline source that only knows the exact spelling "A".
    struct CaseSensitiveBaseline;

    #[async_trait]
    impl BaselineSource for CaseSensitiveBaseline {
        async fn baseline(
            &self,
            player: &str,
            _: PropCategory,
        ) -> Result<Option<f64>, BaselineError> {
            Ok((player == "A").then_some(0.3))
        }
    }

    #[test]
    fn test_names_differing_in_case_are_cached_apart() {
        let mut inner = FactorSources::from_stats(Arc::new(NoData), Arc::new(NoData));
        inner.baseline = Arc::new(CaseSensitiveBaseline);
        let cache = CachedSources::new(inner);

        let upper = tokio_test::block_on(cache.baseline("A", PropCategory::Hits)).unwrap();
        let lower = tokio_test::block_on(cache.baseline("a", PropCategory::Hits)).unwrap();
        assert_eq!(upper, Some(0.3));
        assert_eq!(lower, None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_absent_answers_are_cached() {
        let cache = CachedSources::new(FactorSources::from_stats(Arc::new(NoData), Arc::new(NoData)));
        assert!(cache.is_empty());
        let b = tokio_test::block_on(cache.baseline("A", PropCategory::Hits)).unwrap();
        assert_eq!(b, None);
        assert_eq!(cache.len(), 1);
    }
}
