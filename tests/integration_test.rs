//! Integration Tests - End-to-end Evaluation Pipeline
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::NaiveDate;
use mockall::mock;

use prop_edge::adapters::cache::CachedSources;
use prop_edge::adapters::sample::SampleStats;
use prop_edge::config::{OptimizerConfig, PayoutTier, PipelineConfig};
use prop_edge::domain::{
    DegradeReason, FactorKind, FactorOutcome, FactorTables, PlayerRole, PropCategory, PropRequest,
    Side, VenueLocation,
};
use prop_edge::error::{BaselineError, EvaluationError};
use prop_edge::ports::{
    BaselineSource, DateWindow, FactorSources, Forecast, ForecastSource, HomeAwaySplit,
    MatchupSample, MatchupSource, SplitSource, TrendSource,
};
use prop_edge::usecases::{BatchRunner, ComboOptimizer, PropEvaluator};

// ---- Mock Definitions ----

mock! {
    pub Baseline {}

    #[async_trait::async_trait]
    impl BaselineSource for Baseline {
        async fn baseline(
            &self,
            player: &str,
            category: PropCategory,
        ) -> Result<Option<f64>, BaselineError>;
    }
}

mock! {
    pub Matchup {}

    #[async_trait::async_trait]
    impl MatchupSource for Matchup {
        async fn matchup(
            &self,
            batter: &str,
            pitcher: &str,
        ) -> anyhow::Result<Option<MatchupSample>>;
    }
}

mock! {
    pub Trend {}

    #[async_trait::async_trait]
    impl TrendSource for Trend {
        async fn window_rate(
            &self,
            player: &str,
            role: PlayerRole,
            window: DateWindow,
        ) -> anyhow::Result<Option<f64>>;
    }
}

mock! {
    pub Splits {}

    #[async_trait::async_trait]
    impl SplitSource for Splits {
        async fn home_away(&self, player: &str) -> anyhow::Result<Option<HomeAwaySplit>>;
    }
}

mock! {
    pub Weather {}

    #[async_trait::async_trait]
    impl ForecastSource for Weather {
        async fn forecast(
            &self,
            location: VenueLocation,
            date: NaiveDate,
        ) -> anyhow::Result<Option<Forecast>>;
    }
}

// ---- Helpers ----

fn game_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
}

fn sources(
    baseline: MockBaseline,
    matchup: MockMatchup,
    trend: MockTrend,
    splits: MockSplits,
    weather: MockWeather,
) -> FactorSources {
    FactorSources {
        baseline: Arc::new(baseline),
        matchup: Arc::new(matchup),
        trend: Arc::new(trend),
        splits: Arc::new(splits),
        forecast: Arc::new(weather),
    }
}

fn evaluator(sources: FactorSources) -> PropEvaluator {
    PropEvaluator::new(
        sources,
        Arc::new(FactorTables::default()),
        PipelineConfig::default(),
    )
}

/// Trend source answering 0.330 for the 5-day window and 0.300 for the 15-day one.
fn warm_trend() -> MockTrend {
    let mut trend = MockTrend::new();
    trend.expect_window_rate().returning(|_, role, window| {
        assert_eq!(role, PlayerRole::Batter);
        let days = (window.end - window.start).num_days();
        Ok(Some(if days == 5 { 0.330 } else { 0.300 }))
    });
    trend
}

// ---- Tests ----

#[tokio::test]
async fn test_compounded_factors_scenario() {
    let mut baseline = MockBaseline::new();
    baseline
        .expect_baseline()
        .times(2)
        .returning(|_, _| Ok(Some(0.300)));

    let mut splits = MockSplits::new();
    splits.expect_home_away().returning(|_| {
        Ok(Some(HomeAwaySplit {
            home_at_bats: 200,
            home_hits: 63,
            away_at_bats: 200,
            away_hits: 60,
        }))
    });

    let mut weather = MockWeather::new();
    weather.expect_forecast().returning(|_, _| Ok(None));

    // No opposing pitcher: the matchup source must never be called.
    let eval = evaluator(sources(
        baseline,
        MockMatchup::new(),
        warm_trend(),
        splits,
        weather,
    ));

    let request = PropRequest::new("Freddie Freeman", PropCategory::Hits, 0.5, Side::Over, game_date())
        .home(true)
        .at_venue("Progressive Field");
    let over = eval.evaluate(&request).await.unwrap();

    // 0.300 x 1.10 x 1.05 x 1.02
    assert!((over.probability - 0.3534).abs() < 1e-3);
    assert_eq!(over.confidence, 0.93);
    assert!(matches!(
        over.explanation.get(FactorKind::RecentTrend),
        Some(FactorOutcome::Applied { value }) if (*value - 1.10).abs() < 1e-12
    ));
    assert!(matches!(
        over.explanation.get(FactorKind::Weather),
        Some(FactorOutcome::Defaulted { reason: DegradeReason::Absent, .. })
    ));

    let under = eval.evaluate(&request.flipped()).await.unwrap();
    assert!((over.probability + under.probability - 1.0).abs() < 1e-12);
    assert_eq!(over.confidence, under.confidence);
}

#[tokio::test]
async fn test_matchup_blend_applied_above_threshold() {
    let mut baseline = MockBaseline::new();
    baseline.expect_baseline().returning(|_, _| Ok(Some(0.280)));

    let mut matchup = MockMatchup::new();
    matchup
        .expect_matchup()
        .times(1)
        .returning(|batter, pitcher| {
            assert_eq!(batter, "Freddie Freeman");
            assert_eq!(pitcher, "Yu Darvish");
            Ok(Some(MatchupSample {
                plate_appearances: 18,
                average: 0.444,
            }))
        });

    let mut trend = MockTrend::new();
    trend.expect_window_rate().returning(|_, _, _| Ok(None));

    let eval = evaluator(sources(
        baseline,
        matchup,
        trend,
        MockSplits::new(),
        MockWeather::new(),
    ));
    let request = PropRequest::new("Freddie Freeman", PropCategory::Hits, 0.5, Side::Over, game_date())
        .against("Yu Darvish");
    let result = eval.evaluate(&request).await.unwrap();

    let expected = 0.7 * 0.280 + 0.3 * 0.444;
    assert!((result.probability - expected).abs() < 1e-12);
    assert_eq!(
        result.explanation.order(),
        vec![FactorKind::BaseRate, FactorKind::Matchup, FactorKind::RecentTrend]
    );
}

#[tokio::test]
async fn test_provider_failures_degrade_to_neutral() {
    let mut baseline = MockBaseline::new();
    baseline
        .expect_baseline()
        .returning(|_, _| Ok(Some(0.250)));

    let mut matchup = MockMatchup::new();
    matchup
        .expect_matchup()
        .returning(|_, _| Err(anyhow!("connection reset")));

    let mut trend = MockTrend::new();
    trend
        .expect_window_rate()
        .returning(|_, _, _| Err(anyhow!("rate limited")));

    let mut splits = MockSplits::new();
    splits
        .expect_home_away()
        .returning(|_| Err(anyhow!("timeout")));

    let mut weather = MockWeather::new();
    weather
        .expect_forecast()
        .returning(|_, _| Err(anyhow!("503 Service Unavailable")));

    let eval = evaluator(sources(baseline, matchup, trend, splits, weather));
    let request = PropRequest::new("Mookie Betts", PropCategory::TotalBases, 1.5, Side::Over, game_date())
        .against("Yu Darvish")
        .home(false)
        .at_venue("Sandlot Park")
        .with_umpire("Nobody In Particular");

    let result = eval.evaluate(&request).await.unwrap();
    assert!((result.probability - 0.250).abs() < 1e-12);

    for kind in [
        FactorKind::Matchup,
        FactorKind::RecentTrend,
        FactorKind::HomeAway,
    ] {
        assert!(
            matches!(
                result.explanation.get(kind),
                Some(FactorOutcome::Defaulted { reason: DegradeReason::ProviderFailed, .. })
            ),
            "{kind} should be recorded as a provider failure"
        );
    }
    // Unknown venue never reaches the forecast provider.
    assert!(matches!(
        result.explanation.get(FactorKind::Weather),
        Some(FactorOutcome::Defaulted { reason: DegradeReason::Unlisted, .. })
    ));
    // Total bases takes no umpire multiplier, but the umpire is still noted.
    assert!(!result.explanation.contains(FactorKind::UmpireStrikeout));
    assert!(matches!(
        result.explanation.get(FactorKind::UmpireOverTendency),
        Some(FactorOutcome::Defaulted { reason: DegradeReason::Unlisted, .. })
    ));
}

#[tokio::test]
async fn test_forecast_failure_at_known_venue() {
    let mut baseline = MockBaseline::new();
    baseline.expect_baseline().returning(|_, _| Ok(Some(0.30)));
    let mut trend = MockTrend::new();
    trend.expect_window_rate().returning(|_, _, _| Ok(None));
    let mut weather = MockWeather::new();
    weather
        .expect_forecast()
        .times(1)
        .returning(|_, _| Err(anyhow!("dns failure")));

    let eval = evaluator(sources(
        baseline,
        MockMatchup::new(),
        trend,
        MockSplits::new(),
        weather,
    ));
    let request = PropRequest::new("A", PropCategory::Hits, 0.5, Side::Over, game_date())
        .at_venue("Oracle Park");
    let result = eval.evaluate(&request).await.unwrap();

    let expected = 0.30 * 0.90 * 0.97;
    assert!((result.probability - expected).abs() < 1e-12);
    assert!(matches!(
        result.explanation.get(FactorKind::Weather),
        Some(FactorOutcome::Defaulted { reason: DegradeReason::ProviderFailed, .. })
    ));
}

#[tokio::test]
async fn test_unavailable_baseline_proceeds_at_zero() {
    let mut baseline = MockBaseline::new();
    baseline
        .expect_baseline()
        .returning(|_, _| Err(BaselineError::Unavailable(anyhow!("stats api down"))));
    let mut trend = MockTrend::new();
    trend.expect_window_rate().returning(|_, _, _| Ok(None));

    let eval = evaluator(sources(
        baseline,
        MockMatchup::new(),
        trend,
        MockSplits::new(),
        MockWeather::new(),
    ));
    let request = PropRequest::new("A", PropCategory::Hits, 0.5, Side::Under, game_date());
    let result = eval.evaluate(&request).await.unwrap();

    assert_eq!(result.adjusted_rate, 0.0);
    assert_eq!(result.probability, 0.99);
    assert!(matches!(
        result.explanation.get(FactorKind::BaseRate),
        Some(FactorOutcome::Defaulted { reason: DegradeReason::ProviderFailed, .. })
    ));
}

#[tokio::test]
async fn test_unsupported_baseline_is_a_configuration_error() {
    let mut baseline = MockBaseline::new();
    baseline.expect_baseline().returning(|_, category| {
        Err(BaselineError::Unsupported {
            category,
            reason: "no season column".to_string(),
        })
    });

    let eval = evaluator(sources(
        baseline,
        MockMatchup::new(),
        MockTrend::new(),
        MockSplits::new(),
        MockWeather::new(),
    ));
    let request = PropRequest::new("A", PropCategory::Outs, 17.5, Side::Over, game_date());
    let err = eval.evaluate(&request).await.unwrap_err();
    assert!(matches!(
        err,
        EvaluationError::Configuration { category: PropCategory::Outs, .. }
    ));
}

#[tokio::test]
async fn test_batch_continues_past_configuration_error() {
    let mut baseline = MockBaseline::new();
    baseline.expect_baseline().returning(|player, category| match category {
        PropCategory::Outs => Err(BaselineError::Unsupported {
            category,
            reason: "no innings data".to_string(),
        }),
        _ if player == "A" => Ok(Some(0.8)),
        _ => Ok(Some(0.6)),
    });
    let mut trend = MockTrend::new();
    trend.expect_window_rate().returning(|_, _, _| Ok(None));

    let eval = evaluator(sources(
        baseline,
        MockMatchup::new(),
        trend,
        MockSplits::new(),
        MockWeather::new(),
    ));
    let runner = BatchRunner::new(
        Arc::new(eval),
        ComboOptimizer::new(5, 1_000),
        vec![PayoutTier {
            legs: 2,
            multiplier: 3.0,
        }],
        2,
    );

    let requests = vec![
        PropRequest::new("A", PropCategory::Hits, 0.5, Side::Over, game_date()),
        PropRequest::new("P", PropCategory::Outs, 17.5, Side::Over, game_date()),
        PropRequest::new("B", PropCategory::Hits, 0.5, Side::Over, game_date()),
    ];
    let report = runner.run(&requests).await;

    assert_eq!(report.evaluations.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].player, "P");
    assert!(report.failures[0].reason.contains("configuration error"));

    let best = &report.combos[0].top[0];
    assert_eq!(best.indices, vec![0, 1]);
    assert!((best.expected_edge - 0.44).abs() < 1e-12);
}

#[tokio::test]
async fn test_cache_memoizes_repeated_players() {
    let mut baseline = MockBaseline::new();
    baseline
        .expect_baseline()
        .times(1)
        .returning(|_, _| Ok(Some(0.31)));
    let mut trend = MockTrend::new();
    // Two windows, looked up once each.
    trend
        .expect_window_rate()
        .times(2)
        .returning(|_, _, _| Ok(None));

    let cached = CachedSources::wrap(sources(
        baseline,
        MockMatchup::new(),
        trend,
        MockSplits::new(),
        MockWeather::new(),
    ));
    let eval = evaluator(cached);

    let request = PropRequest::new("Mookie Betts", PropCategory::Hits, 0.5, Side::Over, game_date());
    let first = eval.evaluate(&request).await.unwrap();
    let second = eval.evaluate(&request.flipped()).await.unwrap();
    assert!((first.probability + second.probability - 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_demo_slate_end_to_end() {
    let slate: Vec<PropRequest> =
        serde_json::from_str(include_str!("../demos/slate.json")).unwrap();
    let stats = Arc::new(
        SampleStats::from_json(include_str!("../demos/sample_data.json"))
            .unwrap()
            .with_builtin_matchups(),
    );
    let sources = CachedSources::wrap(FactorSources::from_stats(stats.clone(), stats));

    let optimizer = OptimizerConfig::default();
    let runner = BatchRunner::new(
        Arc::new(evaluator(sources)),
        ComboOptimizer::from_config(&optimizer),
        optimizer.payouts.clone(),
        4,
    );
    let report = runner.run(&slate).await;

    assert!(report.failures.is_empty());
    assert_eq!(report.evaluations.len(), slate.len());
    assert_eq!(report.combos.len(), 3);
    assert_eq!(report.combos[2].considered, 1);

    let darvish = &report.evaluations[2].result;
    assert_eq!(darvish.request.side, Side::Under);
    assert!(darvish.explanation.contains(FactorKind::UmpireStrikeout));
    assert!(!darvish.explanation.contains(FactorKind::Matchup));

    let soto = &report.evaluations[4].result;
    assert!(matches!(
        soto.explanation.get(FactorKind::UmpireWalk),
        Some(FactorOutcome::Applied { value }) if (*value - 1.10).abs() < 1e-12
    ));
}
