//! Prop Edge - Entry Point
//!
//! Evaluates a slate of props and ranks multi-leg entries.
//!
//! Wiring sequence:
//! 1. Parse CLI arguments
//! 2. Load config.toml + validate
//! 3. Init tracing (JSON or pretty)
//! 4. Build statistics and forecast sources, wrapped in the batch cache
//! 5. Merge table overrides over the built-in tables
//! 6. Run the slate through the evaluator and optimizer
//! 7. Print the JSON report, write the metrics snapshot if configured

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use prop_edge::adapters::cache::CachedSources;
use prop_edge::adapters::metrics::EvaluationMetrics;
use prop_edge::adapters::sample::{NoData, SampleStats};
use prop_edge::adapters::weather::OpenMeteoClient;
use prop_edge::config::{self, AppConfig, LogFormat, WeatherProvider};
use prop_edge::domain::{FactorTables, PropRequest};
use prop_edge::ports::{FactorSources, ForecastSource};
use prop_edge::usecases::{BatchRunner, ComboOptimizer, PropEvaluator};

#[derive(Debug, Parser)]
#[command(name = "prop-edge", version, about = "Evaluate player props and rank multi-leg entries")]
struct Cli {
    /// Configuration file.
    #[arg(long, short, env = "PROP_EDGE_CONFIG", default_value = "config.toml")]
    config: String,

    /// Slate of prop requests (JSON array).
    #[arg(long, short)]
    slate: String,

    /// Statistics and forecasts (JSON). Without it every factor is neutral.
    #[arg(long)]
    sample_data: Option<String>,

    /// Write the report here instead of stdout.
    #[arg(long, short)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. CLI ───────────────────────────────────────────────
    let cli = Cli::parse();

    // ── 2. Load configuration ────────────────────────────────
    let config = if std::path::Path::new(&cli.config).exists() {
        config::loader::load_config(&cli.config).context("Failed to load configuration")?
    } else {
        AppConfig::default()
    };

    // ── 3. Initialize structured logging ─────────────────────
    init_tracing(&config);

    info!(
        name = %config.engine.name,
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config,
        "Starting prop evaluation"
    );

    // ── 4. Sources ───────────────────────────────────────────
    let sources = build_sources(&config, cli.sample_data.as_deref())?;

    // ── 5. Tables ────────────────────────────────────────────
    let tables = FactorTables::default().merge(&config.tables);
    info!(
        venues = tables.venue_count(),
        umpires = tables.umpire_count(),
        "Lookup tables ready"
    );

    // ── 6. Run the slate ─────────────────────────────────────
    let requests = load_slate(&cli.slate)?;
    let metrics = Arc::new(EvaluationMetrics::new().context("Failed to create metrics")?);

    let evaluator = PropEvaluator::new(sources, Arc::new(tables), config.pipeline.clone());
    let runner = BatchRunner::new(
        Arc::new(evaluator),
        ComboOptimizer::from_config(&config.optimizer),
        config.optimizer.payouts.clone(),
        config.engine.concurrency,
    )
    .with_metrics(Arc::clone(&metrics));

    let report = runner.run(&requests).await;

    // ── 7. Output ────────────────────────────────────────────
    let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("Failed to write report: {path}"))?;
            info!(path = %path, "Report written");
        }
        None => println!("{json}"),
    }

    if let Some(path) = &config.metrics.export_path {
        std::fs::write(path, metrics.render()?)
            .with_context(|| format!("Failed to write metrics snapshot: {path}"))?;
        info!(path = %path, "Metrics snapshot written");
    }

    info!(
        evaluated = report.evaluations.len(),
        failed = report.failures.len(),
        "Done"
    );
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.engine.log_level));

    // Logs go to stderr so the report on stdout stays parseable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.engine.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn build_sources(config: &AppConfig, sample_data: Option<&str>) -> Result<FactorSources> {
    let forecast: Arc<dyn ForecastSource> = match config.weather.provider {
        WeatherProvider::OpenMeteo => Arc::new(
            OpenMeteoClient::new(&config.weather).context("Failed to create forecast client")?,
        ),
        WeatherProvider::Disabled => Arc::new(NoData),
    };

    let stats = match sample_data {
        Some(path) => SampleStats::from_file(path)?,
        None => SampleStats::default(),
    }
    .with_builtin_matchups();

    let sources = FactorSources::from_stats(Arc::new(stats), forecast);
    Ok(CachedSources::wrap(sources))
}

fn load_slate(path: &str) -> Result<Vec<PropRequest>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read slate: {path}"))?;
    let requests: Vec<PropRequest> =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse slate: {path}"))?;
    info!(requests = requests.len(), path = %path, "Slate loaded");
    Ok(requests)
}
