//! trends-mx — Binary Entrypoint
//! Scrapes the configured trend sources once (or on an interval) and writes
//! one JSON snapshot per source.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trends_mx::config::AppConfig;
use trends_mx::fallback::example_snapshot;
use trends_mx::ingest::fetch::PageSource;
use trends_mx::ingest::providers::{http_providers, provider_for};
use trends_mx::ingest::scheduler::{spawn_scheduler, SchedulerCfg};
use trends_mx::ingest::types::{SourceKind, TrendProvider};
use trends_mx::ingest::{probe, run_all, RunOptions};
use trends_mx::output::{to_json_pretty, OutputPlan, PersistOutcome};
use trends_mx::telemetry::Metrics;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape sources and write snapshots
    Scrape(ScrapeArgs),
    /// Report the page structure a source currently serves
    Inspect {
        #[arg(short, long)]
        source: SourceKind,
        /// Read the page from a file instead of the network
        #[arg(long, value_name = "PATH")]
        fixture: Option<PathBuf>,
    },
    /// Print the example snapshot used when a source fails
    Example {
        #[arg(short, long)]
        source: SourceKind,
    },
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Source to scrape; repeatable. Defaults to all.
    #[arg(short, long = "source")]
    sources: Vec<SourceKind>,
    /// Read the page from a file instead of the network (single source only)
    #[arg(long, value_name = "PATH")]
    fixture: Option<PathBuf>,
    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,
    /// Print snapshots instead of writing files
    #[arg(long)]
    stdout: bool,
    /// Freshness threshold in minutes
    #[arg(long, value_name = "N")]
    max_age: Option<i64>,
    /// Always write, skipping the freshness gate
    #[arg(long)]
    no_gate: bool,
    /// Repeat every SECS seconds until Ctrl-C
    #[arg(long, value_name = "SECS")]
    every: Option<u64>,
    /// Print Prometheus metrics to stderr after the run
    #[arg(long)]
    metrics: bool,
}

/// Logs go to stderr so `--stdout` output stays clean JSON.
/// `TRENDS_LOG_JSON=1` switches to one JSON object per line.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trends_mx=info,warn"));
    let json = std::env::var("TRENDS_LOG_JSON").is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; a missing file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = AppConfig::load_default().context("loading configuration")?;

    match cli.command {
        Command::Scrape(args) => scrape(cfg, args).await,
        Command::Inspect { source, fixture } => {
            let provider = build_providers(&cfg, &[source], fixture.as_ref())?
                .pop()
                .context("no provider built")?;
            let report = probe::inspect(provider.as_ref())
                .await
                .with_context(|| format!("fetching {source}"))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Example { source } => {
            let snap = example_snapshot(source, Utc::now(), cfg.target_tz()?, None);
            println!("{}", to_json_pretty(&snap)?);
            Ok(())
        }
    }
}

async fn scrape(mut cfg: AppConfig, args: ScrapeArgs) -> Result<()> {
    if let Some(dir) = args.out {
        cfg.output_dir = dir;
    }
    if let Some(m) = args.max_age {
        cfg.freshness.max_age_minutes = m;
    }
    if args.no_gate {
        cfg.freshness.enabled = false;
    }
    cfg.validate()?;

    let kinds = if args.sources.is_empty() {
        SourceKind::ALL.to_vec()
    } else {
        args.sources
    };
    if args.fixture.is_some() && kinds.len() != 1 {
        anyhow::bail!("--fixture needs exactly one --source");
    }

    let metrics = if args.metrics { Some(Metrics::init()?) } else { None };
    let opts = RunOptions::from_config(&cfg)?;
    let plan = OutputPlan {
        stdout: args.stdout,
        ..OutputPlan::from_config(&cfg)
    };
    let providers = build_providers(&cfg, &kinds, args.fixture.as_ref())?;

    if let Some(secs) = args.every {
        tracing::info!(interval_secs = secs, sources = kinds.len(), "starting scheduler");
        let handle = spawn_scheduler(SchedulerCfg { interval_secs: secs }, providers, opts, plan);
        tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
        handle.abort();
        tracing::info!("scheduler stopped");
    } else {
        for (kind, snap) in run_all(&providers, opts).await {
            match plan.emit(kind, &snap)? {
                Some(PersistOutcome::Written(p)) => {
                    tracing::info!(source = kind.as_str(), path = %p.display(), status = snap.status.as_str(), "saved")
                }
                Some(PersistOutcome::SkippedStale(p)) | Some(PersistOutcome::KeptExisting(p)) => {
                    tracing::info!(source = kind.as_str(), path = %p.display(), "not overwritten")
                }
                None => {}
            }
        }
    }

    if let Some(m) = metrics {
        eprintln!("{}", m.render());
    }
    Ok(())
}

fn build_providers(
    cfg: &AppConfig,
    kinds: &[SourceKind],
    fixture: Option<&PathBuf>,
) -> Result<Vec<Box<dyn TrendProvider>>> {
    match fixture {
        Some(path) => {
            let source = PageSource::fixture_file(path)
                .with_context(|| format!("reading fixture {}", path.display()))?;
            Ok(kinds
                .iter()
                .map(|&k| provider_for(k, source.clone(), cfg))
                .collect())
        }
        None => Ok(http_providers(kinds, cfg)?),
    }
}
