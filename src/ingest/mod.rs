// src/ingest/mod.rs
pub mod fetch;
pub mod probe;
pub mod providers;
pub mod scheduler;
pub mod types;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::time::Instant;

use crate::config::AppConfig;
use crate::error::ScrapeError;
use crate::fallback::example_snapshot;
use crate::ingest::types::{SourceKind, TrendProvider};
use crate::snapshot::{ExtractStats, Snapshot};
use crate::trend::{normalize_candidate, NormalizeOptions, RawCandidate, TrendRecord, UNKNOWN_VOLUME};

/// One-time metrics registration (so series show up in the exposition).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_metrics);
}

/// Register help text for every metric this crate emits with the current
/// recorder.
pub fn describe_metrics() {
    describe_counter!("trends_candidates_total", "Raw candidates extracted from providers.");
    describe_counter!("trends_kept_total", "Trend records kept after normalization.");
    describe_counter!(
        "trends_dropped_total",
        "Candidates dropped (empty term or duplicate rank)."
    );
    describe_counter!(
        "trends_placeholder_volume_total",
        "Records whose volume was the source placeholder."
    );
    describe_counter!("trends_provider_errors_total", "Provider fetch/extract errors.");
    describe_counter!("trends_fallback_total", "Snapshots replaced by example data.");
    describe_counter!("trends_runs_total", "Scheduled scrape ticks.");
    describe_histogram!("trends_extract_ms", "Provider extraction time in milliseconds.");
    describe_gauge!("trends_last_run_ts", "Unix ts when a provider last ran.");
}

/// Per-run knobs shared by every provider.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub tz: Tz,
    /// Replace failed runs with example data instead of an empty `error`
    /// snapshot.
    pub fallback_on_failure: bool,
}

impl RunOptions {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            fallback_on_failure: true,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            tz: cfg.target_tz()?,
            fallback_on_failure: cfg.fallback_on_failure,
        })
    }
}

/// Normalize candidates in source order. The first record for a rank wins;
/// later ones are dropped. Returns the kept records and the drop count.
pub fn normalize_candidates(
    kind: SourceKind,
    candidates: &[RawCandidate],
    now: DateTime<Utc>,
    tz: Tz,
) -> (Vec<TrendRecord>, usize) {
    let opts = NormalizeOptions {
        tz,
        interest_scale: kind.interest_scale(),
    };

    let mut seen_ranks = HashSet::new();
    let mut kept = Vec::with_capacity(candidates.len());
    let mut dropped = 0usize;

    for (idx, raw) in candidates.iter().enumerate() {
        let Some(rec) = normalize_candidate(raw, idx as u32 + 1, now, opts) else {
            dropped += 1;
            continue;
        };
        if !seen_ranks.insert(rec.rank) {
            tracing::warn!(target: "normalize", provider = kind.as_str(), rank = rec.rank, term = %rec.term, "duplicate rank dropped");
            dropped += 1;
            continue;
        }
        if rec.volume == UNKNOWN_VOLUME {
            counter!("trends_placeholder_volume_total", "provider" => kind.as_str()).increment(1);
        }
        kept.push(rec);
    }

    (kept, dropped)
}

/// Turn one provider's page (or its fetch error) into a snapshot. Never
/// fails: errors become a fallback or `error` snapshot.
pub fn build_snapshot(
    provider: &dyn TrendProvider,
    body: Result<String, ScrapeError>,
    now: DateTime<Utc>,
    opts: RunOptions,
) -> Snapshot {
    ensure_metrics_described();
    let kind = provider.kind();

    let body = match body {
        Ok(b) => b,
        Err(e) => return failed(kind, &e, None, now, opts),
    };

    let started = Instant::now();
    let extraction = provider.extract_candidates(&body);
    histogram!("trends_extract_ms", "provider" => kind.as_str())
        .record(started.elapsed().as_secs_f64() * 1000.0);

    let extraction = match extraction {
        Ok(x) => x,
        Err(e) => return failed(kind, &e, None, now, opts),
    };
    counter!("trends_candidates_total", "provider" => kind.as_str())
        .increment(extraction.candidates.len() as u64);

    let (trends, dropped) = normalize_candidates(kind, &extraction.candidates, now, opts.tz);
    let stats = ExtractStats {
        dropped: extraction.stats.dropped + dropped,
        ..extraction.stats
    };
    counter!("trends_kept_total", "provider" => kind.as_str()).increment(trends.len() as u64);
    counter!("trends_dropped_total", "provider" => kind.as_str()).increment(stats.dropped as u64);

    let min = provider.min_records();
    if trends.len() < min {
        let e = ScrapeError::structural(format!("{} trends extracted, need at least {min}", trends.len()));
        return failed(kind, &e, Some(stats), now, opts);
    }

    tracing::info!(
        target: "ingest",
        provider = provider.name(),
        kept = trends.len(),
        rows = stats.rows_processed,
        ads = stats.ads_skipped,
        dropped = stats.dropped,
        "extracted trends"
    );
    Snapshot::success(kind.meta(), trends, now, opts.tz).with_debug(stats)
}

fn failed(
    kind: SourceKind,
    err: &ScrapeError,
    stats: Option<ExtractStats>,
    now: DateTime<Utc>,
    opts: RunOptions,
) -> Snapshot {
    tracing::warn!(target: "ingest", error = %err, kind = err.kind(), provider = kind.as_str(), "provider error");
    counter!("trends_provider_errors_total", "provider" => kind.as_str(), "kind" => err.kind()).increment(1);

    let snap = if opts.fallback_on_failure {
        counter!("trends_fallback_total", "provider" => kind.as_str()).increment(1);
        example_snapshot(kind, now, opts.tz, Some(err.to_string()))
    } else {
        Snapshot::error(kind.meta(), err.to_string(), now, opts.tz)
    };
    match stats {
        Some(s) => snap.with_debug(s),
        None => snap,
    }
}

/// Fetch and process one provider.
pub async fn run_once(provider: &dyn TrendProvider, opts: RunOptions) -> Snapshot {
    ensure_metrics_described();
    let body = provider.fetch().await;
    let now = Utc::now();
    let snap = build_snapshot(provider, body, now, opts);
    gauge!("trends_last_run_ts", "provider" => provider.name()).set(now.timestamp() as f64);
    snap
}

/// Run providers sequentially, in the given order.
pub async fn run_all(providers: &[Box<dyn TrendProvider>], opts: RunOptions) -> Vec<(SourceKind, Snapshot)> {
    let mut out = Vec::with_capacity(providers.len());
    for p in providers {
        let snap = run_once(p.as_ref(), opts).await;
        out.push((p.kind(), snap));
    }
    out
}
