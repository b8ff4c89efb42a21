// src/ingest/scheduler.rs
use metrics::counter;
use tokio::task::JoinHandle;

use crate::ingest::types::TrendProvider;
use crate::ingest::{ensure_metrics_described, run_all, RunOptions};
use crate::output::{OutputPlan, PersistOutcome};

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub interval_secs: u64,
}

/// Spawn a ticker that re-runs `providers` and emits their snapshots. The
/// first tick fires immediately. Runs until the handle is aborted.
pub fn spawn_scheduler(
    cfg: SchedulerCfg,
    providers: Vec<Box<dyn TrendProvider>>,
    opts: RunOptions,
    plan: OutputPlan,
) -> JoinHandle<()> {
    ensure_metrics_described();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(cfg.interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let snapshots = run_all(&providers, opts).await;

            let mut written = 0usize;
            for (kind, snap) in &snapshots {
                match plan.emit(*kind, snap) {
                    Ok(Some(PersistOutcome::Written(_))) | Ok(None) => written += 1,
                    Ok(Some(_)) => {}
                    Err(e) => tracing::warn!(target: "ingest", error = ?e, provider = kind.as_str(), "emit failed"),
                }
            }

            counter!("trends_runs_total").increment(1);
            tracing::info!(
                target: "ingest",
                providers = snapshots.len(),
                written,
                "scheduled scrape tick"
            );
        }
    })
}
