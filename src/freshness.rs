// src/freshness.rs
//! Write-avoidance heuristic: only overwrite a stored snapshot when the new
//! one shows at least one recently updated trend near the top of the list.

use crate::snapshot::Snapshot;

pub const DEFAULT_MAX_AGE_MINUTES: i64 = 20;
pub const DEFAULT_GATE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessGate {
    pub max_age_minutes: i64,
    /// How many leading records are inspected.
    pub window: usize,
}

impl Default for FreshnessGate {
    fn default() -> Self {
        Self {
            max_age_minutes: DEFAULT_MAX_AGE_MINUTES,
            window: DEFAULT_GATE_WINDOW,
        }
    }
}

impl FreshnessGate {
    pub fn new(max_age_minutes: i64, window: usize) -> Self {
        Self {
            max_age_minutes,
            window,
        }
    }

    pub fn should_persist(&self, snapshot: &Snapshot) -> bool {
        if snapshot.trends.is_empty() {
            tracing::info!(target: "freshness", source = %snapshot.source, "no trends; keeping stored snapshot");
            return false;
        }

        let fresh = snapshot
            .trends
            .iter()
            .take(self.window)
            .filter_map(|t| t.minutes_elapsed)
            .find(|m| *m < self.max_age_minutes);

        match fresh {
            Some(m) => {
                tracing::info!(
                    target: "freshness",
                    source = %snapshot.source,
                    minutes = m,
                    max_age = self.max_age_minutes,
                    "fresh enough to persist"
                );
                true
            }
            None => {
                tracing::info!(
                    target: "freshness",
                    source = %snapshot.source,
                    max_age = self.max_age_minutes,
                    window = self.window,
                    "nothing fresh in leading window"
                );
                false
            }
        }
    }
}

/// Gate with the default 5-record window.
pub fn should_persist(snapshot: &Snapshot, max_age_minutes: i64) -> bool {
    FreshnessGate::new(max_age_minutes, DEFAULT_GATE_WINDOW).should_persist(snapshot)
}
