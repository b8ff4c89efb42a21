// src/snapshot.rs
//! Snapshot envelope written to disk, one per source per run.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::trend::{DecomposedTimestamp, TrendRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Success,
    Error,
    Fallback,
    ExampleData,
}

impl SnapshotStatus {
    /// Trends under this status are illustrative, never scraped.
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Fallback | Self::ExampleData)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Fallback => "fallback",
            Self::ExampleData => "example_data",
        }
    }
}

/// When the source last refreshed, estimated from its freshest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUpdatedTime {
    #[serde(flatten)]
    pub time: DecomposedTimestamp,
    pub minutes_ago: Option<i64>,
}

/// Extraction counters kept for troubleshooting a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractStats {
    pub rows_processed: usize,
    pub ads_skipped: usize,
    #[serde(default)]
    pub dropped: usize,
}

/// Static description of where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMeta {
    pub source: &'static str,
    pub platform: &'static str,
    pub country: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub scraping_time: DecomposedTimestamp,
    pub data_source_updated_time: SourceUpdatedTime,
    pub country: String,
    pub platform: String,
    pub source: String,
    pub total_count: usize,
    pub trends: Vec<TrendRecord>,
    pub status: SnapshotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<ExtractStats>,
}

impl Snapshot {
    /// Assemble an envelope. Trends are ordered by rank; `total_count`
    /// always matches the list.
    pub fn new(
        meta: SourceMeta,
        mut trends: Vec<TrendRecord>,
        status: SnapshotStatus,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Self {
        trends.sort_by_key(|t| t.rank);
        let data_source_updated_time = source_updated_time(&trends, now, tz);
        Self {
            scraping_time: DecomposedTimestamp::from_instant(now, tz),
            data_source_updated_time,
            country: meta.country.to_string(),
            platform: meta.platform.to_string(),
            source: meta.source.to_string(),
            total_count: trends.len(),
            trends,
            status,
            error: None,
            debug: None,
        }
    }

    pub fn success(meta: SourceMeta, trends: Vec<TrendRecord>, now: DateTime<Utc>, tz: Tz) -> Self {
        Self::new(meta, trends, SnapshotStatus::Success, now, tz)
    }

    /// Empty envelope for a run that produced nothing and has no fallback.
    pub fn error(meta: SourceMeta, reason: impl Into<String>, now: DateTime<Utc>, tz: Tz) -> Self {
        Self::new(meta, Vec::new(), SnapshotStatus::Error, now, tz).with_error(reason)
    }

    pub fn with_error(mut self, reason: impl Into<String>) -> Self {
        self.error = Some(reason.into());
        self
    }

    pub fn with_debug(mut self, stats: ExtractStats) -> Self {
        self.debug = Some(stats);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.trends.is_empty()
    }
}

/// `now - min(minutes_elapsed)` over the records with a known age; the
/// scraping time itself (and no `minutes_ago`) otherwise.
pub fn source_updated_time(trends: &[TrendRecord], now: DateTime<Utc>, tz: Tz) -> SourceUpdatedTime {
    let freshest = trends.iter().filter_map(|t| t.minutes_elapsed).min();
    let instant = freshest
        .and_then(Duration::try_minutes)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(now);
    SourceUpdatedTime {
        time: DecomposedTimestamp::from_instant(instant, tz),
        minutes_ago: freshest,
    }
}
