// src/trend/mod.rs
//! Trend normalizer: turns the raw fields a source adapter extracted into a
//! canonical [`TrendRecord`] with a comparable volume and a resolved time in
//! the target zone.
//!
//! Everything here is pure. Malformed input degrades the affected field
//! (`0` volume, `None` age, `now` as time); only an empty term drops a record.

pub mod age;
pub mod volume;

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use age::{
    parse_age_from_timestamp, parse_creation_time, parse_relative_age, resolve_minutes_elapsed,
    resolve_trend_time,
};
pub use volume::{apply_placeholder_rule, interest_score, normalize_volume, UNKNOWN_VOLUME};

/// Wall-clock breakdown of one instant in the target zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecomposedTimestamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    #[serde(rename = "timestamp_iso")]
    pub iso_string: String,
}

impl DecomposedTimestamp {
    pub fn from_instant(instant: DateTime<Utc>, tz: Tz) -> Self {
        let local = instant.with_timezone(&tz);
        Self {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            iso_string: local.to_rfc3339(),
        }
    }
}

/// Volume as the source exposed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeInput {
    /// Human-readable label ("443.6k", "200K+", "Under 10k").
    Text(String),
    /// Integer taken directly from structured data (JSON-LD).
    Count(i64),
    /// Count the adapter derived itself; `label` is kept as `volume_raw`.
    Labeled { count: i64, label: String },
    Missing,
}

/// Fields one adapter extracted for a single candidate trend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub rank_hint: Option<u32>,
    pub name: String,
    pub volume: VolumeInput,
    pub relative_time_text: Option<String>,
    pub creation_timestamp: Option<String>,
    pub href: Option<String>,
}

impl RawCandidate {
    pub fn new(name: impl Into<String>, volume: VolumeInput) -> Self {
        Self {
            rank_hint: None,
            name: name.into(),
            volume,
            relative_time_text: None,
            creation_timestamp: None,
            href: None,
        }
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank_hint = Some(rank);
        self
    }

    pub fn with_relative_time(mut self, text: impl Into<String>) -> Self {
        self.relative_time_text = Some(text.into());
        self
    }

    pub fn with_creation_timestamp(mut self, iso: impl Into<String>) -> Self {
        self.creation_timestamp = Some(iso.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Canonical trend, built once per scrape pass and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub rank: u32,
    pub term: String,
    /// Count, or `-1` when the source only had its placeholder value.
    pub volume: i64,
    pub volume_raw: String,
    pub minutes_elapsed: Option<i64>,
    pub resolved_time: DecomposedTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_score: Option<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub tz: Tz,
    /// Also emit the 0..=100 interest bucket.
    pub interest_scale: bool,
}

impl NormalizeOptions {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            interest_scale: false,
        }
    }
}

/// Decode entities, collapse whitespace, trim.
pub fn normalize_term(s: &str) -> String {
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
    let decoded = html_escape::decode_html_entities(s);
    RE_WS.replace_all(&decoded, " ").trim().to_string()
}

/// Build one record. `position` is the 1-based fallback rank used when the
/// source gave none. Returns `None` only when the term is empty.
pub fn normalize_candidate(
    raw: &RawCandidate,
    position: u32,
    now: DateTime<Utc>,
    opts: NormalizeOptions,
) -> Option<TrendRecord> {
    let term = normalize_term(&raw.name);
    if term.is_empty() {
        tracing::debug!(target: "normalize", position, "candidate without term dropped");
        return None;
    }

    let (counted, volume_raw) = match &raw.volume {
        VolumeInput::Text(t) => (normalize_volume(t), t.trim().to_string()),
        VolumeInput::Count(n) => (*n, n.to_string()),
        VolumeInput::Labeled { count, label } => (*count, label.trim().to_string()),
        VolumeInput::Missing => (0, String::new()),
    };
    let volume = apply_placeholder_rule(counted);

    let creation = raw.creation_timestamp.as_deref();
    let minutes_elapsed = resolve_minutes_elapsed(raw.relative_time_text.as_deref(), creation, now);
    let resolved_time = resolve_trend_time(creation, minutes_elapsed, now, opts.tz);

    Some(TrendRecord {
        rank: raw.rank_hint.filter(|r| *r > 0).unwrap_or(position),
        term,
        volume,
        volume_raw,
        minutes_elapsed,
        resolved_time,
        source_url: raw
            .href
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string),
        interest_score: opts.interest_scale.then(|| interest_score(volume)),
    })
}
