// src/trend/age.rs
//! Trend age: relative "N minutes ago" text, ISO-8601 creation timestamps,
//! and reconstruction of the absolute time in the target zone.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseFailure;
use crate::trend::DecomposedTimestamp;

static RE_MINUTES_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s+minutes?\s+ago").expect("minutes-ago regex"));

/// Minutes since the trend was updated, from page-visible text.
///
/// Only minute-granularity ages are kept; anything in hours or days is out of
/// the relevance window and yields `None`, as does unrecognized text.
pub fn parse_relative_age(text: &str) -> Option<i64> {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return None;
    }

    if let Some(caps) = RE_MINUTES_AGO.captures(&t) {
        if let Some(n) = caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok()) {
            return Some(n);
        }
    }

    if t.contains("hour") || t.contains("day") {
        tracing::trace!(target: "normalize", text = %t, "stale relative age");
        return None;
    }

    if t == "now" || t.contains("just now") {
        return Some(0);
    }

    tracing::debug!(target: "normalize", text = %t, "unknown relative age format");
    None
}

/// Parse an ISO-8601 creation timestamp. "Z" is accepted as UTC; a timestamp
/// without any offset is taken to be UTC.
pub fn parse_creation_time(iso: &str) -> Result<DateTime<Utc>, ParseFailure> {
    let s = iso.trim();
    if s.is_empty() {
        return Err(ParseFailure::new("creation timestamp", iso, "empty input"));
    }

    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => {
            for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Ok(Utc.from_utc_datetime(&naive));
                }
            }
            Err(ParseFailure::new("creation timestamp", iso, rfc_err))
        }
    }
}

/// Whole minutes between `iso` and `now`, floored. Future timestamps count
/// as zero. Parse errors are logged and absorbed.
pub fn parse_age_from_timestamp(iso: &str, now: DateTime<Utc>) -> Option<i64> {
    match parse_creation_time(iso) {
        Ok(created) => {
            let secs = (now - created).num_seconds();
            Some(secs.div_euclid(60).max(0))
        }
        Err(e) => {
            tracing::debug!(target: "normalize", error = %e, "creation timestamp ignored");
            None
        }
    }
}

/// Page-visible relative text wins; the structured creation timestamp is the
/// fallback when the text is missing or unparseable.
pub fn resolve_minutes_elapsed(
    relative_text: Option<&str>,
    creation_iso: Option<&str>,
    now: DateTime<Utc>,
) -> Option<i64> {
    relative_text
        .and_then(parse_relative_age)
        .or_else(|| creation_iso.and_then(|iso| parse_age_from_timestamp(iso, now)))
}

/// Absolute time attributable to the trend, in `tz`.
///
/// Order: parsed creation instant, then `now - minutes_elapsed`, then `now`
/// itself as a best-effort estimate.
pub fn resolve_trend_time(
    creation_iso: Option<&str>,
    minutes_elapsed: Option<i64>,
    now: DateTime<Utc>,
    tz: Tz,
) -> DecomposedTimestamp {
    let instant = creation_iso
        .and_then(|iso| parse_creation_time(iso).ok())
        .or_else(|| {
            minutes_elapsed
                .and_then(Duration::try_minutes)
                .and_then(|d| now.checked_sub_signed(d))
        })
        .unwrap_or(now);

    DecomposedTimestamp::from_instant(instant, tz)
}
