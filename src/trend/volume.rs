// src/trend/volume.rs
//! Volume strings in the formats the trend sites print: "443.6k", "200K+",
//! "Under 10k", "15000", or nothing at all.

use once_cell::sync::Lazy;
use regex::Regex;

/// Value one source's structured markup emits when the real count is unknown.
pub const PLACEHOLDER_VOLUME: i64 = 1000;
/// Reported instead of [`PLACEHOLDER_VOLUME`].
pub const UNKNOWN_VOLUME: i64 = -1;
/// Fixed value for the "Under 10k" label.
pub const UNDER_10K_VOLUME: i64 = 5000;

static RE_THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\d.]+)\s*k").expect("thousands regex"));
static RE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d.]+").expect("number regex"));

/// Convert a human-readable volume label into an integer count.
///
/// Never fails: anything without an extractable number is `0`.
pub fn normalize_volume(raw: &str) -> i64 {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        return 0;
    }

    if s.contains("under 10k") {
        return UNDER_10K_VOLUME;
    }

    if s.contains('k') {
        if let Some(n) = RE_THOUSANDS
            .captures(&s)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            return truncate(n * 1000.0);
        }
    }

    // Only the first run of digits counts; "1.2.3" is unparseable, not 1.
    RE_NUMBER
        .find(&s)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(truncate)
        .unwrap_or(0)
}

/// Replace the exact placeholder value with the unknown sentinel.
///
/// Applies to every volume, whether it came from a label or straight from a
/// structured integer field. Negative counts are clamped to zero first.
pub fn apply_placeholder_rule(volume: i64) -> i64 {
    match volume.max(0) {
        PLACEHOLDER_VOLUME => UNKNOWN_VOLUME,
        v => v,
    }
}

/// Relative-interest bucket (0..=100) for sources that only publish coarse
/// volume labels. Unknown volumes sit in the middle.
pub fn interest_score(volume: i64) -> u8 {
    match volume {
        v if v >= 200_000 => 100,
        v if v >= 50_000 => 80,
        v if v >= 20_000 => 60,
        v if v >= 10_000 => 40,
        v if v >= 5_000 => 20,
        v if v > 0 => 10,
        _ => 50,
    }
}

fn truncate(n: f64) -> i64 {
    if n.is_finite() {
        n.trunc() as i64
    } else {
        0
    }
}
