// src/fallback.rs
//! Deterministic example snapshots used when a source yields no real trends.
//!
//! The examples go through the same normalizer as scraped data, so their shape
//! is identical; only the status tells them apart.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::ingest::types::{SourceFamily, SourceKind};
use crate::snapshot::{Snapshot, SnapshotStatus};
use crate::trend::{normalize_candidate, NormalizeOptions, RawCandidate, VolumeInput};

const TWITTER_EXAMPLES: &[(&str, ExampleVolume, u32)] = &[
    ("Carlos Manzo", ExampleVolume::Count(1000), 5),
    ("#FueClaudia", ExampleVolume::Label("28K"), 8),
    ("Michoacán", ExampleVolume::Label("180K+"), 12),
];

const GOOGLE_EXAMPLES: &[(&str, &str)] = &[
    ("américa - león", "200K+"),
    ("carlos manzo", "200K+"),
    ("monterrey - tigres", "200K+"),
    ("atlas - toluca", "200K+"),
    ("real madrid - valencia c.f.", "200K+"),
    ("hora cd juarez", "50K+"),
    ("al-nassr - al feiha", "20K+"),
    ("west ham - newcastle", "10K+"),
    ("hellas verona - inter", "10K+"),
    ("hector terrenes", "20K+"),
];

#[derive(Debug, Clone, Copy)]
enum ExampleVolume {
    Count(i64),
    Label(&'static str),
}

/// Status the example data of a source is tagged with.
pub fn fallback_status(kind: SourceKind) -> SnapshotStatus {
    match kind.family() {
        SourceFamily::Twitter => SnapshotStatus::ExampleData,
        SourceFamily::Google => SnapshotStatus::Fallback,
    }
}

/// Raw candidates of the example list, in rank order.
pub fn example_candidates(kind: SourceKind) -> Vec<RawCandidate> {
    match kind.family() {
        SourceFamily::Twitter => TWITTER_EXAMPLES
            .iter()
            .enumerate()
            .map(|(i, (name, volume, minutes))| {
                let volume = match volume {
                    ExampleVolume::Count(n) => VolumeInput::Count(*n),
                    ExampleVolume::Label(l) => VolumeInput::Text((*l).to_string()),
                };
                RawCandidate::new(*name, volume)
                    .with_rank(i as u32 + 1)
                    .with_relative_time(format!("{minutes} minutes ago"))
            })
            .collect(),
        SourceFamily::Google => GOOGLE_EXAMPLES
            .iter()
            .enumerate()
            .map(|(i, (name, label))| {
                RawCandidate::new(*name, VolumeInput::Text((*label).to_string()))
                    .with_rank(i as u32 + 1)
            })
            .collect(),
    }
}

/// Example snapshot for `kind`. `reason` ends up in the `error` field.
pub fn example_snapshot(
    kind: SourceKind,
    now: DateTime<Utc>,
    tz: Tz,
    reason: Option<String>,
) -> Snapshot {
    let opts = NormalizeOptions {
        tz,
        interest_scale: kind.interest_scale(),
    };
    let trends = example_candidates(kind)
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| normalize_candidate(raw, i as u32 + 1, now, opts))
        .collect();

    tracing::warn!(
        target: "ingest",
        provider = kind.as_str(),
        reason = reason.as_deref().unwrap_or("requested"),
        "using example data"
    );

    let snap = Snapshot::new(kind.meta(), trends, fallback_status(kind), now, tz);
    match reason {
        Some(r) => snap.with_error(r),
        None => snap,
    }
}
