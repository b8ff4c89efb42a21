// tests/fallback_examples.rs
use chrono::{TimeZone, Utc};
use trends_mx::fallback::{example_candidates, example_snapshot, fallback_status};
use trends_mx::freshness::should_persist;
use trends_mx::{SnapshotStatus, SourceKind};

const MX: chrono_tz::Tz = chrono_tz::America::Mexico_City;

#[test]
fn twitter_family_examples() {
    let now = Utc.with_ymd_and_hms(2025, 11, 2, 18, 30, 0).unwrap();
    for kind in [SourceKind::XTrends, SourceKind::TwitterTrending] {
        let snap = example_snapshot(kind, now, MX, None);
        assert_eq!(snap.status, SnapshotStatus::ExampleData);
        assert!(snap.status.is_synthetic());
        assert!(snap.error.is_none());

        let terms: Vec<_> = snap.trends.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, ["Carlos Manzo", "#FueClaudia", "Michoacán"]);
        let vols: Vec<_> = snap.trends.iter().map(|t| t.volume).collect();
        assert_eq!(vols, [-1, 28_000, 180_000]);
        let ages: Vec<_> = snap.trends.iter().map(|t| t.minutes_elapsed).collect();
        assert_eq!(ages, [Some(5), Some(8), Some(12)]);

        assert_eq!(snap.data_source_updated_time.minutes_ago, Some(5));
        assert_eq!(snap.data_source_updated_time.time.minute, 25);
        assert!(should_persist(&snap, 20));
    }
}

#[test]
fn google_examples_are_deterministic() {
    let now = Utc.with_ymd_and_hms(2025, 11, 2, 18, 30, 0).unwrap();
    let a = example_snapshot(SourceKind::GoogleTrends, now, MX, Some("timeout".into()));
    let b = example_snapshot(SourceKind::GoogleTrends, now, MX, Some("timeout".into()));
    assert_eq!(a, b);
    assert_eq!(a.status, SnapshotStatus::Fallback);
    assert_eq!(a.total_count, 10);
    assert_eq!(a.error.as_deref(), Some("timeout"));
    assert_eq!(a.trends[0].term, "américa - león");
    assert_eq!(a.trends[0].interest_score, Some(100));
    assert_eq!(a.trends[9].term, "hector terrenes");
    assert!(a.trends.iter().all(|t| t.minutes_elapsed.is_none()));
    assert!(!should_persist(&a, 20));
}

#[test]
fn status_is_never_success() {
    for kind in SourceKind::ALL {
        assert_ne!(fallback_status(kind), SnapshotStatus::Success);
        assert!(!example_candidates(kind).is_empty());
    }
}
