// tests/providers_xtrends.rs
use chrono::{TimeZone, Utc};
use std::fs;
use trends_mx::ingest::providers::xtrends::XTrendsProvider;
use trends_mx::ingest::types::TrendProvider;
use trends_mx::ingest::{build_snapshot, RunOptions};
use trends_mx::SnapshotStatus;

const MX: chrono_tz::Tz = chrono_tz::America::Mexico_City;

fn fixture() -> String {
    fs::read_to_string("tests/fixtures/xtrends_mexico.html").expect("missing tests/fixtures/xtrends_mexico.html")
}

#[tokio::test]
async fn fixture_yields_normalized_snapshot() {
    let html = fixture();
    let provider = XTrendsProvider::from_fixture(&html);
    let body = provider.fetch().await;
    let now = Utc.with_ymd_and_hms(2025, 11, 2, 18, 30, 0).unwrap();

    let snap = build_snapshot(&provider, body, now, RunOptions::new(MX));
    assert_eq!(snap.status, SnapshotStatus::Success);
    assert_eq!(snap.source, "xtrends.iamrohit.in");
    assert_eq!(snap.total_count, 5);
    assert_eq!(snap.trends.len(), snap.total_count);

    let debug = snap.debug.as_ref().expect("debug stats");
    assert_eq!(debug.ads_skipped, 1);
    assert_eq!(debug.rows_processed, 6);

    let t = &snap.trends;
    assert_eq!(t[0].term, "#Michoacán");
    assert_eq!(t[0].volume, 443_600);
    assert_eq!(t[0].minutes_elapsed, Some(12));

    // placeholder count
    assert_eq!(t[1].term, "Carlos Manzo");
    assert_eq!(t[1].volume, -1);
    assert_eq!(t[1].volume_raw, "1000");

    assert_eq!(t[2].volume, 5_000);
    assert_eq!(t[2].minutes_elapsed, None);

    assert_eq!(t[3].term, "Pumas & América");
    assert_eq!(t[3].volume, 28_000);
    assert_eq!(t[3].minutes_elapsed, Some(0));

    assert_eq!(t[4].volume, 15_000);
    assert_eq!(t[4].minutes_elapsed, None);

    // freshest record is "just now"
    assert_eq!(snap.data_source_updated_time.minutes_ago, Some(0));
}

#[test]
fn probe_selectors_listed() {
    let p = XTrendsProvider::from_fixture("");
    assert!(p.probe_selectors().contains(&"tbody#copyData"));
    assert_eq!(p.min_records(), 1);
}
