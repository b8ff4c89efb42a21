// tests/providers_twitter_trending.rs
use chrono::{TimeZone, Utc};
use std::fs;
use trends_mx::ingest::providers::twitter_trending::TwitterTrendingProvider;
use trends_mx::ingest::types::TrendProvider;
use trends_mx::ingest::{build_snapshot, RunOptions};
use trends_mx::SnapshotStatus;

const MX: chrono_tz::Tz = chrono_tz::America::Mexico_City;

#[tokio::test]
async fn json_ld_with_visible_times() {
    let html = fs::read_to_string("tests/fixtures/twitter_trending_mexico.html")
        .expect("missing tests/fixtures/twitter_trending_mexico.html");
    let provider = TwitterTrendingProvider::from_fixture(&html);
    let now = Utc.with_ymd_and_hms(2025, 11, 2, 18, 30, 0).unwrap();

    let snap = build_snapshot(&provider, provider.fetch().await, now, RunOptions::new(MX));
    assert_eq!(snap.status, SnapshotStatus::Success);
    assert_eq!(snap.source, "twitter-trending.com");
    assert_eq!(snap.total_count, 4);

    let t = &snap.trends;
    // visible "3 minutes ago" beats dateCreated (90 minutes)
    assert_eq!(t[0].term, "Carlos Manzo");
    assert_eq!(t[0].minutes_elapsed, Some(3));
    assert_eq!(t[0].volume, -1);
    assert_eq!(t[0].resolved_time.iso_string, "2025-11-02T11:00:00-06:00");

    // no visible time: dateCreated is used
    assert_eq!(t[1].minutes_elapsed, Some(20));
    assert_eq!(t[1].volume, 28_000);
    assert_eq!(t[1].volume_raw, "28000");

    assert_eq!(t[2].term, "Michoacán");
    assert_eq!(t[2].volume, 180_000);
    assert_eq!(t[2].minutes_elapsed, Some(45));

    // "2 hours ago" is unparseable as minutes, so dateCreated again
    assert_eq!(t[3].minutes_elapsed, Some(120));
    assert_eq!(t[3].volume, 0);
    assert_eq!(t[3].source_url.as_deref(), Some("https://twitter.com/search?q=D%C3%ADa%20de%20Muertos"));

    assert_eq!(snap.data_source_updated_time.minutes_ago, Some(3));
}

#[test]
fn challenge_page_falls_back() {
    let provider = TwitterTrendingProvider::from_fixture("");
    let now = Utc.with_ymd_and_hms(2025, 11, 2, 18, 30, 0).unwrap();
    let snap = build_snapshot(
        &provider,
        Ok("<html><body>Checking your browser</body></html>".to_string()),
        now,
        RunOptions::new(MX),
    );
    assert_eq!(snap.status, SnapshotStatus::ExampleData);
    assert_eq!(snap.total_count, 3);
    assert!(snap.error.as_deref().unwrap_or_default().contains("too short"));
}
