// src/ingest/providers/twitter_trending.rs
//! twitter-trending.com: trends come from an embedded JSON-LD `ItemList`;
//! the "N minutes ago" labels only exist in the visible HTML and are matched
//! to list items by index.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use super::{element_text, mentions_age, selector};
use crate::error::ScrapeError;
use crate::ingest::fetch::PageSource;
use crate::ingest::types::{Extraction, SourceKind, TrendProvider};
use crate::trend::{RawCandidate, VolumeInput};

/// Anything shorter is a challenge/blocked page, not the trends page.
const MIN_HTML_LEN: usize = 2000;

static JSON_LD: Lazy<Selector> = Lazy::new(|| selector(r#"script[type="application/ld+json"]"#));
static TREND_ITEM: Lazy<Selector> = Lazy::new(|| selector("div.trend-item"));
static TREND_LI: Lazy<Selector> = Lazy::new(|| selector("li.trend"));
static TIME_SPAN: Lazy<Selector> = Lazy::new(|| selector("span.time"));
static SPAN: Lazy<Selector> = Lazy::new(|| selector("span"));

const PROBE: &[&str] = &[
    r#"script[type="application/ld+json"]"#,
    "div.trend-item",
    "li.trend",
    "span.time",
];

#[derive(Debug, Deserialize)]
struct ItemList {
    #[serde(rename = "@type")]
    kind: Option<String>,
    #[serde(rename = "itemListElement")]
    items: Option<Vec<ListItem>>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(rename = "@type")]
    kind: Option<String>,
    position: Option<Value>,
    name: Option<String>,
    #[serde(rename = "Tweet Count")]
    tweet_count: Option<Value>,
    url: Option<String>,
    #[serde(rename = "dateCreated")]
    date_created: Option<String>,
}

pub struct TwitterTrendingProvider {
    source: PageSource,
    max: usize,
}

impl TwitterTrendingProvider {
    pub fn new(source: PageSource) -> Self {
        Self { source, max: 40 }
    }

    pub fn from_fixture(html: &str) -> Self {
        Self::new(PageSource::fixture(html))
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    pub fn parse_page(&self, html: &str) -> Result<Extraction, ScrapeError> {
        if html.len() < MIN_HTML_LEN {
            return Err(ScrapeError::structural(format!(
                "page too short ({} chars)",
                html.len()
            )));
        }

        let doc = Html::parse_document(html);
        let items = find_item_list(&doc)
            .ok_or_else(|| ScrapeError::structural("JSON-LD ItemList"))?;
        if items.is_empty() {
            return Err(ScrapeError::structural("empty itemListElement"));
        }
        let ages = visible_ages(&doc);

        let mut out = Extraction::default();
        for (idx, item) in items.into_iter().take(self.max).enumerate() {
            out.stats.rows_processed += 1;
            if item.kind.as_deref() != Some("ListItem") {
                continue;
            }

            let name = item.name.unwrap_or_default();
            if name.trim().is_empty() {
                out.stats.dropped += 1;
                continue;
            }

            let position = item.position.as_ref().and_then(json_u32);
            let mut cand = RawCandidate::new(name, volume_of(item.tweet_count.as_ref()))
                .with_rank(position.unwrap_or(idx as u32 + 1));

            // by list index first, then by the declared position
            let age_at = |i: usize| ages.get(i).cloned().flatten();
            let age = age_at(idx).or_else(|| position.and_then(|p| age_at((p as usize).checked_sub(1)?)));
            if let Some(age) = age {
                cand = cand.with_relative_time(age);
            }
            if let Some(created) = item.date_created.filter(|d| !d.trim().is_empty()) {
                cand = cand.with_creation_timestamp(created);
            }
            if let Some(url) = item.url {
                cand = cand.with_href(url);
            }
            out.candidates.push(cand);
        }

        Ok(out)
    }
}

/// First JSON-LD block that is an `ItemList` with an `itemListElement`.
/// Blocks may be single objects or arrays of objects.
fn find_item_list(doc: &Html) -> Option<Vec<ListItem>> {
    for script in doc.select(&JSON_LD) {
        let body: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&body) else {
            tracing::debug!(target: "ingest", "unparseable JSON-LD block skipped");
            continue;
        };
        let objects = match value {
            Value::Array(v) => v,
            other => vec![other],
        };
        for obj in objects {
            if let Ok(list) = serde_json::from_value::<ItemList>(obj) {
                if list.kind.as_deref() == Some("ItemList") {
                    if let Some(items) = list.items {
                        return Some(items);
                    }
                }
            }
        }
    }
    None
}

/// Relative-age label per trend element, in document order. Elements
/// without one keep their slot as `None` so indexes stay aligned.
fn visible_ages(doc: &Html) -> Vec<Option<String>> {
    let mut elements: Vec<_> = doc.select(&TREND_ITEM).collect();
    if elements.is_empty() {
        elements = doc.select(&TREND_LI).collect();
    }

    elements
        .into_iter()
        .map(|el| {
            el.select(&TIME_SPAN)
                .next()
                .map(element_text)
                .or_else(|| el.select(&SPAN).map(element_text).find(|t| mentions_age(t)))
                .filter(|t| !t.is_empty())
        })
        .collect()
}

fn json_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn volume_of(v: Option<&Value>) -> VolumeInput {
    match v {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => VolumeInput::Count(i),
            None => VolumeInput::Count(n.as_f64().map(|f| f.trunc() as i64).unwrap_or(0)),
        },
        Some(Value::String(s)) => VolumeInput::Text(s.clone()),
        _ => VolumeInput::Missing,
    }
}

#[async_trait]
impl TrendProvider for TwitterTrendingProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::TwitterTrending
    }

    async fn fetch(&self) -> Result<String, ScrapeError> {
        self.source.load().await
    }

    fn extract_candidates(&self, raw: &str) -> Result<Extraction, ScrapeError> {
        self.parse_page(raw)
    }

    fn probe_selectors(&self) -> &'static [&'static str] {
        PROBE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(ld: &str, body: &str) -> String {
        format!(
            "<html><head><script type=\"application/ld+json\">{ld}</script></head><body>{body}<!-- {pad} --></body></html>",
            pad = "x".repeat(MIN_HTML_LEN)
        )
    }

    #[test]
    fn item_list_with_times() {
        let ld = json!({
            "@context": "https://schema.org",
            "@type": "ItemList",
            "itemListElement": [
                {"@type": "ListItem", "position": 1, "name": "Carlos Manzo", "Tweet Count": 1000,
                 "url": "https://x.com/search?q=Carlos%20Manzo", "dateCreated": "2025-11-02T18:00:00Z"},
                {"@type": "ListItem", "position": "2", "name": "#FueClaudia", "Tweet Count": "28K"},
                {"@type": "Thing", "name": "skip me"},
                {"@type": "ListItem", "position": 4, "name": "  "}
            ]
        });
        let body = r#"<div class="trend-item"><span class="time">3 minutes ago</span></div>
<div class="trend-item"><span>#FueClaudia</span><span>just now</span></div>"#;
        let html = page(&ld.to_string(), body);

        let out = TwitterTrendingProvider::from_fixture(&html).parse_page(&html).unwrap();
        assert_eq!(out.stats.rows_processed, 4);
        assert_eq!(out.stats.dropped, 1);
        assert_eq!(out.candidates.len(), 2);

        let a = &out.candidates[0];
        assert_eq!(a.volume, VolumeInput::Count(1000));
        assert_eq!(a.relative_time_text.as_deref(), Some("3 minutes ago"));
        assert_eq!(a.creation_timestamp.as_deref(), Some("2025-11-02T18:00:00Z"));

        let b = &out.candidates[1];
        assert_eq!(b.rank_hint, Some(2));
        assert_eq!(b.volume, VolumeInput::Text("28K".into()));
        assert_eq!(b.relative_time_text.as_deref(), Some("just now"));
    }

    #[test]
    fn array_blocks_and_non_list_blocks() {
        let ld = json!([
            {"@type": "WebSite", "name": "twitter-trending"},
            {"@type": "ItemList", "itemListElement": [{"@type": "ListItem", "name": "Uno"}]}
        ]);
        let html = page(&ld.to_string(), "");
        let out = TwitterTrendingProvider::from_fixture(&html).parse_page(&html).unwrap();
        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.candidates[0].rank_hint, Some(1));
        assert_eq!(out.candidates[0].volume, VolumeInput::Missing);
    }

    #[test]
    fn short_page_and_missing_list() {
        let p = TwitterTrendingProvider::from_fixture("");
        assert_eq!(p.parse_page("<html>Just a moment...</html>").unwrap_err().kind(), "structure");

        let html = page(r#"{"@type":"WebSite"}"#, "");
        assert!(matches!(
            p.parse_page(&html),
            Err(ScrapeError::StructuralAbsence(ref s)) if s == "JSON-LD ItemList"
        ));

        let html = page(r#"{"@type":"ItemList","itemListElement":[]}"#, "");
        assert!(p.parse_page(&html).is_err());
    }

    #[test]
    fn li_trend_fallback_selector() {
        let ld = json!({"@type": "ItemList", "itemListElement": [
            {"@type": "ListItem", "position": 1, "name": "Uno"}
        ]});
        let html = page(&ld.to_string(), r#"<ul><li class="trend"><span>Uno</span><span>7 minutes ago</span></li></ul>"#);
        let out = TwitterTrendingProvider::from_fixture(&html).parse_page(&html).unwrap();
        assert_eq!(out.candidates[0].relative_time_text.as_deref(), Some("7 minutes ago"));
    }

    #[test]
    fn empty_age_slot_falls_back_to_declared_position() {
        let ld = json!({"@type": "ItemList", "itemListElement": [
            {"@type": "ListItem", "position": 2, "name": "Dos"}
        ]});
        let body = r#"<div class="trend-item"><span>Uno</span></div>
<div class="trend-item"><span>Dos</span><span class="time">4 minutes ago</span></div>"#;
        let html = page(&ld.to_string(), body);
        let out = TwitterTrendingProvider::from_fixture(&html).parse_page(&html).unwrap();
        assert_eq!(out.candidates[0].rank_hint, Some(2));
        assert_eq!(out.candidates[0].relative_time_text.as_deref(), Some("4 minutes ago"));
    }
}
