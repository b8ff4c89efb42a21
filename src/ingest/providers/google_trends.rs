// src/ingest/providers/google_trends.rs
//! Google Trends "trending now" for MX. Term names and search-volume labels
//! sit in two sibling lists of divs that are paired by index.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::{element_text, selector};
use crate::error::ScrapeError;
use crate::ingest::fetch::PageSource;
use crate::ingest::types::{Extraction, SourceKind, TrendProvider};
use crate::trend::{normalize_volume, RawCandidate, VolumeInput};

/// With five or fewer real rows the page is treated as not rendered.
const MIN_RECORDS: usize = 6;

static NAME: Lazy<Selector> = Lazy::new(|| selector("div.mZ3RIc"));
static VOLUME: Lazy<Selector> = Lazy::new(|| selector("div.qNpYPd"));
static RE_MIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*\bmil\b").expect("mil regex"));
static RE_MILLION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:[.,]\d+)?)\s*(?:m|mill\.?|mill[oó]n(?:es)?)(?:\s|\+|$)").expect("million regex")
});

const PROBE: &[&str] = &["div.mZ3RIc", "div.qNpYPd", "table", "tr[jsname]"];

pub struct GoogleTrendsProvider {
    source: PageSource,
    max: usize,
}

impl GoogleTrendsProvider {
    pub fn new(source: PageSource) -> Self {
        Self { source, max: 25 }
    }

    pub fn from_fixture(html: &str) -> Self {
        Self::new(PageSource::fixture(html))
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    pub fn parse_lists(&self, html: &str) -> Result<Extraction, ScrapeError> {
        let doc = Html::parse_document(html);
        let names: Vec<String> = doc.select(&NAME).map(element_text).collect();
        if names.is_empty() {
            return Err(ScrapeError::structural("div.mZ3RIc"));
        }
        let volumes: Vec<String> = doc.select(&VOLUME).map(element_text).collect();
        if names.len() != volumes.len() {
            tracing::debug!(
                target: "ingest",
                names = names.len(),
                volumes = volumes.len(),
                "name/volume lists differ in length"
            );
        }

        let mut out = Extraction::default();
        for (name, label) in names.into_iter().zip(volumes) {
            if out.candidates.len() >= self.max {
                break;
            }
            out.stats.rows_processed += 1;

            if name.chars().count() < 2 || name.contains("Explorar") {
                out.stats.dropped += 1;
                continue;
            }
            if label.is_empty() {
                out.stats.dropped += 1;
                continue;
            }

            let count = label_count(&label);
            let rank = out.candidates.len() as u32 + 1;
            out.candidates
                .push(RawCandidate::new(name, VolumeInput::Labeled { count, label }).with_rank(rank));
        }

        Ok(out)
    }
}

/// Count behind a volume label: "2 M+" and "1 millón+" are millions,
/// "200 mil+" is thousands.
pub fn label_count(label: &str) -> i64 {
    if let Some(caps) = RE_MILLION.captures(label) {
        let n: f64 = caps[1].replace(',', ".").parse().unwrap_or(0.0);
        return (n * 1_000_000.0).trunc() as i64;
    }
    normalize_volume(&canonical_label(label))
}

/// "200 mil+" -> "200K+".
pub fn canonical_label(label: &str) -> String {
    RE_MIL.replace_all(label, "K").into_owned()
}

#[async_trait]
impl TrendProvider for GoogleTrendsProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::GoogleTrends
    }

    async fn fetch(&self) -> Result<String, ScrapeError> {
        self.source.load().await
    }

    fn extract_candidates(&self, raw: &str) -> Result<Extraction, ScrapeError> {
        self.parse_lists(raw)
    }

    fn min_records(&self) -> usize {
        MIN_RECORDS
    }

    fn probe_selectors(&self) -> &'static [&'static str] {
        PROBE
    }
}
