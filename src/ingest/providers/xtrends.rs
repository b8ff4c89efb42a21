// src/ingest/providers/xtrends.rs
//! xtrends.iamrohit.in: a plain HTML table, one `a.tweet` link per row with
//! the rank and tweet count as attributes.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::{element_text, mentions_age, selector};
use crate::error::ScrapeError;
use crate::ingest::fetch::PageSource;
use crate::ingest::types::{Extraction, SourceKind, TrendProvider};
use crate::trend::{RawCandidate, VolumeInput};

static TABLE: Lazy<Selector> = Lazy::new(|| selector("table#twitter-trends"));
static TBODY: Lazy<Selector> = Lazy::new(|| selector("tbody#copyData"));
static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static CELL: Lazy<Selector> = Lazy::new(|| selector("td"));
static AD: Lazy<Selector> = Lazy::new(|| selector("ins.adsbygoogle"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a.tweet"));

const PROBE: &[&str] = &[
    "table#twitter-trends",
    "tbody#copyData",
    "tbody#copyData tr",
    "a.tweet",
    "ins.adsbygoogle",
];

pub struct XTrendsProvider {
    source: PageSource,
    max: usize,
}

impl XTrendsProvider {
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

    pub fn parse_rows(&self, html: &str) -> Result<Extraction, ScrapeError> {
        let doc = Html::parse_document(html);
        let table = doc
            .select(&TABLE)
            .next()
            .ok_or_else(|| ScrapeError::structural("table#twitter-trends"))?;
        let tbody = table
            .select(&TBODY)
            .next()
            .ok_or_else(|| ScrapeError::structural("tbody#copyData"))?;

        let mut out = Extraction::default();
        for (idx, row) in tbody.select(&ROW).enumerate() {
            out.stats.rows_processed += 1;

            if row.select(&AD).next().is_some() {
                out.stats.ads_skipped += 1;
                tracing::trace!(target: "ingest", row = idx, "ad row skipped");
                continue;
            }

            let Some(link) = row.select(&LINK).next() else {
                tracing::trace!(target: "ingest", row = idx, "row without a.tweet");
                continue;
            };

            let name = element_text(link);
            if name.is_empty() {
                out.stats.dropped += 1;
                continue;
            }

            let attrs = link.value();
            let count = attrs
                .attr("tweetcount")
                .or_else(|| attrs.attr("tweetc"))
                .unwrap_or("0");
            let rank = attrs
                .attr("rank")
                .and_then(|r| r.trim().parse::<u32>().ok())
                .unwrap_or(out.candidates.len() as u32 + 1);

            let mut cand = RawCandidate::new(name, VolumeInput::Text(count.to_string())).with_rank(rank);
            if let Some(age) = row_age_text(row) {
                cand = cand.with_relative_time(age);
            }
            if let Some(href) = attrs.attr("href") {
                cand = cand.with_href(href);
            }
            out.candidates.push(cand);

            if out.candidates.len() >= self.max {
                break;
            }
        }

        Ok(out)
    }
}

/// The cell that reads like a relative age, else the whole row text. The
/// link's own cell is skipped so a term like "#KnowYourRights" is not taken
/// for an age.
fn row_age_text(row: ElementRef<'_>) -> Option<String> {
    let cell = row
        .select(&CELL)
        .filter(|td| td.select(&LINK).next().is_none())
        .map(element_text)
        .find(|t| mentions_age(t));
    let text = cell.unwrap_or_else(|| element_text(row));
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl TrendProvider for XTrendsProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::XTrends
    }

    async fn fetch(&self) -> Result<String, ScrapeError> {
        self.source.load().await
    }

    fn extract_candidates(&self, raw: &str) -> Result<Extraction, ScrapeError> {
        self.parse_rows(raw)
    }

    fn probe_selectors(&self) -> &'static [&'static str] {
        PROBE
    }
}
