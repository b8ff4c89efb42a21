// src/ingest/providers/mod.rs
pub mod google_trends;
pub mod twitter_trending;
pub mod xtrends;

use scraper::{ElementRef, Selector};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ScrapeError;
use crate::ingest::fetch::{HttpFetcher, PageSource};
use crate::ingest::types::{SourceKind, TrendProvider};

/// Compile a selector literal. Only used for the fixed selectors below.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Visible text of an element, fragments joined by single spaces.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Does this text look like a relative age ("5 minutes ago", "just now")?
pub(crate) fn mentions_age(text: &str) -> bool {
    let t = text.to_lowercase();
    t.contains("ago") || t.contains("now")
}

/// Provider for `kind` reading from `source`.
pub fn provider_for(kind: SourceKind, source: PageSource, cfg: &AppConfig) -> Box<dyn TrendProvider> {
    let max = cfg.sources.max_for(kind);
    match kind {
        SourceKind::XTrends => Box::new(xtrends::XTrendsProvider::new(source).with_max(max)),
        SourceKind::TwitterTrending => {
            Box::new(twitter_trending::TwitterTrendingProvider::new(source).with_max(max))
        }
        SourceKind::GoogleTrends => {
            Box::new(google_trends::GoogleTrendsProvider::new(source).with_max(max))
        }
    }
}

/// Live HTTP providers for `kinds`, sharing one client.
pub fn http_providers(kinds: &[SourceKind], cfg: &AppConfig) -> Result<Vec<Box<dyn TrendProvider>>, ScrapeError> {
    let fetcher = Arc::new(HttpFetcher::new(&cfg.http)?);
    Ok(kinds
        .iter()
        .map(|&kind| {
            let mut source = PageSource::http(cfg.sources.url_for(kind), fetcher.clone());
            if kind == SourceKind::TwitterTrending {
                source = source.with_referer("https://www.twitter-trending.com/");
            }
            provider_for(kind, source, cfg)
        })
        .collect())
}
