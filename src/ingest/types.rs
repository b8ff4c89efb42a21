// src/ingest/types.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;
use crate::snapshot::{ExtractStats, SourceMeta};
use crate::trend::RawCandidate;

const COUNTRY: &str = "México";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// xtrends.iamrohit.in HTML table.
    XTrends,
    /// twitter-trending.com JSON-LD ItemList.
    TwitterTrending,
    /// Google Trends "trending now" page.
    GoogleTrends,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFamily {
    Twitter,
    Google,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [Self::XTrends, Self::TwitterTrending, Self::GoogleTrends];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::XTrends => "xtrends",
            Self::TwitterTrending => "twitter-trending",
            Self::GoogleTrends => "google-trends",
        }
    }

    pub fn family(self) -> SourceFamily {
        match self {
            Self::XTrends | Self::TwitterTrending => SourceFamily::Twitter,
            Self::GoogleTrends => SourceFamily::Google,
        }
    }

    pub fn meta(self) -> SourceMeta {
        match self {
            Self::XTrends => SourceMeta {
                source: "xtrends.iamrohit.in",
                platform: "Twitter/X",
                country: COUNTRY,
            },
            Self::TwitterTrending => SourceMeta {
                source: "twitter-trending.com",
                platform: "Twitter/X",
                country: COUNTRY,
            },
            Self::GoogleTrends => SourceMeta {
                source: "Google Trends",
                platform: "Google Trends",
                country: COUNTRY,
            },
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            Self::XTrends => "https://xtrends.iamrohit.in/mexico",
            Self::TwitterTrending => "https://www.twitter-trending.com/mexico/en",
            Self::GoogleTrends => "https://trends.google.com/trending?geo=MX&hours=24",
        }
    }

    /// File the snapshot of this source is written to inside the output dir.
    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::XTrends => "twitter_trends_data.json",
            Self::TwitterTrending => "twitter_trending_com_data.json",
            Self::GoogleTrends => "trends_data.json",
        }
    }

    /// Whether records carry a relative age or creation time. Google Trends
    /// publishes neither, so the freshness gate does not apply to it.
    pub fn publishes_ages(self) -> bool {
        self.family() == SourceFamily::Twitter
    }

    /// Google publishes coarse buckets, so its records carry an interest score.
    pub fn interest_scale(self) -> bool {
        self.family() == SourceFamily::Google
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xtrends" => Ok(Self::XTrends),
            "twitter-trending" | "twitter_trending" => Ok(Self::TwitterTrending),
            "google-trends" | "google_trends" | "google" => Ok(Self::GoogleTrends),
            other => anyhow::bail!("unknown source: {other}"),
        }
    }
}

/// Candidates one page yielded plus extraction counters.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub candidates: Vec<RawCandidate>,
    pub stats: ExtractStats,
}

/// A thin per-site adapter: fetch the page and pull candidate fields out of
/// it. All normalization happens downstream.
#[async_trait]
pub trait TrendProvider: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(&self) -> Result<String, ScrapeError>;

    fn extract_candidates(&self, raw: &str) -> Result<Extraction, ScrapeError>;

    /// Fewer normalized records than this counts as a failed scrape.
    fn min_records(&self) -> usize {
        1
    }

    /// Selectors reported by `inspect`.
    fn probe_selectors(&self) -> &'static [&'static str] {
        &[]
    }

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}
