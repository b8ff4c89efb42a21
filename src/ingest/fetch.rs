// src/ingest/fetch.rs
//! Page loading for the providers: either an HTTP GET with browser-like
//! headers and a randomized pre-request pause, or a fixture held in memory.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER};
use reqwest::StatusCode;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::ScrapeError;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

pub struct HttpFetcher {
    client: reqwest::Client,
    jitter_ms: (u64, u64),
}

impl HttpFetcher {
    pub fn new(cfg: &HttpConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        if let Ok(lang) = HeaderValue::from_str(&cfg.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, lang);
        }

        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .map_err(ScrapeError::Client)?;

        let lo = cfg.jitter_min_ms.min(cfg.jitter_max_ms);
        let hi = cfg.jitter_min_ms.max(cfg.jitter_max_ms);
        Ok(Self {
            client,
            jitter_ms: (lo, hi),
        })
    }

    /// No pause before requests. Used by tests against a local mock server.
    pub fn without_jitter(mut self) -> Self {
        self.jitter_ms = (0, 0);
        self
    }

    pub async fn get_text(&self, url: &str, referer: Option<&str>) -> Result<String, ScrapeError> {
        let pause = self.jitter();
        if !pause.is_zero() {
            tracing::debug!(target: "ingest", url, pause_ms = pause.as_millis() as u64, "pre-request pause");
            tokio::time::sleep(pause).await;
        }

        let mut req = self.client.get(url);
        if let Some(r) = referer {
            req = req.header(REFERER, r);
        }

        let resp = req.send().await.map_err(|e| classify(url, e))?;
        let status = resp.status();
        tracing::debug!(target: "ingest", url, status = status.as_u16(), "response");

        if is_blocking_status(status) {
            return Err(ScrapeError::Blocked {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(ScrapeError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| classify(url, e))
    }

    fn jitter(&self) -> Duration {
        let (lo, hi) = self.jitter_ms;
        if hi == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

fn is_blocking_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    )
}

fn classify(url: &str, e: reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Fetch {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Where a provider gets its page from.
#[derive(Clone)]
pub enum PageSource {
    Fixture(String),
    Http {
        url: String,
        referer: Option<String>,
        fetcher: Arc<HttpFetcher>,
    },
}

impl PageSource {
    pub fn fixture(content: &str) -> Self {
        Self::Fixture(content.to_string())
    }

    pub fn fixture_file(path: &Path) -> Result<Self, ScrapeError> {
        Ok(Self::Fixture(std::fs::read_to_string(path)?))
    }

    pub fn http(url: impl Into<String>, fetcher: Arc<HttpFetcher>) -> Self {
        Self::Http {
            url: url.into(),
            referer: None,
            fetcher,
        }
    }

    pub fn with_referer(self, referer: impl Into<String>) -> Self {
        match self {
            Self::Http { url, fetcher, .. } => Self::Http {
                url,
                referer: Some(referer.into()),
                fetcher,
            },
            fixture => fixture,
        }
    }

    pub async fn load(&self) -> Result<String, ScrapeError> {
        match self {
            Self::Fixture(s) => Ok(s.clone()),
            Self::Http {
                url,
                referer,
                fetcher,
            } => fetcher.get_text(url, referer.as_deref()).await,
        }
    }
}
