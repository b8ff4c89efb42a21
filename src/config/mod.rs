// src/config/mod.rs
//! Runtime configuration: `config/trends.toml` (or `$TRENDS_CONFIG_PATH`),
//! then env overrides. Every field has a default, so a missing file is fine.

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::freshness::{FreshnessGate, DEFAULT_GATE_WINDOW, DEFAULT_MAX_AGE_MINUTES};
use crate::ingest::types::SourceKind;

pub const DEFAULT_CONFIG_PATH: &str = "config/trends.toml";
pub const DEFAULT_TIMEZONE: &str = "America/Mexico_City";

pub const ENV_CONFIG_PATH: &str = "TRENDS_CONFIG_PATH";
pub const ENV_TIMEZONE: &str = "TRENDS_TIMEZONE";
pub const ENV_OUTPUT_DIR: &str = "TRENDS_OUTPUT_DIR";
pub const ENV_MAX_AGE_MINUTES: &str = "TRENDS_MAX_AGE_MINUTES";
pub const ENV_FALLBACK: &str = "TRENDS_FALLBACK";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// IANA zone every resolved timestamp is expressed in.
    pub timezone: String,
    pub output_dir: PathBuf,
    /// Emit example data (instead of an empty `error` snapshot) when a
    /// source fails.
    pub fallback_on_failure: bool,
    pub freshness: FreshnessConfig,
    pub http: HttpConfig,
    pub sources: SourcesConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            output_dir: PathBuf::from("."),
            fallback_on_failure: true,
            freshness: FreshnessConfig::default(),
            http: HttpConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    pub enabled: bool,
    pub max_age_minutes: i64,
    pub window: usize,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_minutes: DEFAULT_MAX_AGE_MINUTES,
            window: DEFAULT_GATE_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    /// Random pause before each request, in milliseconds (inclusive range).
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "es-MX,es;q=0.9,en;q=0.8".to_string(),
            timeout_secs: 15,
            jitter_min_ms: 1_000,
            jitter_max_ms: 4_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub xtrends_url: String,
    pub twitter_trending_url: String,
    pub google_trends_url: String,
    /// Upper bound on rows taken from the Twitter/X mirrors.
    pub max_trends: usize,
    pub google_max_trends: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            xtrends_url: SourceKind::XTrends.default_url().to_string(),
            twitter_trending_url: SourceKind::TwitterTrending.default_url().to_string(),
            google_trends_url: SourceKind::GoogleTrends.default_url().to_string(),
            max_trends: 40,
            google_max_trends: 25,
        }
    }
}

impl SourcesConfig {
    pub fn url_for(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::XTrends => &self.xtrends_url,
            SourceKind::TwitterTrending => &self.twitter_trending_url,
            SourceKind::GoogleTrends => &self.google_trends_url,
        }
    }

    pub fn max_for(&self, kind: SourceKind) -> usize {
        match kind {
            SourceKind::GoogleTrends => self.google_max_trends,
            _ => self.max_trends,
        }
    }
}

impl AppConfig {
    /// Parse a TOML file. Env overrides are not applied here.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Resolution order:
    /// 1) $TRENDS_CONFIG_PATH (must exist)
    /// 2) config/trends.toml
    /// 3) built-in defaults
    ///
    /// Env overrides are applied on top, then the result is validated.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(tz) = std::env::var(ENV_TIMEZONE) {
            self.timezone = tz.trim().to_string();
        }
        if let Ok(dir) = std::env::var(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = std::env::var(ENV_MAX_AGE_MINUTES) {
            self.freshness.max_age_minutes = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_AGE_MINUTES}={raw:?} is not an integer"))?;
        }
        if let Ok(raw) = std::env::var(ENV_FALLBACK) {
            self.fallback_on_failure = parse_flag(&raw)
                .ok_or_else(|| anyhow!("{ENV_FALLBACK}={raw:?} is not a boolean"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.target_tz()?;
        if self.freshness.window == 0 {
            return Err(anyhow!("freshness.window must be at least 1"));
        }
        if self.http.jitter_min_ms > self.http.jitter_max_ms {
            return Err(anyhow!("http.jitter_min_ms exceeds http.jitter_max_ms"));
        }
        Ok(())
    }

    pub fn target_tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("unknown time zone {:?}: {e}", self.timezone))
    }

    /// `None` when gating is disabled.
    pub fn gate(&self) -> Option<FreshnessGate> {
        self.freshness
            .enabled
            .then(|| FreshnessGate::new(self.freshness.max_age_minutes, self.freshness.window))
    }

    pub fn output_path(&self, kind: SourceKind) -> PathBuf {
        self.output_dir.join(kind.default_file_name())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
output_dir = "data"

[freshness]
max_age_minutes = 30
"#,
        )
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("data"));
        assert_eq!(cfg.freshness.max_age_minutes, 30);
        assert_eq!(cfg.freshness.window, DEFAULT_GATE_WINDOW);
        assert!(cfg.freshness.enabled);
        assert_eq!(cfg.timezone, DEFAULT_TIMEZONE);
        assert_eq!(cfg.sources.max_for(SourceKind::GoogleTrends), 25);
        assert_eq!(cfg.http.timeout_secs, 15);
    }

    #[test]
    fn default_zone_parses() {
        let tz = AppConfig::default().target_tz().unwrap();
        assert_eq!(tz, chrono_tz::America::Mexico_City);
    }

    #[test]
    fn bad_zone_and_window_rejected() {
        let mut cfg = AppConfig::default();
        cfg.timezone = "Mars/Olympus".into();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.freshness.window = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn gate_follows_enabled_flag() {
        let mut cfg = AppConfig::default();
        assert_eq!(cfg.gate(), Some(FreshnessGate::new(20, 5)));
        cfg.freshness.enabled = false;
        assert_eq!(cfg.gate(), None);
    }

    #[test]
    fn flags() {
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
