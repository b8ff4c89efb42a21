// src/ingest/probe.rs
//! Structure report for troubleshooting a source whose markup changed:
//! selector hit counts, JSON-LD types and what the adapter pulled out.

use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;

use crate::ingest::types::TrendProvider;

const SAMPLE_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorCount {
    pub selector: String,
    /// `None` when the selector itself does not parse.
    pub matches: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructureReport {
    pub source: String,
    pub html_len: usize,
    pub title: Option<String>,
    pub selectors: Vec<SelectorCount>,
    pub json_ld_types: Vec<String>,
    /// First extracted terms, or the extraction error.
    pub samples: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_error: Option<String>,
}

/// Count matches for each selector and list JSON-LD `@type`s.
pub fn probe_document(source: &str, html: &str, selectors: &[&str]) -> StructureReport {
    let doc = Html::parse_document(html);

    let selectors = selectors
        .iter()
        .map(|css| SelectorCount {
            selector: (*css).to_string(),
            matches: Selector::parse(css).ok().map(|s| doc.select(&s).count()),
        })
        .collect();

    let title = Selector::parse("title")
        .ok()
        .and_then(|s| doc.select(&s).next())
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    StructureReport {
        source: source.to_string(),
        html_len: html.len(),
        title,
        selectors,
        json_ld_types: json_ld_types(&doc),
        samples: Vec::new(),
        extract_error: None,
    }
}

fn json_ld_types(doc: &Html) -> Vec<String> {
    let Ok(sel) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };
    let mut types = Vec::new();
    for script in doc.select(&sel) {
        let body: String = script.text().collect();
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(items)) => types.extend(items.iter().filter_map(type_of)),
            Ok(v) => types.extend(type_of(&v)),
            Err(_) => types.push("<invalid>".to_string()),
        }
    }
    types
}

fn type_of(v: &Value) -> Option<String> {
    v.get("@type").and_then(Value::as_str).map(str::to_string)
}

/// Fetch the provider's page and report on it. Fetch errors propagate;
/// extraction errors land in the report.
pub async fn inspect(provider: &dyn TrendProvider) -> Result<StructureReport, crate::error::ScrapeError> {
    let html = provider.fetch().await?;
    let mut report = probe_document(provider.name(), &html, provider.probe_selectors());

    match provider.extract_candidates(&html) {
        Ok(x) => {
            report.samples = x
                .candidates
                .iter()
                .take(SAMPLE_ROWS)
                .map(|c| match &c.relative_time_text {
                    Some(age) => format!("{} ({age})", c.name),
                    None => c.name.clone(),
                })
                .collect();
        }
        Err(e) => report.extract_error = Some(e.to_string()),
    }

    tracing::debug!(target: "ingest", provider = provider.name(), html_len = report.html_len, "probed page");
    Ok(report)
}
