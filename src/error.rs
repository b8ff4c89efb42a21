// src/error.rs
use thiserror::Error;

/// Failures on the fetch/extract side of a provider run.
///
/// None of these escape the ingest pipeline: a failed run is turned into an
/// `error` or fallback snapshot instead.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} was blocked (HTTP {status})")]
    Blocked { url: String, status: u16 },

    #[error("request to {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("fetch of {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http client error: {0}")]
    Client(#[source] reqwest::Error),

    #[error("fixture error: {0}")]
    Fixture(#[from] std::io::Error),

    #[error("expected page structure missing: {0}")]
    StructuralAbsence(String),
}

impl ScrapeError {
    pub fn structural(what: impl Into<String>) -> Self {
        Self::StructuralAbsence(what.into())
    }

    /// Short stable label used as a log/metrics field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Blocked { .. } => "blocked",
            Self::Http { .. } => "http",
            Self::Fetch { .. } => "fetch",
            Self::Client(_) => "client",
            Self::Fixture(_) => "fixture",
            Self::StructuralAbsence(_) => "structure",
        }
    }
}

/// A single field that could not be parsed. Always recovered locally; the
/// detail only ends up in logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not parse {what} from {input:?}: {detail}")]
pub struct ParseFailure {
    pub what: &'static str,
    pub input: String,
    pub detail: String,
}

impl ParseFailure {
    pub fn new(what: &'static str, input: &str, detail: impl ToString) -> Self {
        Self {
            what,
            input: input.to_string(),
            detail: detail.to_string(),
        }
    }
}
