// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod config;
pub mod error;
pub mod fallback;
pub mod freshness;
pub mod ingest;
pub mod output;
pub mod snapshot;
pub mod telemetry;
pub mod trend;

pub use crate::error::{ParseFailure, ScrapeError};
pub use crate::ingest::types::{SourceKind, TrendProvider};
pub use crate::snapshot::{Snapshot, SnapshotStatus};
pub use crate::trend::{DecomposedTimestamp, RawCandidate, TrendRecord};
