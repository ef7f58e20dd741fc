use std::collections::BTreeSet;

use monitor_core::{TokenCounts, UsageDate};
use serde::Serialize;

/// One normalized usage line as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageLine {
    pub date: UsageDate,
    pub model: String,
    pub tokens: TokenCounts,
}

/// Ingest summary returned after fetching one or more provider keys.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub keys_fetched: usize,
    pub lines_fetched: usize,
    pub rows_written: usize,
    pub dry_run: bool,
    pub unpriced_models: BTreeSet<String>,
    pub issues: Vec<IngestIssue>,
}

impl IngestStats {
    pub fn merge(&mut self, other: IngestStats) {
        self.keys_fetched += other.keys_fetched;
        self.lines_fetched += other.lines_fetched;
        self.rows_written += other.rows_written;
        self.dry_run |= other.dry_run;
        self.unpriced_models.extend(other.unpriced_models);
        self.issues.extend(other.issues);
    }
}

/// A fetch that failed for one key. Other keys still run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestIssue {
    pub provider: String,
    /// Fingerprint of the key, never the key itself.
    pub credential: String,
    pub date: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("request to {provider} failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("unexpected {provider} response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
    #[error("db error: {0}")]
    Db(#[from] monitor_db::DbError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
