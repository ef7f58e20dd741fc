mod client;
mod pipeline;
mod pricing;
mod types;

pub use client::{
    ANTHROPIC_API_VERSION, ANTHROPIC_BASE_URL, OPENAI_BASE_URL, ProviderClient, REQUEST_TIMEOUT,
    http_client,
};
pub use pipeline::{ingest_day, ingest_provider};
pub use pricing::{PricedBatch, price_lines};
pub use types::{IngestError, IngestIssue, IngestStats, Result, UsageLine};
