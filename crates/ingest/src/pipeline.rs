use monitor_core::{CredentialFingerprint, PricingTable, UsageDate};
use monitor_db::Db;
use tracing::{info, warn};

use crate::client::ProviderClient;
use crate::pricing::{PricedBatch, price_lines};
use crate::types::{IngestIssue, IngestStats, Result};

/// Writes one fetch's deltas as a single ledger batch.
pub fn ingest_day(db: &mut Db, batch: &PricedBatch) -> Result<usize> {
    Ok(db.record_usage_batch(&batch.deltas)?)
}

/// Fetches `date` for every key of one provider and records the results.
///
/// A failing key is reported in `issues` and does not stop the others.
/// Ledger failures are fatal and end the run.
pub async fn ingest_provider(
    db: &mut Db,
    http: &reqwest::Client,
    client: &ProviderClient,
    keys: &[String],
    date: &UsageDate,
    table: &PricingTable,
    dry_run: bool,
) -> Result<IngestStats> {
    let provider = client.provider();
    let mut stats = IngestStats {
        dry_run,
        ..IngestStats::default()
    };

    for key in keys {
        let fingerprint = CredentialFingerprint::of(key);
        let lines = match client.fetch_day(http, key, date).await {
            Ok(lines) => lines,
            Err(err) => {
                warn!(provider, credential = %fingerprint, date = %date, error = %err, "usage fetch failed");
                stats.issues.push(IngestIssue {
                    provider: provider.to_string(),
                    credential: fingerprint.to_string(),
                    date: date.to_string(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        stats.keys_fetched += 1;
        stats.lines_fetched += lines.len();

        let batch = price_lines(table, provider, key, &lines);
        stats.unpriced_models.extend(batch.unpriced_models.iter().cloned());
        if !dry_run {
            stats.rows_written += ingest_day(db, &batch)?;
        }
        info!(
            provider,
            credential = %fingerprint,
            date = %date,
            lines = lines.len(),
            dry_run,
            "fetched usage"
        );
    }

    Ok(stats)
}
