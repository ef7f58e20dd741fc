use monitor_core::UsageDelta;
use rusqlite::{Connection, TransactionBehavior, params};
use tracing::debug;

use crate::Db;
use crate::error::Result;
use crate::helpers::to_sql_int;

// The additions run inside SQLite against the committed row, so concurrent
// writers to the same identity compose instead of overwriting each other.
const UPSERT_USAGE: &str = r#"
INSERT INTO usage_record (
  date, provider, credential_fingerprint, model,
  input_tokens, output_tokens, cache_read_tokens, cache_creation_tokens, cost_nanos
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
ON CONFLICT (date, provider, credential_fingerprint, model) DO UPDATE SET
  input_tokens = usage_record.input_tokens + excluded.input_tokens,
  output_tokens = usage_record.output_tokens + excluded.output_tokens,
  cache_read_tokens = usage_record.cache_read_tokens + excluded.cache_read_tokens,
  cache_creation_tokens = usage_record.cache_creation_tokens + excluded.cache_creation_tokens,
  cost_nanos = usage_record.cost_nanos + excluded.cost_nanos,
  updated_at = CURRENT_TIMESTAMP
"#;

impl Db {
    /// Adds `delta` to its ledger row, creating the row on first sight.
    ///
    /// One statement, so either every counter moves or none does.
    pub fn record_usage(&self, delta: &UsageDelta) -> Result<()> {
        upsert(&self.conn, delta)
    }

    /// Applies all deltas in one write transaction.
    ///
    /// A failure rolls back the whole batch, which lets a caller retry a
    /// fetch without double counting the part that went through.
    pub fn record_usage_batch(&mut self, deltas: &[UsageDelta]) -> Result<usize> {
        if deltas.is_empty() {
            return Ok(0);
        }
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for delta in deltas {
            upsert(&tx, delta)?;
        }
        tx.commit()?;
        debug!(rows = deltas.len(), "recorded usage batch");
        Ok(deltas.len())
    }
}

fn upsert(conn: &Connection, delta: &UsageDelta) -> Result<()> {
    let tokens = &delta.tokens;
    let mut stmt = conn.prepare_cached(UPSERT_USAGE)?;
    stmt.execute(params![
        delta.date.as_str(),
        delta.provider,
        delta.credential.as_str(),
        delta.model,
        to_sql_int("input_tokens", tokens.input_tokens)?,
        to_sql_int("output_tokens", tokens.output_tokens)?,
        to_sql_int("cache_read_tokens", tokens.cache_read_tokens)?,
        to_sql_int("cache_creation_tokens", tokens.cache_creation_tokens)?,
        to_sql_int("cost", delta.cost.nanos())?,
    ])?;
    Ok(())
}
