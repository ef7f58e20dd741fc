use std::collections::BTreeMap;

use monitor_core::{DailyCost, DayRange, UsageRecord, UsageRow, Usd};
use rusqlite::params_from_iter;

use crate::Db;
use crate::error::Result;
use crate::helpers::{
    date_from_column, range_filter, row_to_usage_record, row_to_usage_row, usd_from_column,
};

impl Db {
    /// Rows in `range` summed per (date, provider, model), newest day first.
    pub fn query_range(&self, range: &DayRange, provider: Option<&str>) -> Result<Vec<UsageRow>> {
        let (filter, values) = range_filter(range, provider);
        let sql = format!(
            r#"
            SELECT date, provider, model,
                   SUM(input_tokens), SUM(output_tokens),
                   SUM(cache_read_tokens), SUM(cache_creation_tokens),
                   SUM(cost_nanos)
            FROM usage_record
            WHERE {filter}
            GROUP BY date, provider, model
            ORDER BY date DESC, provider ASC, model ASC
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_usage_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Zero when nothing matches.
    pub fn total_cost(&self, range: &DayRange, provider: Option<&str>) -> Result<Usd> {
        let (filter, values) = range_filter(range, provider);
        let sql = format!("SELECT COALESCE(SUM(cost_nanos), 0) FROM usage_record WHERE {filter}");
        let nanos = self
            .conn
            .query_row(&sql, params_from_iter(values.iter()), |row| {
                row.get::<_, i64>(0)
            })?;
        Ok(usd_from_column(nanos))
    }

    pub fn cost_by_model(
        &self,
        range: &DayRange,
        provider: Option<&str>,
    ) -> Result<BTreeMap<String, Usd>> {
        self.grouped_cost("model", range, provider)
    }

    pub fn cost_by_provider(&self, range: &DayRange) -> Result<BTreeMap<String, Usd>> {
        self.grouped_cost("provider", range, None)
    }

    /// Cost per day with usage, oldest first.
    pub fn daily_costs(&self, range: &DayRange, provider: Option<&str>) -> Result<Vec<DailyCost>> {
        let (filter, values) = range_filter(range, provider);
        let sql = format!(
            r#"
            SELECT date, SUM(cost_nanos)
            FROM usage_record
            WHERE {filter}
            GROUP BY date
            ORDER BY date ASC
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(DailyCost {
                date: date_from_column(row, 0)?,
                cost: usd_from_column(row.get(1)?),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn models_in_range(&self, range: &DayRange) -> Result<Vec<String>> {
        let (filter, values) = range_filter(range, None);
        let sql = format!(
            "SELECT DISTINCT model FROM usage_record WHERE {filter} ORDER BY model ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<String>, _>>()?)
    }

    /// Stored rows, one per credential, without any grouping.
    pub fn list_records(&self, range: &DayRange) -> Result<Vec<UsageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT date, provider, credential_fingerprint, model,
                   input_tokens, output_tokens, cache_read_tokens, cache_creation_tokens,
                   cost_nanos
            FROM usage_record
            WHERE date >= ?1 AND date <= ?2
            ORDER BY date ASC, provider ASC, model ASC, credential_fingerprint ASC
            "#,
        )?;
        let rows = stmt.query_map(
            [range.start().as_str(), range.end().as_str()],
            row_to_usage_record,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn grouped_cost(
        &self,
        column: &str,
        range: &DayRange,
        provider: Option<&str>,
    ) -> Result<BTreeMap<String, Usd>> {
        let (filter, values) = range_filter(range, provider);
        let sql = format!(
            "SELECT {column}, SUM(cost_nanos) FROM usage_record WHERE {filter} GROUP BY {column}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok((row.get::<_, String>(0)?, usd_from_column(row.get(1)?)))
        })?;
        Ok(rows.collect::<std::result::Result<BTreeMap<_, _>, _>>()?)
    }
}
