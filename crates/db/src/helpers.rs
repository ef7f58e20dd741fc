use monitor_core::{
    CredentialFingerprint, DayRange, TokenCounts, UsageDate, UsageRecord, UsageRow, Usd,
};
use rusqlite::Row;
use rusqlite::types::Type;

use crate::error::{DbError, Result};

/// WHERE clause and its positional parameters for a date range scan,
/// optionally narrowed to one provider.
pub(crate) fn range_filter(range: &DayRange, provider: Option<&str>) -> (String, Vec<String>) {
    let mut clause = String::from("date >= ?1 AND date <= ?2");
    let mut values = vec![range.start().to_string(), range.end().to_string()];
    if let Some(provider) = provider {
        clause.push_str(" AND provider = ?3");
        values.push(provider.to_string());
    }
    (clause, values)
}

pub(crate) fn to_sql_int(field: &str, value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| DbError::InvalidInput(format!("{} value {} is out of range", field, value)))
}

pub(crate) fn usd_from_column(value: i64) -> Usd {
    Usd::from_nanos(value.max(0) as u64)
}

pub(crate) fn date_from_column(
    row: &Row<'_>,
    idx: usize,
) -> std::result::Result<UsageDate, rusqlite::Error> {
    let value: String = row.get(idx)?;
    UsageDate::parse(&value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn row_to_usage_row(row: &Row<'_>) -> std::result::Result<UsageRow, rusqlite::Error> {
    Ok(UsageRow {
        date: date_from_column(row, 0)?,
        provider: row.get(1)?,
        model: row.get(2)?,
        input_tokens: row.get::<_, i64>(3)? as u64,
        output_tokens: row.get::<_, i64>(4)? as u64,
        cache_read_tokens: row.get::<_, i64>(5)? as u64,
        cache_creation_tokens: row.get::<_, i64>(6)? as u64,
        cost: usd_from_column(row.get(7)?),
    })
}

pub(crate) fn row_to_usage_record(
    row: &Row<'_>,
) -> std::result::Result<UsageRecord, rusqlite::Error> {
    Ok(UsageRecord {
        date: date_from_column(row, 0)?,
        provider: row.get(1)?,
        credential: CredentialFingerprint::from_stored(row.get::<_, String>(2)?),
        model: row.get(3)?,
        tokens: TokenCounts {
            input_tokens: row.get::<_, i64>(4)? as u64,
            output_tokens: row.get::<_, i64>(5)? as u64,
            cache_read_tokens: row.get::<_, i64>(6)? as u64,
            cache_creation_tokens: row.get::<_, i64>(7)? as u64,
        },
        cost: usd_from_column(row.get(8)?),
    })
}
