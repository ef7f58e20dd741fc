use monitor_core::pricing::{self, PricingTable};
use serde::Serialize;
use tracing::debug;

use crate::config::MonitorConfig;
use crate::error::{AppError, Result};

/// Built-in prices with the config's `[[pricing]]` entries layered on top.
pub fn build_pricing_table(config: &MonitorConfig) -> Result<PricingTable> {
    PricingTable::with_overrides(&config.pricing)
        .map_err(|err| AppError::InvalidInput(format!("pricing override: {}", err)))
}

/// Makes `table` the process-wide pricing table. Returns false when one
/// was already installed; the existing table stays in effect.
pub fn install_pricing(table: PricingTable) -> bool {
    let entries = table.len();
    match pricing::install(table) {
        Ok(()) => {
            debug!(entries, "installed pricing table");
            true
        }
        Err(_) => {
            debug!("pricing table already installed, keeping the existing one");
            false
        }
    }
}

/// One line of `pricing` output, in dollars per million tokens.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceRow {
    pub model: String,
    pub input_per_1m: f64,
    pub output_per_1m: f64,
    pub cache_read_per_1m: f64,
    pub cache_write_per_1m: f64,
}

pub fn price_rows(table: &PricingTable) -> Vec<PriceRow> {
    const PER_MILLION: f64 = 1_000_000.0;
    let per_million = |rate: f64| (rate * PER_MILLION * 1e6).round() / 1e6;
    table
        .entries()
        .map(|entry| PriceRow {
            model: entry.model.clone(),
            input_per_1m: per_million(entry.rates.input),
            output_per_1m: per_million(entry.rates.output),
            cache_read_per_1m: per_million(entry.rates.cache_read),
            cache_write_per_1m: per_million(entry.rates.cache_write),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::PriceInput;

    #[test]
    fn overrides_replace_builtin_rates() {
        let mut config = MonitorConfig::default();
        config.pricing.push(PriceInput {
            model: "gpt-4o".to_string(),
            input_per_1m: 1.0,
            output_per_1m: 4.0,
            cache_read_per_1m: None,
            cache_write_per_1m: None,
        });
        let table = build_pricing_table(&config).expect("table");
        let rows = price_rows(&table);
        let gpt = rows
            .iter()
            .find(|row| row.model == "gpt-4o")
            .expect("gpt-4o row");
        assert_eq!(gpt.input_per_1m, 1.0);
        assert_eq!(gpt.output_per_1m, 4.0);
        assert_eq!(gpt.cache_read_per_1m, 0.0);
        assert_eq!(rows.len(), PricingTable::builtin().len());
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut config = MonitorConfig::default();
        config.pricing.push(PriceInput {
            model: "bad".to_string(),
            input_per_1m: -1.0,
            output_per_1m: 1.0,
            cache_read_per_1m: None,
            cache_write_per_1m: None,
        });
        assert!(matches!(
            build_pricing_table(&config),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn builtin_rows_round_trip_published_prices() {
        let rows = price_rows(&PricingTable::builtin());
        let opus = rows
            .iter()
            .find(|row| row.model == "claude-3-opus")
            .expect("opus row");
        assert_eq!(opus.input_per_1m, 15.0);
        assert_eq!(opus.cache_write_per_1m, 18.75);
    }
}
