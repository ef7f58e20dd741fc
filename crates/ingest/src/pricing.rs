use std::collections::BTreeSet;

use monitor_core::{CostError, PricingTable, UsageDelta, Usd};
use tracing::warn;

use crate::types::UsageLine;

/// Ledger deltas for one fetch, plus the models no price was found for.
#[derive(Debug, Clone, Default)]
pub struct PricedBatch {
    pub deltas: Vec<UsageDelta>,
    pub unpriced_models: BTreeSet<String>,
}

/// Stamps each line with its cost.
///
/// Lines for unpriced models keep their token counts but carry zero cost,
/// and the model lands in `unpriced_models` so callers can flag it.
pub fn price_lines(
    table: &PricingTable,
    provider: &str,
    credential: &str,
    lines: &[UsageLine],
) -> PricedBatch {
    let mut batch = PricedBatch::default();
    for line in lines {
        let cost = match table.calculate_cost(&line.model, &line.tokens) {
            Ok(cost) => cost,
            Err(CostError::UnknownPricing { model }) => {
                if batch.unpriced_models.insert(model.clone()) {
                    warn!(provider, model = %model, "no pricing for model, recording zero cost");
                }
                Usd::ZERO
            }
            Err(err) => {
                warn!(provider, model = %line.model, error = %err, "cost calculation failed");
                batch.unpriced_models.insert(line.model.clone());
                Usd::ZERO
            }
        };
        batch.deltas.push(UsageDelta::new(
            line.date.clone(),
            provider,
            credential,
            line.model.clone(),
            line.tokens,
            cost,
        ));
    }
    batch
}
