mod html;
mod json;
mod text;

use std::cmp::Reverse;
use std::collections::BTreeMap;

use monitor_core::{DailyCost, DayRange, PricingTable, Usd};
use monitor_db::Db;
use serde::Serialize;

use crate::alert::BudgetCheck;
use crate::error::Result;

pub use html::render_html;
pub use json::render_json;
pub use text::render_text;

/// Models shown in the text report.
pub const TEXT_TOP_MODELS: usize = 10;
/// Models shown in the HTML report.
pub const HTML_TOP_MODELS: usize = 8;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostShare {
    pub name: String,
    pub cost: Usd,
    /// Percent of the report total.
    pub percent: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CostReport {
    pub label: String,
    /// Named period this report was built for, if any.
    pub period: Option<String>,
    pub range: DayRange,
    pub total: Usd,
    pub by_provider: Vec<CostShare>,
    pub by_model: Vec<CostShare>,
    pub daily: Vec<DailyCost>,
    pub budget: Option<BudgetCheck>,
    /// Models seen in the ledger that the pricing table cannot price.
    /// Their usage is recorded at zero cost.
    pub unknown_models: Vec<String>,
}

/// Reads every aggregate a report needs from the ledger.
pub fn build_report(
    db: &Db,
    label: impl Into<String>,
    range: &DayRange,
    budget: Option<(Usd, f64)>,
    pricing: &PricingTable,
) -> Result<CostReport> {
    let total = db.total_cost(range, None)?;
    let by_provider = shares(db.cost_by_provider(range)?, total);
    let by_model = shares(db.cost_by_model(range, None)?, total);
    let daily = db.daily_costs(range, None)?;
    let unknown_models = db
        .models_in_range(range)?
        .into_iter()
        .filter(|model| !pricing.is_priced(model))
        .collect();
    let budget = budget.map(|(limit, threshold)| {
        BudgetCheck::new(range.clone(), total, limit, threshold)
    });
    Ok(CostReport {
        label: label.into(),
        period: None,
        range: range.clone(),
        total,
        by_provider,
        by_model,
        daily,
        budget,
        unknown_models,
    })
}

/// Largest cost first, ties broken by name.
fn shares(costs: BTreeMap<String, Usd>, total: Usd) -> Vec<CostShare> {
    let mut shares: Vec<CostShare> = costs
        .into_iter()
        .map(|(name, cost)| CostShare {
            percent: cost.percent_of(total),
            name,
            cost,
        })
        .collect();
    shares.sort_by_key(|share| (Reverse(share.cost), share.name.clone()));
    shares
}
