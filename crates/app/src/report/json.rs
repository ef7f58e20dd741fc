use serde_json::{Map, Value, json};

use super::{CostReport, CostShare};

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn cost_map(shares: &[CostShare]) -> Value {
    let map: Map<String, Value> = shares
        .iter()
        .map(|share| (share.name.clone(), json!(round6(share.cost.dollars()))))
        .collect();
    Value::Object(map)
}

/// Machine-readable report. Costs are dollars rounded to six decimals.
pub fn render_json(report: &CostReport) -> Value {
    let mut out = json!({
        "period": report.period.as_deref().unwrap_or(&report.label),
        "start_date": report.range.start().as_str(),
        "end_date": report.range.end().as_str(),
        "total_cost": round6(report.total.dollars()),
        "by_provider": cost_map(&report.by_provider),
        "by_model": cost_map(&report.by_model),
        "unknown_models": report.unknown_models,
    });
    if let (Some(budget), Value::Object(map)) = (&report.budget, &mut out) {
        map.insert(
            "budget".to_string(),
            json!({
                "limit": round6(budget.limit.dollars()),
                "used": round6(budget.total.dollars()),
                "percentage": round1(budget.percentage),
                "status": budget.status,
            }),
        );
    }
    out
}
