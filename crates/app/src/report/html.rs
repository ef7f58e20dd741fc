use std::fmt::Write;

use monitor_core::{Usd, format_cost};

use super::{CostReport, CostShare, HTML_TOP_MODELS};
use crate::alert::BudgetStatus;

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
       background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);
       min-height: 100vh; padding: 40px; color: #fff; }
.card { background: rgba(255, 255, 255, 0.05); border-radius: 20px; padding: 32px;
        max-width: 640px; margin: 0 auto; border: 1px solid rgba(255, 255, 255, 0.1); }
.header { text-align: center; margin-bottom: 32px; }
.header h1 { font-size: 28px; font-weight: 700; margin-bottom: 8px; }
.header .period, .muted { color: rgba(255, 255, 255, 0.6); font-size: 14px; }
.total-cost { text-align: center; padding: 24px; background: rgba(78, 205, 196, 0.1);
              border-radius: 16px; margin-bottom: 24px; }
.total-cost .amount { font-size: 48px; font-weight: 700; color: #4ECDC4; }
.section { margin-bottom: 24px; }
.section-title { font-size: 14px; font-weight: 600; color: rgba(255, 255, 255, 0.6);
                 margin-bottom: 12px; text-transform: uppercase; letter-spacing: 1px; }
.row { display: flex; align-items: center; margin-bottom: 12px; }
.name { width: 160px; font-size: 13px; font-weight: 500; overflow: hidden; text-overflow: ellipsis; }
.bar-container { flex: 1; height: 20px; background: rgba(255, 255, 255, 0.1);
                 border-radius: 10px; overflow: hidden; margin: 0 12px; }
.bar { height: 100%; border-radius: 10px; background: #45B7D1; }
.cost { width: 80px; text-align: right; font-size: 13px; }
.daily { display: flex; align-items: flex-end; height: 80px; gap: 2px; }
.daily div { flex: 1; background: #96CEB4; border-radius: 2px 2px 0 0; min-height: 1px; }
.unknown-note { background: rgba(255, 230, 109, 0.1); border-radius: 12px; padding: 12px;
                font-size: 13px; color: #FFE66D; margin-bottom: 24px; }
"#;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn provider_color(provider: &str) -> &'static str {
    match provider {
        "anthropic" => "#4ECDC4",
        "openai" => "#45B7D1",
        "unknown" => "#FF6B6B",
        _ => "#96CEB4",
    }
}

fn budget_color(status: BudgetStatus) -> &'static str {
    match status {
        BudgetStatus::Ok => "#4ECDC4",
        BudgetStatus::Warning => "#FFE66D",
        BudgetStatus::Exceeded => "#FF6B6B",
    }
}

/// Bar width in percent of the largest entry.
fn scaled(cost: Usd, max: Usd) -> f64 {
    cost.percent_of(max)
}

fn bar_rows<F>(out: &mut String, shares: &[CostShare], color: F)
where
    F: Fn(&str) -> &'static str,
{
    let max = shares.iter().map(|share| share.cost).max().unwrap_or(Usd::ZERO);
    for share in shares {
        let _ = write!(
            out,
            r#"<div class="row"><div class="name">{name}</div><div class="bar-container"><div class="bar" style="width: {width:.1}%; background: {color};"></div></div><div class="cost">{cost}</div></div>"#,
            name = escape_html(&share.name),
            width = scaled(share.cost, max),
            color = color(&share.name),
            cost = format_cost(share.cost),
        );
        out.push('\n');
    }
}

/// Self-contained HTML page for a report.
pub fn render_html(report: &CostReport) -> String {
    let label = escape_html(&report.label);
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<div class="header"><h1>💰 LLM Cost Report</h1><div class="period">{label} · {range}</div></div>
<div class="total-cost"><div class="amount">{total}</div><div class="muted">Total cost</div></div>
"#,
        range = report.range,
        total = format_cost(report.total),
    );

    if !report.unknown_models.is_empty() {
        let models: Vec<String> = report
            .unknown_models
            .iter()
            .map(|model| escape_html(model))
            .collect();
        let _ = writeln!(
            body,
            r#"<div class="unknown-note">⚠️ No pricing for: {}<br><small>Usage for these models is recorded at $0.</small></div>"#,
            models.join(", ")
        );
    }

    if !report.by_provider.is_empty() {
        body.push_str(r#"<div class="section"><div class="section-title">By Provider</div>"#);
        body.push('\n');
        bar_rows(&mut body, &report.by_provider, provider_color);
        body.push_str("</div>\n");
    }

    if !report.by_model.is_empty() {
        let top = &report.by_model[..report.by_model.len().min(HTML_TOP_MODELS)];
        body.push_str(r#"<div class="section"><div class="section-title">By Model</div>"#);
        body.push('\n');
        bar_rows(&mut body, top, |_| "#45B7D1");
        body.push_str("</div>\n");
    }

    if report.daily.len() > 1 {
        let max = report
            .daily
            .iter()
            .map(|day| day.cost)
            .max()
            .unwrap_or(Usd::ZERO);
        body.push_str(r#"<div class="section"><div class="section-title">Daily</div><div class="daily">"#);
        for day in &report.daily {
            let _ = write!(
                body,
                r#"<div style="height: {height:.1}%;" title="{date}: {cost}"></div>"#,
                height = scaled(day.cost, max),
                date = day.date,
                cost = format_cost(day.cost),
            );
        }
        body.push_str("</div></div>\n");
    }

    if let Some(budget) = &report.budget {
        let _ = writeln!(
            body,
            r#"<div class="section"><div class="section-title">🎯 Budget</div><div class="bar-container" style="margin: 0 0 8px 0;"><div class="bar" style="width: {width:.1}%; background: {color};"></div></div><div class="muted">{used} / {limit} ({pct:.0}%) {emoji}</div></div>"#,
            width = budget.percentage.min(100.0),
            color = budget_color(budget.status),
            used = format_cost(budget.total),
            limit = format_cost(budget.limit),
            pct = budget.percentage,
            emoji = budget.status.emoji(),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>LLM Cost Report - {label}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="card">
{body}</div>
</body>
</html>
"#
    )
}
