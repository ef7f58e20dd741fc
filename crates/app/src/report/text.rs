use std::fmt::Write;

use monitor_core::format_cost;

use super::{CostReport, TEXT_TOP_MODELS};

pub fn render_text(report: &CostReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n💰 LLM Cost Report - {}", report.label);
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Period: {}", report.range);
    let _ = writeln!(out, "\nTotal Cost: {}", format_cost(report.total));

    if !report.by_provider.is_empty() {
        let _ = writeln!(out, "\n📊 By Provider:");
        for share in &report.by_provider {
            let _ = writeln!(
                out,
                "  • {}: {} ({:.0}%)",
                share.name,
                format_cost(share.cost),
                share.percent
            );
        }
    }

    if !report.by_model.is_empty() {
        let _ = writeln!(out, "\n📈 By Model:");
        for share in report.by_model.iter().take(TEXT_TOP_MODELS) {
            let _ = writeln!(
                out,
                "  • {}: {} ({:.0}%)",
                share.name,
                format_cost(share.cost),
                share.percent
            );
        }
    }

    if !report.unknown_models.is_empty() {
        let _ = writeln!(
            out,
            "\n❓ Unknown pricing (recorded at $0): {}",
            report.unknown_models.join(", ")
        );
    }

    if let Some(budget) = &report.budget {
        let _ = writeln!(
            out,
            "\n🎯 Budget: {} / {} ({:.0}%) {}",
            format_cost(budget.total),
            format_cost(budget.limit),
            budget.percentage,
            budget.status.emoji()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    #[test]
    fn lists_totals_and_shares() {
        let text = render_text(&sample_report());
        assert!(text.contains("💰 LLM Cost Report - This Week"));
        assert!(text.contains("Period: 2024-06-01 to 2024-06-07"));
        assert!(text.contains("Total Cost: $12.50"));
        assert!(text.contains("  • anthropic: $10.00 (80%)"));
        assert!(text.contains("  • gpt-4o: $2.50 (20%)"));
        assert!(text.contains("Unknown pricing (recorded at $0): <script>evil</script>"));
        assert!(text.contains("🎯 Budget: $12.50 / $50.00 (25%) ✅"));
    }

    #[test]
    fn caps_model_list() {
        let mut report = sample_report();
        report.by_model = (0..15)
            .map(|idx| crate::report::CostShare {
                name: format!("model-{idx:02}"),
                cost: monitor_core::Usd::ZERO,
                percent: 0.0,
            })
            .collect();
        let text = render_text(&report);
        assert!(text.contains("model-09"));
        assert!(!text.contains("model-10"));
    }

    #[test]
    fn empty_report_omits_sections() {
        let mut report = sample_report();
        report.by_provider.clear();
        report.by_model.clear();
        report.unknown_models.clear();
        report.budget = None;
        let text = render_text(&report);
        assert!(!text.contains("By Provider"));
        assert!(!text.contains("Budget"));
    }
}
