use std::fs;

use monitor_app::{
    AlertMode, AppState, Delivery, FetchSummary, Period, RangeParams, Result, last_days,
    price_rows, render_html, render_json, render_text, today_local,
};
use monitor_core::{MatchKind, UsageDate, pricing};
use tracing::info;

use crate::args::{AlertArgs, FetchArgs, NotifyArgs, PricingArgs, ReportArgs};

pub async fn fetch(state: &AppState, args: FetchArgs) -> Result<u8> {
    let today = today_local();
    let dates = if let Some(date) = &args.date {
        vec![UsageDate::parse(date)?]
    } else if args.today {
        vec![UsageDate::from_naive(today)?]
    } else if args.yesterday {
        last_days(today, 1)?
    } else {
        last_days(today, args.last_days.unwrap_or(1))?
    };

    let summary = state.services.ingest.fetch(&dates, args.dry_run).await?;
    print_fetch_summary(&summary);
    Ok(if summary.total.issues.is_empty() { 0 } else { 1 })
}

fn print_fetch_summary(summary: &FetchSummary) {
    for day in &summary.days {
        let stats = &day.stats;
        if stats.dry_run {
            println!(
                "{}: {} usage lines from {} keys (dry run, nothing written)",
                day.date, stats.lines_fetched, stats.keys_fetched
            );
        } else {
            println!(
                "{}: {} usage lines from {} keys, {} ledger rows updated",
                day.date, stats.lines_fetched, stats.keys_fetched, stats.rows_written
            );
        }
        for issue in &stats.issues {
            println!(
                "  {} key {} failed: {}",
                issue.provider, issue.credential, issue.message
            );
        }
    }
    if !summary.total.unpriced_models.is_empty() {
        let models: Vec<&str> = summary
            .total
            .unpriced_models
            .iter()
            .map(String::as_str)
            .collect();
        println!("No pricing for: {} (recorded at $0)", models.join(", "));
    }
}

pub fn report(state: &AppState, args: ReportArgs) -> Result<u8> {
    let params = RangeParams {
        period: args.period,
        date: args.date,
        start: args.from,
        end: args.to,
        provider: None,
    };
    let report = state.services.reports.report(&params, today_local())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&render_json(&report))?);
    } else if args.html {
        let html = render_html(&report);
        match &args.output {
            Some(path) => {
                fs::write(path, html)?;
                info!(path = %path.display(), "wrote html report");
                println!("Report saved to {}", path.display());
            }
            None => println!("{html}"),
        }
    } else {
        print!("{}", render_text(&report));
    }
    Ok(0)
}

pub async fn alert(state: &AppState, args: AlertArgs) -> Result<u8> {
    let period: Period = args.period.parse()?;
    let mode: AlertMode = args.mode.parse()?;
    let outcome = state
        .services
        .alerts
        .run(args.budget, period, mode, today_local())
        .await?;

    match outcome.check.alert_message() {
        Some(message) => println!("{message}"),
        None => println!("{}", outcome.check.summary()),
    }
    print_deliveries(&outcome.deliveries);
    Ok(u8::try_from(outcome.exit_code).unwrap_or(1))
}

pub async fn notify(state: &AppState, args: NotifyArgs) -> Result<u8> {
    let deliveries = state
        .services
        .notify
        .send(&args.message, &args.channel)
        .await?;
    print_deliveries(&deliveries);
    Ok(if deliveries.iter().all(|delivery| delivery.ok) {
        0
    } else {
        1
    })
}

fn print_deliveries(deliveries: &[Delivery]) {
    for delivery in deliveries {
        match &delivery.error {
            None => println!("✅ sent via {}", delivery.channel),
            Some(error) => println!("❌ {} failed: {}", delivery.channel, error),
        }
    }
}

pub fn pricing(args: PricingArgs) -> Result<u8> {
    let table = pricing::global();
    if let Some(model) = &args.model {
        return Ok(match table.resolve(model) {
            Some(found) => {
                let how = match found.kind {
                    MatchKind::Exact => "exact match",
                    MatchKind::Prefix => "prefix match",
                };
                println!("{model} -> {} ({how})", found.entry.model);
                let rates = found.entry.rates;
                println!(
                    "  input ${:.4}/1M  output ${:.4}/1M  cache read ${:.4}/1M  cache write ${:.4}/1M",
                    rates.input * 1_000_000.0,
                    rates.output * 1_000_000.0,
                    rates.cache_read * 1_000_000.0,
                    rates.cache_write * 1_000_000.0,
                );
                0
            }
            None => {
                println!("{model}: no pricing, usage is recorded at $0");
                1
            }
        });
    }

    println!(
        "{:<36} {:>10} {:>10} {:>12} {:>12}",
        "model", "input/1M", "output/1M", "cache read", "cache write"
    );
    for row in price_rows(table) {
        println!(
            "{:<36} {:>10} {:>10} {:>12} {:>12}",
            row.model,
            format!("${}", row.input_per_1m),
            format!("${}", row.output_per_1m),
            format!("${}", row.cache_read_per_1m),
            format!("${}", row.cache_write_per_1m),
        );
    }
    Ok(0)
}
