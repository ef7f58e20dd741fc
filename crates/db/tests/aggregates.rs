mod support;

use monitor_core::{DayRange, Usd};
use support::{day, make_delta, range, record, setup_db, usd};

fn seeded() -> support::TestDb {
    let test_db = setup_db();
    record(
        &test_db.db,
        &[
            make_delta("2024-06-01", "anthropic", "k1", "claude-3-opus", 1000, 500, 0.045),
            make_delta("2024-06-01", "openai", "k2", "gpt-4o", 2000, 100, 0.006),
            make_delta("2024-06-02", "anthropic", "k1", "claude-3-haiku", 4000, 400, 0.0015),
            make_delta("2024-06-03", "openai", "k2", "gpt-4o", 1000, 50, 0.003),
            make_delta("2024-06-03", "openai", "k3", "gpt-4o-mini", 500, 500, 0.000375),
        ],
    );
    test_db
}

#[test]
fn total_cost_of_empty_range_is_zero() {
    let test_db = seeded();
    let total = test_db
        .db
        .total_cost(&range("2023-01-01", "2023-01-31"), None)
        .expect("total");
    assert_eq!(total, Usd::ZERO);

    let unknown_provider = test_db
        .db
        .total_cost(&range("2024-06-01", "2024-06-03"), Some("mistral"))
        .expect("total");
    assert!(unknown_provider.is_zero());
}

#[test]
fn total_cost_equals_sum_of_rows_and_splits_additively() {
    let test_db = seeded();
    let db = &test_db.db;
    let full = range("2024-06-01", "2024-06-03");

    let total = db.total_cost(&full, None).expect("total");
    let rows_sum: Usd = db
        .query_range(&full, None)
        .expect("rows")
        .iter()
        .map(|row| row.cost)
        .sum();
    assert_eq!(total, rows_sum);
    assert_eq!(total, usd(0.055875));

    let head = db
        .total_cost(&range("2024-06-01", "2024-06-01"), None)
        .expect("head");
    let tail = db
        .total_cost(&range("2024-06-02", "2024-06-03"), None)
        .expect("tail");
    assert_eq!(head + tail, total);
}

#[test]
fn provider_filter_narrows_every_aggregate() {
    let test_db = seeded();
    let db = &test_db.db;
    let full = range("2024-06-01", "2024-06-03");

    let rows = db.query_range(&full, Some("openai")).expect("rows");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.provider == "openai"));

    assert_eq!(
        db.total_cost(&full, Some("openai")).expect("total"),
        usd(0.009375)
    );

    let by_model = db.cost_by_model(&full, Some("anthropic")).expect("models");
    assert_eq!(by_model.len(), 2);
    assert!(!by_model.contains_key("gpt-4o"));
}

#[test]
fn query_range_orders_newest_day_first() {
    let test_db = seeded();
    let rows = test_db
        .db
        .query_range(&range("2024-06-01", "2024-06-03"), None)
        .expect("rows");
    let keys: Vec<_> = rows
        .iter()
        .map(|row| (row.date.as_str().to_string(), row.provider.clone(), row.model.clone()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("2024-06-03".into(), "openai".into(), "gpt-4o".into()),
            ("2024-06-03".into(), "openai".into(), "gpt-4o-mini".into()),
            ("2024-06-02".into(), "anthropic".into(), "claude-3-haiku".into()),
            ("2024-06-01".into(), "anthropic".into(), "claude-3-opus".into()),
            ("2024-06-01".into(), "openai".into(), "gpt-4o".into()),
        ]
    );
}

#[test]
fn range_bounds_are_inclusive() {
    let test_db = seeded();
    let rows = test_db
        .db
        .query_range(&range("2024-06-02", "2024-06-02"), None)
        .expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, day("2024-06-02"));
}

#[test]
fn cost_by_model_merges_days_and_credentials() {
    let test_db = seeded();
    let by_model = test_db
        .db
        .cost_by_model(&range("2024-06-01", "2024-06-03"), None)
        .expect("models");

    assert_eq!(by_model.len(), 4);
    assert_eq!(by_model["gpt-4o"], usd(0.009));
    assert_eq!(by_model["claude-3-opus"], usd(0.045));
    let sum: Usd = by_model.values().copied().sum();
    assert_eq!(sum, usd(0.055875));
}

#[test]
fn cost_by_provider_covers_all_providers() {
    let test_db = seeded();
    let by_provider = test_db
        .db
        .cost_by_provider(&range("2024-06-01", "2024-06-03"))
        .expect("providers");
    assert_eq!(by_provider.len(), 2);
    assert_eq!(by_provider["anthropic"], usd(0.0465));
    assert_eq!(by_provider["openai"], usd(0.009375));
}

#[test]
fn daily_costs_skip_days_without_usage() {
    let test_db = seeded();
    let daily = test_db
        .db
        .daily_costs(&range("2024-05-30", "2024-06-03"), None)
        .expect("daily");
    let dates: Vec<_> = daily.iter().map(|entry| entry.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-06-01", "2024-06-02", "2024-06-03"]);
    assert_eq!(daily[0].cost, usd(0.051));
}

#[test]
fn models_in_range_are_distinct_and_sorted() {
    let test_db = seeded();
    let models = test_db
        .db
        .models_in_range(&range("2024-06-01", "2024-06-03"))
        .expect("models");
    assert_eq!(
        models,
        vec!["claude-3-haiku", "claude-3-opus", "gpt-4o", "gpt-4o-mini"]
    );
}

#[test]
fn single_day_range_matches_one_date() {
    let test_db = seeded();
    let single = DayRange::single(day("2024-06-03"));
    let total = test_db.db.total_cost(&single, None).expect("total");
    assert_eq!(total, usd(0.003375));
}
