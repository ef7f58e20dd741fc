use ingest::{ProviderClient, http_client, ingest_provider};
use monitor_core::{DayRange, PricingTable, UsageDate, Usd};
use monitor_db::Db;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup_db() -> (TempDir, Db) {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut db = Db::open(dir.path().join("usage.db")).expect("open db");
    db.migrate().expect("migrate db");
    (dir, db)
}

fn day() -> UsageDate {
    UsageDate::parse("2024-06-01").expect("date")
}

fn keys(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[tokio::test]
async fn anthropic_usage_lands_in_the_ledger() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations/org-1/usage"))
        .and(header("x-api-key", "k1"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(query_param("start_date", "2024-06-01"))
        .and(query_param("end_date", "2024-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily_usage": [{
                "date": "2024-06-01",
                "usage": [
                    {"model": "claude-3-opus-20240229", "input_tokens": 1000, "output_tokens": 500},
                    {"model": "claude-next-preview", "input_tokens": 10, "output_tokens": 10}
                ]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, mut db) = setup_db();
    let client = ProviderClient::anthropic("org-1").with_base_url(server.uri());
    let http = http_client().expect("http client");
    let stats = ingest_provider(
        &mut db,
        &http,
        &client,
        &keys(&["k1"]),
        &day(),
        &PricingTable::builtin(),
        false,
    )
    .await
    .expect("ingest");

    assert_eq!(stats.keys_fetched, 1);
    assert_eq!(stats.lines_fetched, 2);
    assert_eq!(stats.rows_written, 2);
    assert!(stats.unpriced_models.contains("claude-next-preview"));
    assert!(stats.issues.is_empty());

    let range = DayRange::single(day());
    let total = db.total_cost(&range, Some("anthropic")).expect("total");
    assert_eq!(total, Usd::from_dollars(0.0525).expect("usd"));
    assert_eq!(db.models_in_range(&range).expect("models").len(), 2);
}

#[tokio::test]
async fn failing_key_does_not_block_the_next() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/usage"))
        .and(header("authorization", "Bearer bad-key"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/usage"))
        .and(header("authorization", "Bearer good-key"))
        .and(query_param("date", "2024-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"snapshot_id": "gpt-4o", "n_context_tokens_total": 1000000, "n_generated_tokens_total": 0},
                {"snapshot_id": "gpt-4o", "n_context_tokens_total": 0, "n_generated_tokens_total": 0}
            ]
        })))
        .mount(&server)
        .await;

    let (_dir, mut db) = setup_db();
    let client = ProviderClient::openai().with_base_url(server.uri());
    let http = http_client().expect("http client");
    let stats = ingest_provider(
        &mut db,
        &http,
        &client,
        &keys(&["bad-key", "good-key"]),
        &day(),
        &PricingTable::builtin(),
        false,
    )
    .await
    .expect("ingest");

    assert_eq!(stats.keys_fetched, 1);
    assert_eq!(stats.rows_written, 1);
    assert_eq!(stats.issues.len(), 1);
    let issue = &stats.issues[0];
    assert_eq!(issue.provider, "openai");
    assert!(issue.message.contains("401"));
    assert!(!issue.credential.contains("bad-key"));

    let total = db
        .total_cost(&DayRange::single(day()), None)
        .expect("total");
    assert_eq!(total, Usd::from_dollars(2.5).expect("usd"));
}

#[tokio::test]
async fn dry_run_fetches_without_writing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"snapshot_id": "gpt-4o-mini", "n_context_tokens_total": 10, "n_generated_tokens_total": 5}]
        })))
        .mount(&server)
        .await;

    let (_dir, mut db) = setup_db();
    let client = ProviderClient::openai().with_base_url(server.uri());
    let http = http_client().expect("http client");
    let stats = ingest_provider(
        &mut db,
        &http,
        &client,
        &keys(&["k1"]),
        &day(),
        &PricingTable::builtin(),
        true,
    )
    .await
    .expect("ingest");

    assert!(stats.dry_run);
    assert_eq!(stats.lines_fetched, 1);
    assert_eq!(stats.rows_written, 0);
    assert!(
        db.query_range(&DayRange::single(day()), None)
            .expect("rows")
            .is_empty()
    );
}

#[tokio::test]
async fn refetching_the_same_day_adds_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"snapshot_id": "gpt-4o", "n_context_tokens_total": 100, "n_generated_tokens_total": 50}]
        })))
        .mount(&server)
        .await;

    let (_dir, mut db) = setup_db();
    let client = ProviderClient::openai().with_base_url(server.uri());
    let http = http_client().expect("http client");
    for _ in 0..2 {
        ingest_provider(
            &mut db,
            &http,
            &client,
            &keys(&["k1"]),
            &day(),
            &PricingTable::builtin(),
            false,
        )
        .await
        .expect("ingest");
    }

    let rows = db
        .query_range(&DayRange::single(day()), None)
        .expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].input_tokens, 200);
    assert_eq!(rows[0].output_tokens, 100);
}
