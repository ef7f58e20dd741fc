mod support;

use monitor_db::Db;
use support::{make_delta, range, record, setup_db};

#[test]
fn migrate_is_idempotent() {
    let mut test_db = setup_db();
    record(
        &test_db.db,
        &[make_delta("2024-06-01", "openai", "k1", "gpt-4o", 10, 5, 0.001)],
    );

    test_db.db.migrate().expect("second migrate");

    assert_eq!(
        test_db.db.applied_migrations().expect("applied"),
        vec!["0001_init".to_string()]
    );
    let rows = test_db
        .db
        .query_range(&range("2024-06-01", "2024-06-01"), None)
        .expect("rows");
    assert_eq!(rows.len(), 1);
}

#[test]
fn reopening_keeps_existing_rows() {
    let test_db = setup_db();
    record(
        &test_db.db,
        &[make_delta("2024-06-01", "openai", "k1", "gpt-4o", 10, 5, 0.001)],
    );

    let mut reopened = Db::open(&test_db.path).expect("reopen");
    reopened.migrate().expect("migrate");
    let rows = reopened
        .query_range(&range("2024-06-01", "2024-06-01"), None)
        .expect("rows");
    assert_eq!(rows[0].input_tokens, 10);
}

#[test]
fn in_memory_database_migrates() {
    let mut db = Db::open_in_memory().expect("memory db");
    db.migrate().expect("migrate");
    assert_eq!(db.applied_migrations().expect("applied").len(), 1);
}
