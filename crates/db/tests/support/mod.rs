#![allow(dead_code)]

use std::path::PathBuf;

use monitor_core::{DayRange, TokenCounts, UsageDate, UsageDelta, Usd};
use monitor_db::Db;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("usage.db");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn day(value: &str) -> UsageDate {
    UsageDate::parse(value).expect("date")
}

pub fn range(start: &str, end: &str) -> DayRange {
    DayRange::parse(start, end).expect("range")
}

pub fn usd(value: f64) -> Usd {
    Usd::from_dollars(value).expect("amount")
}

pub fn make_delta(
    date: &str,
    provider: &str,
    credential: &str,
    model: &str,
    input: u64,
    output: u64,
    cost: f64,
) -> UsageDelta {
    UsageDelta::new(
        day(date),
        provider,
        credential,
        model,
        TokenCounts::new(input, output),
        usd(cost),
    )
}

pub fn record(db: &Db, deltas: &[UsageDelta]) {
    for delta in deltas {
        db.record_usage(delta).expect("record usage");
    }
}
