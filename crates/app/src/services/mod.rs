mod alerts;
mod ingest;
mod notify;
mod reports;

use std::sync::Arc;

use monitor_db::Db;

use crate::app::AppConfig;
use crate::error::Result;

pub use alerts::{AlertOutcome, AlertService};
pub use ingest::{FetchSummary, IngestService};
pub use notify::NotifyService;
pub use reports::ReportService;

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub reports: ReportService,
    pub alerts: AlertService,
    pub ingest: IngestService,
    pub notify: NotifyService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            reports: ReportService::new(shared.clone()),
            alerts: AlertService::new(shared.clone()),
            ingest: IngestService::new(shared.clone()),
            notify: NotifyService::new(shared),
        }
    }
}

/// Each call gets its own connection; SQLite serializes the writers.
fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
