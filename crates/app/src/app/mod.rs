use std::path::PathBuf;

use monitor_db::Db;

use crate::config::MonitorConfig;
use crate::error::{AppError, Result};
use crate::pricing::{build_pricing_table, install_pricing};
use crate::services::AppServices;
use crate::startup::{AppPaths, ensure_app_data_dir};

/// Settings and paths needed to run the monitor.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub settings: MonitorConfig,
}

/// Application state shared by the front ends (CLI, HTTP API).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(settings: MonitorConfig, db_path: PathBuf) -> Self {
        let config = AppConfig { db_path, settings };
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn from_settings(settings: MonitorConfig) -> Self {
        let paths = AppPaths::from_config(&settings);
        Self::new(settings, paths.db_path)
    }

    /// Creates the data directory, migrates the ledger and installs the
    /// process-wide pricing table.
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.config.db_path.parent() {
            ensure_app_data_dir(&AppPaths::new(parent.to_path_buf()))?;
        }
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        install_pricing(build_pricing_table(&self.config.settings)?);
        Ok(())
    }

    pub fn setup_db(&self) -> Result<()> {
        let mut db = Db::open(&self.config.db_path)?;
        db.migrate()?;
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}
