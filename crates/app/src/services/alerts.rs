use chrono::NaiveDate;
use tracing::info;

use crate::alert::{AlertMode, BudgetCheck, check_budget, resolve_budget};
use crate::error::Result;
use crate::notify::{self, Delivery};
use crate::services::{SharedConfig, open_db};
use crate::util::time::Period;

#[derive(Clone)]
pub struct AlertService {
    config: SharedConfig,
}

#[derive(Clone, Debug)]
pub struct AlertOutcome {
    pub check: BudgetCheck,
    pub deliveries: Vec<Delivery>,
    pub exit_code: i32,
}

impl AlertService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn check(
        &self,
        budget: Option<f64>,
        period: Period,
        today: NaiveDate,
    ) -> Result<BudgetCheck> {
        let settings = &self.config.settings;
        let limit = resolve_budget(budget, settings)?;
        let range = period.budget_range(today)?;
        let db = open_db(&self.config)?;
        check_budget(&db, limit, settings.budget.alert_threshold, &range)
    }

    /// Checks the budget and, once the threshold is crossed, notifies every
    /// channel listed under `budget.notify_channels`.
    pub async fn run(
        &self,
        budget: Option<f64>,
        period: Period,
        mode: AlertMode,
        today: NaiveDate,
    ) -> Result<AlertOutcome> {
        let check = self.check(budget, period, today)?;
        let mut deliveries = Vec::new();
        if let Some(message) = check.alert_message() {
            let channels = &self.config.settings.budget.notify_channels;
            if channels.is_empty() {
                info!("budget threshold crossed, no notify_channels configured");
            } else {
                let http = notify::http_client()?;
                deliveries = notify::send_all(
                    &http,
                    channels,
                    &self.config.settings.notifications,
                    &message,
                )
                .await;
            }
        }
        let exit_code = check.exit_code(mode);
        Ok(AlertOutcome {
            check,
            deliveries,
            exit_code,
        })
    }
}
