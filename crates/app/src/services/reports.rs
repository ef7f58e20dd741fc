use std::collections::BTreeMap;

use chrono::NaiveDate;
use monitor_core::{DayRange, UsageRow, Usd, pricing};

use crate::config::RangeParams;
use crate::error::{AppError, Result};
use crate::report::{CostReport, build_report};
use crate::services::{SharedConfig, open_db};
use crate::util::time::resolve_range;

#[derive(Clone)]
pub struct ReportService {
    config: SharedConfig,
}

impl ReportService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Report for the selected window. The budget line appears only when a
    /// monthly limit is configured.
    pub fn report(&self, params: &RangeParams, today: NaiveDate) -> Result<CostReport> {
        let resolved = resolve_range(params, today)?;
        let budget = self.budget_limit()?;
        let db = open_db(&self.config)?;
        let mut report = build_report(
            &db,
            resolved.label,
            &resolved.range,
            budget,
            pricing::global(),
        )?;
        let explicit_dates =
            params.date.is_some() || params.start.is_some() || params.end.is_some();
        if !explicit_dates {
            report.period = Some(params.period.clone().unwrap_or_else(|| "today".to_string()));
        }
        Ok(report)
    }

    pub fn usage(&self, range: &DayRange, provider: Option<&str>) -> Result<Vec<UsageRow>> {
        Ok(open_db(&self.config)?.query_range(range, provider)?)
    }

    pub fn total_cost(&self, range: &DayRange, provider: Option<&str>) -> Result<Usd> {
        Ok(open_db(&self.config)?.total_cost(range, provider)?)
    }

    pub fn cost_by_model(
        &self,
        range: &DayRange,
        provider: Option<&str>,
    ) -> Result<BTreeMap<String, Usd>> {
        Ok(open_db(&self.config)?.cost_by_model(range, provider)?)
    }

    pub fn cost_by_provider(&self, range: &DayRange) -> Result<BTreeMap<String, Usd>> {
        Ok(open_db(&self.config)?.cost_by_provider(range)?)
    }

    fn budget_limit(&self) -> Result<Option<(Usd, f64)>> {
        let settings = &self.config.settings;
        match settings.monthly_limit() {
            Some(limit) => {
                let limit = Usd::from_dollars(limit)
                    .map_err(|err| AppError::InvalidInput(err.to_string()))?;
                Ok(Some((limit, settings.budget.alert_threshold)))
            }
            None => Ok(None),
        }
    }
}
