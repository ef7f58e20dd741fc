use std::fmt;
use std::str::FromStr;

use monitor_core::{DayRange, Usd, format_cost};
use monitor_db::Db;
use serde::Serialize;

use crate::config::MonitorConfig;
use crate::error::{AppError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Ok,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    /// `threshold` is a fraction of the budget, `percentage` is in percent.
    pub fn classify(percentage: f64, threshold: f64) -> Self {
        if percentage < threshold * 100.0 {
            Self::Ok
        } else if percentage >= 100.0 {
            Self::Exceeded
        } else {
            Self::Warning
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Ok => "✅",
            Self::Warning => "⚠️",
            Self::Exceeded => "🔴",
        }
    }
}

/// How `alert` reports a crossed threshold through its exit code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlertMode {
    /// 2 when exceeded, 1 when in the warning band.
    #[default]
    Exit,
    /// 1 whenever the threshold is crossed.
    Warn,
}

impl FromStr for AlertMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "exit" => Ok(Self::Exit),
            "warn" => Ok(Self::Warn),
            other => Err(AppError::InvalidInput(format!(
                "unsupported alert mode {}, expected exit or warn",
                other
            ))),
        }
    }
}

impl fmt::Display for AlertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exit => "exit",
            Self::Warn => "warn",
        })
    }
}

/// Spending over a window measured against a budget.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetCheck {
    pub range: DayRange,
    pub total: Usd,
    pub limit: Usd,
    pub percentage: f64,
    pub threshold: f64,
    pub status: BudgetStatus,
}

impl BudgetCheck {
    pub fn new(range: DayRange, total: Usd, limit: Usd, threshold: f64) -> Self {
        let percentage = total.percent_of(limit);
        Self {
            range,
            total,
            limit,
            percentage,
            threshold,
            status: BudgetStatus::classify(percentage, threshold),
        }
    }

    pub fn exit_code(&self, mode: AlertMode) -> i32 {
        match (mode, self.status) {
            (_, BudgetStatus::Ok) => 0,
            (AlertMode::Exit, BudgetStatus::Exceeded) => 2,
            (AlertMode::Exit, BudgetStatus::Warning) | (AlertMode::Warn, _) => 1,
        }
    }

    /// One line for the OK case.
    pub fn summary(&self) -> String {
        format!(
            "{} Budget {}: {} / {} ({:.1}%)",
            self.status.emoji(),
            match self.status {
                BudgetStatus::Ok => "OK",
                BudgetStatus::Warning => "warning",
                BudgetStatus::Exceeded => "exceeded",
            },
            format_cost(self.total),
            format_cost(self.limit),
            self.percentage
        )
    }

    /// Notification text, present only once the threshold is crossed.
    pub fn alert_message(&self) -> Option<String> {
        let status = match self.status {
            BudgetStatus::Ok => return None,
            BudgetStatus::Warning => "⚠️ WARNING",
            BudgetStatus::Exceeded => "🔴 EXCEEDED",
        };
        Some(format!(
            "💰 LLM Cost Alert\n\n{status} Budget Alert!\n\nCurrent spending: {}\nBudget limit: {}\nUsage: {:.1}%\n\nPeriod: {}\n",
            format_cost(self.total),
            format_cost(self.limit),
            self.percentage,
            self.range
        ))
    }
}

/// Budget from the command line, else from the config file. A flag that is
/// not a positive amount is an error, never replaced by the config value.
pub fn resolve_budget(flag: Option<f64>, config: &MonitorConfig) -> Result<Usd> {
    if let Some(value) = flag.filter(|value| !(value.is_finite() && *value > 0.0)) {
        return Err(AppError::InvalidInput(format!(
            "budget must be a positive amount in USD, got {}",
            value
        )));
    }
    let limit = flag.or_else(|| config.monthly_limit());
    let Some(limit) = limit else {
        return Err(AppError::ConfigurationMissing(
            "No budget set. Use --budget or set budget.monthly_limit in the config file."
                .to_string(),
        ));
    };
    Usd::from_dollars(limit).map_err(|err| AppError::InvalidInput(err.to_string()))
}

pub fn check_budget(db: &Db, limit: Usd, threshold: f64, range: &DayRange) -> Result<BudgetCheck> {
    let total = db.total_cost(range, None)?;
    Ok(BudgetCheck::new(range.clone(), total, limit, threshold))
}
