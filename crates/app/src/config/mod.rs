use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use monitor_core::PriceInput;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};

pub const DEFAULT_STORAGE_DIR: &str = "~/.llm-cost-monitor";
pub const DB_FILE_NAME: &str = "usage.db";
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.8;

/// Contents of `config.toml`. Every section is optional.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub storage: StorageConfig,
    pub providers: ProvidersConfig,
    pub budget: BudgetConfig,
    pub notifications: NotificationsConfig,
    pub pricing: Vec<PriceInput>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_STORAGE_DIR.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.path)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(DB_FILE_NAME)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: OpenAiConfig,
    pub anthropic: AnthropicConfig,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub keys: Vec<String>,
    pub base_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub keys: Vec<String>,
    pub organization_id: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub monthly_limit: f64,
    /// Fraction of the budget (0.8 = 80%) at which alerts fire.
    pub alert_threshold: f64,
    pub notify_channels: Vec<String>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            monthly_limit: 0.0,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            notify_channels: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub feishu: FeishuConfig,
    pub telegram: TelegramConfig,
    pub discord: WebhookUrlConfig,
    pub slack: WebhookUrlConfig,
    pub webhook: CustomWebhookConfig,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FeishuConfig {
    /// Bot webhook. Takes precedence over app credentials.
    pub webhook_url: Option<String>,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub receive_id: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WebhookUrlConfig {
    pub webhook_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CustomWebhookConfig {
    pub url: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl MonitorConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.budget.alert_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(AppError::InvalidInput(format!(
                "budget.alert_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        Ok(())
    }

    /// Fills unset channel secrets from environment variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let notifications = &mut self.notifications;
        fill(&mut notifications.telegram.bot_token, || var("TELEGRAM_BOT_TOKEN"));
        fill(&mut notifications.telegram.chat_id, || var("TELEGRAM_CHAT_ID"));
        fill(&mut notifications.feishu.app_id, || var("FEISHU_APP_ID"));
        fill(&mut notifications.feishu.app_secret, || var("FEISHU_APP_SECRET"));
        fill(&mut notifications.feishu.receive_id, || var("FEISHU_USER_ID"));
        fill(&mut notifications.discord.webhook_url, || var("DISCORD_WEBHOOK_URL"));
        fill(&mut notifications.slack.webhook_url, || var("SLACK_WEBHOOK_URL"));
        fill(&mut notifications.webhook.url, || var("CUSTOM_WEBHOOK_URL"));
    }

    /// Configured monthly budget, if any.
    pub fn monthly_limit(&self) -> Option<f64> {
        let limit = self.budget.monthly_limit;
        (limit.is_finite() && limit > 0.0).then_some(limit)
    }
}

fn fill<F>(slot: &mut Option<String>, fallback: F)
where
    F: FnOnce() -> Option<String>,
{
    let missing = slot.as_deref().is_none_or(|value| value.trim().is_empty());
    if missing {
        *slot = fallback();
    }
}

/// Where a config file is looked for, in order.
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
    }
    paths.push(PathBuf::from("config").join("config.toml"));
    paths.push(expand_home(DEFAULT_STORAGE_DIR).join("config.toml"));
    paths
}

/// Loads the first config file found, or defaults when there is none.
///
/// An explicit path that does not exist is an error rather than a silent
/// fallback. Environment variables are applied last.
pub fn load_config(explicit: Option<&Path>) -> Result<(MonitorConfig, Option<PathBuf>)> {
    if let Some(path) = explicit.filter(|path| !path.exists()) {
        return Err(AppError::InvalidInput(format!(
            "config file {} not found",
            path.display()
        )));
    }
    let found = candidate_paths(explicit)
        .into_iter()
        .find(|path| path.is_file());
    let mut config = match &found {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            MonitorConfig::from_toml(&std::fs::read_to_string(path)?)?
        }
        None => {
            debug!("no config file found, using defaults");
            MonitorConfig::default()
        }
    };
    config.apply_env(|name| std::env::var(name).ok());
    Ok((config, found))
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    if path == "~" {
        return home();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home().join(rest),
        None => PathBuf::from(path),
    }
}

/// Date selection accepted by the report endpoints.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RangeParams {
    pub period: Option<String>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub provider: Option<String>,
}
