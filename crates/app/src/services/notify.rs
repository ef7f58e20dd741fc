use crate::error::Result;
use crate::notify::{self, Delivery};
use crate::services::SharedConfig;

#[derive(Clone)]
pub struct NotifyService {
    config: SharedConfig,
}

impl NotifyService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Sends to `channels`, or to the configured notify channels, or to the
    /// console when neither names any.
    pub async fn send(&self, message: &str, channels: &[String]) -> Result<Vec<Delivery>> {
        let settings = &self.config.settings;
        let channels: Vec<String> = if !channels.is_empty() {
            channels.to_vec()
        } else if !settings.budget.notify_channels.is_empty() {
            settings.budget.notify_channels.clone()
        } else {
            vec!["console".to_string()]
        };
        let http = notify::http_client()?;
        Ok(notify::send_all(&http, &channels, &settings.notifications, message).await)
    }
}
