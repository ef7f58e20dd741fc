use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::NotificationsConfig;

pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const FEISHU_API_BASE: &str = "https://open.feishu.cn";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("unknown notification channel {0}")]
    UnknownChannel(String),
    #[error("{channel} is not configured: {detail}")]
    NotConfigured {
        channel: &'static str,
        detail: &'static str,
    },
    #[error("{channel} request failed: {source}")]
    Http {
        channel: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{channel} rejected the message ({status}): {body}")]
    Rejected {
        channel: &'static str,
        status: u16,
        body: String,
    },
}

pub fn http_client() -> Result<reqwest::Client, NotifyError> {
    reqwest::Client::builder()
        .timeout(NOTIFY_TIMEOUT)
        .build()
        .map_err(request_failed("http"))
}

/// Channel URLs carry secrets (bot tokens, webhook paths), so they are
/// stripped from the error before it is logged or shown.
fn request_failed(channel: &'static str) -> impl Fn(reqwest::Error) -> NotifyError {
    move |source| NotifyError::Http {
        channel,
        source: source.without_url(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeishuTarget {
    Webhook {
        url: String,
    },
    App {
        app_id: String,
        app_secret: String,
        receive_id: String,
        api_base: String,
    },
}

/// A configured delivery target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    Console,
    Feishu(FeishuTarget),
    Telegram {
        bot_token: String,
        chat_id: String,
        api_base: String,
    },
    Discord {
        webhook_url: String,
    },
    Slack {
        webhook_url: String,
    },
    Webhook {
        url: String,
        headers: BTreeMap<String, String>,
    },
}

fn required(
    value: &Option<String>,
    channel: &'static str,
    detail: &'static str,
) -> Result<String, NotifyError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(NotifyError::NotConfigured { channel, detail })
}

impl Channel {
    /// Builds the channel `name` from its settings.
    pub fn from_config(name: &str, config: &NotificationsConfig) -> Result<Self, NotifyError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "feishu" => {
                let feishu = &config.feishu;
                if let Ok(url) = required(&feishu.webhook_url, "feishu", "") {
                    return Ok(Self::Feishu(FeishuTarget::Webhook { url }));
                }
                Ok(Self::Feishu(FeishuTarget::App {
                    app_id: required(&feishu.app_id, "feishu", "set webhook_url or app_id")?,
                    app_secret: required(&feishu.app_secret, "feishu", "app_secret missing")?,
                    receive_id: required(&feishu.receive_id, "feishu", "receive_id missing")?,
                    api_base: feishu
                        .api_base
                        .clone()
                        .unwrap_or_else(|| FEISHU_API_BASE.to_string()),
                }))
            }
            "telegram" => Ok(Self::Telegram {
                bot_token: required(&config.telegram.bot_token, "telegram", "bot_token missing")?,
                chat_id: required(&config.telegram.chat_id, "telegram", "chat_id missing")?,
                api_base: config
                    .telegram
                    .api_base
                    .clone()
                    .unwrap_or_else(|| TELEGRAM_API_BASE.to_string()),
            }),
            "discord" => Ok(Self::Discord {
                webhook_url: required(&config.discord.webhook_url, "discord", "webhook_url missing")?,
            }),
            "slack" => Ok(Self::Slack {
                webhook_url: required(&config.slack.webhook_url, "slack", "webhook_url missing")?,
            }),
            "webhook" => Ok(Self::Webhook {
                url: required(&config.webhook.url, "webhook", "url missing")?,
                headers: config.webhook.headers.clone(),
            }),
            other => Err(NotifyError::UnknownChannel(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Feishu(_) => "feishu",
            Self::Telegram { .. } => "telegram",
            Self::Discord { .. } => "discord",
            Self::Slack { .. } => "slack",
            Self::Webhook { .. } => "webhook",
        }
    }

    pub async fn send(&self, http: &reqwest::Client, message: &str) -> Result<(), NotifyError> {
        let channel = self.name();
        match self {
            Self::Console => {
                println!("[console] {message}");
                Ok(())
            }
            Self::Feishu(FeishuTarget::Webhook { url }) => {
                let payload = json!({"msg_type": "text", "content": {"text": message}});
                let body = post_json(http, channel, url, &payload, &[]).await?;
                expect_code_zero(channel, &body)
            }
            Self::Feishu(FeishuTarget::App {
                app_id,
                app_secret,
                receive_id,
                api_base,
            }) => {
                let token_url = format!("{api_base}/open-apis/auth/v3/tenant_access_token/internal");
                let body = post_json(
                    http,
                    channel,
                    &token_url,
                    &json!({"app_id": app_id, "app_secret": app_secret}),
                    &[],
                )
                .await?;
                expect_code_zero(channel, &body)?;
                let token = body
                    .get("tenant_access_token")
                    .and_then(Value::as_str)
                    .ok_or_else(|| rejected(channel, 200, &body))?;
                let message_url =
                    format!("{api_base}/open-apis/im/v1/messages?receive_id_type=open_id");
                let payload = json!({
                    "msg_type": "text",
                    "receive_id": receive_id,
                    "content": json!({"text": message}).to_string(),
                });
                let auth = format!("Bearer {token}");
                let body = post_json(
                    http,
                    channel,
                    &message_url,
                    &payload,
                    &[("Authorization", auth.as_str())],
                )
                .await?;
                expect_code_zero(channel, &body)
            }
            Self::Telegram {
                bot_token,
                chat_id,
                api_base,
            } => {
                let url = format!("{api_base}/bot{bot_token}/sendMessage");
                let payload = json!({"chat_id": chat_id, "text": message});
                let body = post_json(http, channel, &url, &payload, &[]).await?;
                match body.get("ok").and_then(Value::as_bool) {
                    Some(true) => Ok(()),
                    _ => Err(rejected(channel, 200, &body)),
                }
            }
            Self::Discord { webhook_url } => {
                let payload = json!({"content": message});
                post_expect_status(http, channel, webhook_url, &payload, &[], &[200, 204]).await
            }
            Self::Slack { webhook_url } => {
                let payload = json!({"text": message});
                post_expect_status(http, channel, webhook_url, &payload, &[], &[200, 204]).await
            }
            Self::Webhook { url, headers } => {
                let payload = json!({"text": message});
                let headers: Vec<(&str, &str)> = headers
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str()))
                    .collect();
                post_expect_status(http, channel, url, &payload, &headers, &[200, 201, 204]).await
            }
        }
    }
}

fn rejected(channel: &'static str, status: u16, body: &Value) -> NotifyError {
    NotifyError::Rejected {
        channel,
        status,
        body: body.to_string(),
    }
}

fn expect_code_zero(channel: &'static str, body: &Value) -> Result<(), NotifyError> {
    match body.get("code").and_then(Value::as_i64) {
        Some(0) => Ok(()),
        _ => Err(rejected(channel, 200, body)),
    }
}

fn build_post<'a>(
    http: &reqwest::Client,
    url: &str,
    payload: &Value,
    headers: &[(&'a str, &'a str)],
) -> reqwest::RequestBuilder {
    headers
        .iter()
        .fold(http.post(url).json(payload), |request, (name, value)| {
            request.header(*name, *value)
        })
}

/// Posts and decodes a JSON reply. Non-2xx is a rejection.
async fn post_json(
    http: &reqwest::Client,
    channel: &'static str,
    url: &str,
    payload: &Value,
    headers: &[(&str, &str)],
) -> Result<Value, NotifyError> {
    let response = build_post(http, url, payload, headers)
        .send()
        .await
        .map_err(request_failed(channel))?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(request_failed(channel))?;
    if !status.is_success() {
        return Err(NotifyError::Rejected {
            channel,
            status: status.as_u16(),
            body: text,
        });
    }
    serde_json::from_str(&text).map_err(|_| NotifyError::Rejected {
        channel,
        status: status.as_u16(),
        body: text,
    })
}

async fn post_expect_status(
    http: &reqwest::Client,
    channel: &'static str,
    url: &str,
    payload: &Value,
    headers: &[(&str, &str)],
    accepted: &[u16],
) -> Result<(), NotifyError> {
    let response = build_post(http, url, payload, headers)
        .send()
        .await
        .map_err(request_failed(channel))?;
    let status = response.status().as_u16();
    if accepted.contains(&status) {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::Rejected {
        channel,
        status,
        body,
    })
}

/// Outcome of one channel in a fan-out.
#[derive(Clone, Debug, Serialize)]
pub struct Delivery {
    pub channel: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sends `message` to every named channel. A channel that is unknown,
/// unconfigured or failing is reported and skipped; the rest still run.
pub async fn send_all(
    http: &reqwest::Client,
    names: &[String],
    config: &NotificationsConfig,
    message: &str,
) -> Vec<Delivery> {
    let mut deliveries = Vec::with_capacity(names.len());
    for name in names {
        let outcome = match Channel::from_config(name, config) {
            Ok(channel) => channel.send(http, message).await,
            Err(err) => Err(err),
        };
        let delivery = match outcome {
            Ok(()) => {
                info!(channel = %name, "notification sent");
                Delivery {
                    channel: name.clone(),
                    ok: true,
                    error: None,
                }
            }
            Err(err) => {
                warn!(channel = %name, error = %err, "notification failed");
                Delivery {
                    channel: name.clone(),
                    ok: false,
                    error: Some(err.to_string()),
                }
            }
        };
        deliveries.push(delivery);
    }
    deliveries
}
