use std::time::Duration;

use monitor_core::{TokenCounts, UsageDate};
use serde::Deserialize;
use tracing::debug;

use crate::types::{IngestError, Result, UsageLine};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client for provider fetches.
pub fn http_client() -> std::result::Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// Usage endpoints the monitor knows how to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderClient {
    OpenAi {
        base_url: String,
    },
    Anthropic {
        base_url: String,
        organization_id: String,
    },
}

impl ProviderClient {
    pub fn openai() -> Self {
        Self::OpenAi {
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn anthropic(organization_id: impl Into<String>) -> Self {
        Self::Anthropic {
            base_url: ANTHROPIC_BASE_URL.to_string(),
            organization_id: organization_id.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        match &mut self {
            Self::OpenAi { base_url } | Self::Anthropic { base_url, .. } => *base_url = url,
        }
        self
    }

    /// Provider tag stored in the ledger.
    pub fn provider(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "openai",
            Self::Anthropic { .. } => "anthropic",
        }
    }

    /// Fetches the usage lines one key produced on `date`.
    pub async fn fetch_day(
        &self,
        http: &reqwest::Client,
        api_key: &str,
        date: &UsageDate,
    ) -> Result<Vec<UsageLine>> {
        let provider = self.provider();
        let request = match self {
            Self::OpenAi { base_url } => http
                .get(format!("{base_url}/v1/usage"))
                .bearer_auth(api_key)
                .query(&[("date", date.as_str())]),
            Self::Anthropic {
                base_url,
                organization_id,
            } => http
                .get(format!(
                    "{base_url}/v1/organizations/{organization_id}/usage"
                ))
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_API_VERSION)
                .query(&[("start_date", date.as_str()), ("end_date", date.as_str())]),
        };

        let response = request
            .send()
            .await
            .map_err(|source| IngestError::Http { provider, source })?;
        let status = response.status();
        debug!(provider, status = %status, date = %date, "usage response received");
        let body = response
            .text()
            .await
            .map_err(|source| IngestError::Http { provider, source })?;
        if !status.is_success() {
            return Err(IngestError::Status {
                provider,
                status: status.as_u16(),
                body,
            });
        }

        match self {
            Self::OpenAi { .. } => parse_openai(&body, date),
            Self::Anthropic { .. } => parse_anthropic(&body, date),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    data: Vec<OpenAiItem>,
}

#[derive(Debug, Deserialize)]
struct OpenAiItem {
    #[serde(default)]
    snapshot_id: Option<String>,
    #[serde(default)]
    n_context_tokens_total: u64,
    #[serde(default)]
    n_generated_tokens_total: u64,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    daily_usage: Vec<AnthropicDay>,
}

#[derive(Debug, Deserialize)]
struct AnthropicDay {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    usage: Vec<AnthropicItem>,
}

#[derive(Debug, Deserialize)]
struct AnthropicItem {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default)]
    cache_read_tokens: u64,
    #[serde(default)]
    cache_creation_tokens: u64,
}

fn model_or_unknown(model: Option<String>) -> String {
    model
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn parse_openai(body: &str, date: &UsageDate) -> Result<Vec<UsageLine>> {
    let usage: OpenAiUsage = serde_json::from_str(body).map_err(|err| IngestError::Decode {
        provider: "openai",
        message: err.to_string(),
    })?;
    Ok(usage
        .data
        .into_iter()
        .filter(|item| item.n_context_tokens_total > 0 || item.n_generated_tokens_total > 0)
        .map(|item| UsageLine {
            date: date.clone(),
            model: model_or_unknown(item.snapshot_id),
            tokens: TokenCounts::new(item.n_context_tokens_total, item.n_generated_tokens_total),
        })
        .collect())
}

fn parse_anthropic(body: &str, date: &UsageDate) -> Result<Vec<UsageLine>> {
    let usage: AnthropicUsage = serde_json::from_str(body).map_err(|err| IngestError::Decode {
        provider: "anthropic",
        message: err.to_string(),
    })?;
    let mut lines = Vec::new();
    for day in usage.daily_usage {
        let day_date = match day.date.as_deref() {
            Some(value) => UsageDate::parse(value).map_err(|err| IngestError::Decode {
                provider: "anthropic",
                message: err.to_string(),
            })?,
            None => date.clone(),
        };
        for item in day.usage {
            lines.push(UsageLine {
                date: day_date.clone(),
                model: model_or_unknown(item.model),
                tokens: TokenCounts::new(item.input_tokens, item.output_tokens)
                    .with_cache(item.cache_read_tokens, item.cache_creation_tokens),
            });
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> UsageDate {
        UsageDate::parse("2024-06-01").expect("date")
    }

    #[test]
    fn openai_skips_idle_snapshots() {
        let body = r#"{"data":[
            {"snapshot_id":"gpt-4o-2024-05-13","n_context_tokens_total":120,"n_generated_tokens_total":40},
            {"snapshot_id":"gpt-4o-mini","n_context_tokens_total":0,"n_generated_tokens_total":0},
            {"n_context_tokens_total":5}
        ]}"#;
        let lines = parse_openai(body, &day()).expect("parse");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].model, "gpt-4o-2024-05-13");
        assert_eq!(lines[0].tokens, TokenCounts::new(120, 40));
        assert_eq!(lines[1].model, "unknown");
    }

    #[test]
    fn openai_tolerates_missing_data() {
        assert!(parse_openai("{}", &day()).expect("parse").is_empty());
    }

    #[test]
    fn anthropic_reads_cache_counts_and_day_dates() {
        let body = r#"{"daily_usage":[
            {"date":"2024-06-02","usage":[
                {"model":"claude-3-5-sonnet-20241022","input_tokens":10,"output_tokens":20,
                 "cache_read_tokens":300,"cache_creation_tokens":40}
            ]},
            {"usage":[{"model":"claude-3-haiku","input_tokens":1}]}
        ]}"#;
        let lines = parse_anthropic(body, &day()).expect("parse");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].date.as_str(), "2024-06-02");
        assert_eq!(lines[0].tokens, TokenCounts::new(10, 20).with_cache(300, 40));
        assert_eq!(lines[1].date, day());
    }

    #[test]
    fn anthropic_rejects_malformed_dates() {
        let body = r#"{"daily_usage":[{"date":"June 2","usage":[]}]}"#;
        let err = parse_anthropic(body, &day()).expect_err("bad date");
        assert!(matches!(err, IngestError::Decode { .. }));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = parse_openai("not json", &day()).expect_err("bad json");
        assert!(matches!(err, IngestError::Decode { provider: "openai", .. }));
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let client = ProviderClient::anthropic("org-1").with_base_url("http://127.0.0.1:9/");
        assert_eq!(
            client,
            ProviderClient::Anthropic {
                base_url: "http://127.0.0.1:9".to_string(),
                organization_id: "org-1".to_string(),
            }
        );
        assert_eq!(client.provider(), "anthropic");
    }
}
