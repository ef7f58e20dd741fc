use ingest::{IngestStats, ProviderClient, http_client, ingest_provider};
use monitor_core::{UsageDate, pricing};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

#[derive(Clone)]
pub struct IngestService {
    config: SharedConfig,
}

#[derive(Clone, Debug, Serialize)]
pub struct DayStats {
    pub date: String,
    pub stats: IngestStats,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct FetchSummary {
    pub days: Vec<DayStats>,
    pub total: IngestStats,
}

impl IngestService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Provider clients with the keys configured for each.
    pub fn sources(&self) -> Vec<(ProviderClient, Vec<String>)> {
        let providers = &self.config.settings.providers;
        let mut sources = Vec::new();

        let openai = &providers.openai;
        if !openai.keys.is_empty() {
            let mut client = ProviderClient::openai();
            if let Some(url) = &openai.base_url {
                client = client.with_base_url(url.as_str());
            }
            sources.push((client, openai.keys.clone()));
        }

        let anthropic = &providers.anthropic;
        let organization = anthropic
            .organization_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        if let (false, Some(organization)) = (anthropic.keys.is_empty(), organization) {
            let mut client = ProviderClient::anthropic(organization);
            if let Some(url) = &anthropic.base_url {
                client = client.with_base_url(url.as_str());
            }
            sources.push((client, anthropic.keys.clone()));
        }
        sources
    }

    /// Fetches each date from every configured provider.
    pub async fn fetch(&self, dates: &[UsageDate], dry_run: bool) -> Result<FetchSummary> {
        let sources = self.sources();
        if sources.is_empty() {
            return Err(AppError::ConfigurationMissing(
                "No provider keys configured. Add providers.openai.keys or providers.anthropic.keys with organization_id to the config file.".to_string(),
            ));
        }
        let http = http_client().map_err(|err| AppError::Message(err.to_string()))?;
        let mut db = open_db(&self.config)?;
        let mut summary = FetchSummary::default();
        for date in dates {
            let mut day = IngestStats {
                dry_run,
                ..IngestStats::default()
            };
            for (client, keys) in &sources {
                let stats = ingest_provider(
                    &mut db,
                    &http,
                    client,
                    keys,
                    date,
                    pricing::global(),
                    dry_run,
                )
                .await?;
                day.merge(stats);
            }
            summary.total.merge(day.clone());
            summary.days.push(DayStats {
                date: date.to_string(),
                stats: day,
            });
        }
        Ok(summary)
    }
}
