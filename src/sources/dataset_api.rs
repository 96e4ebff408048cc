//! Dataset-API record source.
//!
//! Fetches a snapshot of posting records from a third-party scraping
//! provider's dataset API (Bearer-authenticated JSON), pre-filters by query
//! keywords, and truncates to the requested limit. No scraping happens
//! here; the provider did that when it built the snapshot.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{RecordSource, RecordStream, SourceError};
use crate::config::ProviderConfig;
use crate::models::RawRecord;

/// Record fields searched during keyword pre-filtering.
const SEARCHABLE_KEYS: &[&str] = &[
    "job_title",
    "title",
    "job_summary",
    "job_description",
    "description",
    "company_name",
    "company",
    "job_location",
    "job_skills",
    "job_industry",
];

pub struct DatasetApiSource {
    client: Client,
    provider: String,
    api_key: String,
    base_url: String,
    snapshot_id: String,
}

impl DatasetApiSource {
    pub fn new(config: &ProviderConfig) -> Result<Self, SourceError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| SourceError::MissingCredentials("api key not set".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            provider: config.name.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            snapshot_id: config.snapshot_id.clone(),
        })
    }

    async fn fetch_snapshot(&self, fetch_limit: usize) -> Result<Vec<RawRecord>, SourceError> {
        let url = format!("{}/snapshot/{}", self.base_url, self.snapshot_id);
        tracing::debug!(%url, "fetching dataset snapshot");

        let fetch_limit = fetch_limit.to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("format", "json"), ("limit", fetch_limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let records: Vec<RawRecord> = response.json().await?;
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for DatasetApiSource {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn discover(&self, query: &str, limit: usize) -> Result<RecordStream, SourceError> {
        // Over-fetch so keyword filtering still leaves enough records.
        let mut records = self.fetch_snapshot((limit * 2).max(100)).await?;
        tracing::info!(count = records.len(), "snapshot fetched");

        let keywords: Vec<String> = query
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();
        if !keywords.is_empty() {
            records.retain(|record| matches_keywords(record, &keywords));
            tracing::debug!(count = records.len(), %query, "records after keyword filter");
        }

        records.truncate(limit);
        Ok(RecordStream::from_records(records))
    }
}

/// Whether any query keyword appears in any searchable field of the record.
fn matches_keywords(record: &RawRecord, keywords: &[String]) -> bool {
    let haystack: String = SEARCHABLE_KEYS
        .iter()
        .filter_map(|key| record.get(key).and_then(|v| v.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    keywords.iter().any(|kw| haystack.contains(kw.as_str()))
}
