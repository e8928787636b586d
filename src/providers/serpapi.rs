//! Primary web image search via SerpApi's Google Images engine.

use super::{CandidateSource, SourceQuery, base_url, fetch_json};
use crate::config::Config;
use crate::types::{CandidateReference, ProviderOutcome, SourceId};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    images_results: Vec<ImageResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    original: Option<String>,
}

/// Quota-gated primary search; `Unavailable` without a SerpApi key
pub struct SerpApiSource {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl SerpApiSource {
    /// Create the source
    pub fn new(client: reqwest::Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl CandidateSource for SerpApiSource {
    fn id(&self) -> SourceId {
        SourceId::SerpApi
    }

    async fn resolve(&self, query: &SourceQuery) -> ProviderOutcome {
        let Some(key) = self.config.credentials.serpapi_key.as_deref() else {
            return ProviderOutcome::Unavailable("no SerpApi key configured".to_string());
        };

        let url = format!("{}/search.json", base_url(&self.config.endpoints.serpapi));
        let num = query.limit.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("engine", "google_images"),
            ("q", query.text.as_str()),
            ("num", num.as_str()),
            ("api_key", key),
        ];
        if let Some(size) = query.filters.size {
            params.push(("imgsz", size.as_param()));
        }
        if let Some(kind) = query.filters.kind {
            params.push(("imgtype", kind.as_param()));
        }

        tracing::debug!(query = %query.text, limit = query.limit, "querying SerpApi");

        let response: SearchResponse = match fetch_json(self.client.get(&url).query(&params)).await
        {
            Ok(r) => r,
            Err(cause) => return ProviderOutcome::Error(cause),
        };

        if let Some(error) = response.error {
            return ProviderOutcome::Error(error);
        }

        let candidates = response
            .images_results
            .into_iter()
            .filter_map(|r| r.original)
            .take(query.limit)
            .map(|u| CandidateReference::url(SourceId::SerpApi, u))
            .collect();

        ProviderOutcome::from_candidates(candidates)
    }
}
