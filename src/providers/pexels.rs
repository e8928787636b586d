//! Stock photos from Pexels.

use super::{CandidateSource, SourceQuery, base_url, fetch_json};
use crate::config::Config;
use crate::types::{CandidateReference, ProviderOutcome, SourceId};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Pexels caps `per_page` at 80
const MAX_PER_PAGE: usize = 80;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large: Option<String>,
}

/// Keyed stock photo source; `Unavailable` without an API key
pub struct PexelsSource {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl PexelsSource {
    /// Create the source
    pub fn new(client: reqwest::Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl CandidateSource for PexelsSource {
    fn id(&self) -> SourceId {
        SourceId::Pexels
    }

    async fn resolve(&self, query: &SourceQuery) -> ProviderOutcome {
        let Some(key) = self.config.credentials.pexels_api_key.as_deref() else {
            return ProviderOutcome::Unavailable("no Pexels API key configured".to_string());
        };

        let url = format!("{}/v1/search", base_url(&self.config.endpoints.pexels));
        let per_page = query.limit.clamp(1, MAX_PER_PAGE).to_string();

        tracing::debug!(query = %query.text, per_page = %per_page, "querying Pexels");

        let request = self
            .client
            .get(&url)
            .header("Authorization", key)
            .query(&[("query", query.text.as_str()), ("per_page", per_page.as_str())]);

        let response: SearchResponse = match fetch_json(request).await {
            Ok(r) => r,
            Err(cause) => return ProviderOutcome::Error(cause),
        };

        let candidates = response
            .photos
            .into_iter()
            .filter_map(|p| p.src.large)
            .take(query.limit)
            .map(|u| CandidateReference::url(SourceId::Pexels, u))
            .collect();

        ProviderOutcome::from_candidates(candidates)
    }
}
