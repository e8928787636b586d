//! Stock photos from Unsplash.

use super::{CandidateSource, SourceQuery, base_url, fetch_json};
use crate::config::Config;
use crate::types::{CandidateReference, ProviderOutcome, SourceId};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Unsplash caps `per_page` at 30
const MAX_PER_PAGE: usize = 30;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
}

/// Keyed stock photo source; `Unavailable` without an access key
pub struct UnsplashSource {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl UnsplashSource {
    /// Create the source
    pub fn new(client: reqwest::Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl CandidateSource for UnsplashSource {
    fn id(&self) -> SourceId {
        SourceId::Unsplash
    }

    async fn resolve(&self, query: &SourceQuery) -> ProviderOutcome {
        let Some(key) = self.config.credentials.unsplash_access_key.as_deref() else {
            return ProviderOutcome::Unavailable("no Unsplash access key configured".to_string());
        };

        let url = format!("{}/search/photos", base_url(&self.config.endpoints.unsplash));
        let per_page = query.limit.clamp(1, MAX_PER_PAGE).to_string();

        tracing::debug!(query = %query.text, per_page = %per_page, "querying Unsplash");

        let request = self
            .client
            .get(&url)
            .header("Authorization", format!("Client-ID {}", key))
            .query(&[
                ("query", query.text.as_str()),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
            ]);

        let response: SearchResponse = match fetch_json(request).await {
            Ok(r) => r,
            Err(cause) => return ProviderOutcome::Error(cause),
        };

        let candidates = response
            .results
            .into_iter()
            .filter_map(|p| p.urls.regular)
            .take(query.limit)
            .map(|u| CandidateReference::url(SourceId::Unsplash, u))
            .collect();

        ProviderOutcome::from_candidates(candidates)
    }
}
