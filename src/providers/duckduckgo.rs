//! Secondary, keyless web image search via DuckDuckGo.
//!
//! Image search is a two-step exchange: the HTML search page embeds a `vqd` token
//! which must accompany the JSON image query.

use super::{CandidateSource, SourceQuery, base_url, describe_reqwest, fetch_json};
use crate::config::Config;
use crate::types::{CandidateReference, ProviderOutcome, SourceId};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};

#[allow(clippy::expect_used)]
static VQD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"vqd=["']?([\d-]+)["']?"#).expect("vqd pattern is valid"));

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    results: Vec<ImageResult>,
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    image: Option<String>,
}

/// Keyless fallback search; always available, may still fail
pub struct DuckDuckGoSource {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl DuckDuckGoSource {
    /// Create the source
    pub fn new(client: reqwest::Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    async fn fetch_token(&self, base: &str, text: &str) -> Result<String, String> {
        let response = self
            .client
            .get(format!("{}/", base))
            .query(&[("q", text)])
            .send()
            .await
            .map_err(describe_reqwest)?;

        if !response.status().is_success() {
            return Err(format!("HTTP {} fetching search token", response.status()));
        }

        let body = response.text().await.map_err(describe_reqwest)?;
        extract_vqd(&body).ok_or_else(|| "search token not found".to_string())
    }
}

fn extract_vqd(body: &str) -> Option<String> {
    VQD.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[async_trait]
impl CandidateSource for DuckDuckGoSource {
    fn id(&self) -> SourceId {
        SourceId::DuckDuckGo
    }

    async fn resolve(&self, query: &SourceQuery) -> ProviderOutcome {
        let base = base_url(&self.config.endpoints.duckduckgo);

        tracing::debug!(query = %query.text, limit = query.limit, "querying DuckDuckGo");

        let vqd = match self.fetch_token(base, &query.text).await {
            Ok(v) => v,
            Err(cause) => return ProviderOutcome::Error(cause),
        };

        let request = self
            .client
            .get(format!("{}/i.js", base))
            .header("Referer", format!("{}/", base))
            .query(&[
                ("l", "us-en"),
                ("o", "json"),
                ("q", query.text.as_str()),
                ("vqd", vqd.as_str()),
                ("f", ",,,,,"),
                ("p", "1"),
            ]);

        let response: ImagesResponse = match fetch_json(request).await {
            Ok(r) => r,
            Err(cause) => return ProviderOutcome::Error(cause),
        };

        let candidates = response
            .results
            .into_iter()
            .filter_map(|r| r.image)
            .take(query.limit)
            .map(|u| CandidateReference::url(SourceId::DuckDuckGo, u))
            .collect();

        ProviderOutcome::from_candidates(candidates)
    }
}
