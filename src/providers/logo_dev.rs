//! Direct logo lookup by domain via Logo.dev.
//!
//! Unlike the search sources this one downloads the image itself and hands it on
//! as an in-memory candidate.

use super::{CandidateSource, SourceQuery, base_url, describe_reqwest};
use crate::config::Config;
use crate::types::{CandidateReference, ProviderOutcome, SourceId};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches a logo for the domain given as query text
pub struct LogoDevSource {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl LogoDevSource {
    /// Create the source
    pub fn new(client: reqwest::Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl CandidateSource for LogoDevSource {
    fn id(&self) -> SourceId {
        SourceId::LogoDev
    }

    async fn resolve(&self, query: &SourceQuery) -> ProviderOutcome {
        let domain = query.text.trim();
        if domain.is_empty() || domain.contains('/') {
            return ProviderOutcome::Error(format!("not a domain: '{}'", query.text));
        }

        let url = format!("{}/{}", base_url(&self.config.endpoints.logo_dev), domain);
        let size = self.config.search.logo_size.to_string();

        tracing::debug!(domain, "fetching logo");

        let response = match self
            .client
            .get(&url)
            .query(&[("size", size.as_str()), ("format", "png")])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ProviderOutcome::Error(describe_reqwest(e)),
        };

        if !response.status().is_success() {
            return ProviderOutcome::Error(format!("HTTP {}", response.status()));
        }

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => return ProviderOutcome::Error(describe_reqwest(e)),
        };

        // Tiny bodies are placeholder responses, not logos
        if bytes.len() <= self.config.search.min_logo_bytes {
            return ProviderOutcome::Error(format!(
                "logo response too small ({} bytes)",
                bytes.len()
            ));
        }

        // Error pages can come back with a 200; only hand on bytes that decode
        if let Err(e) = image::load_from_memory(&bytes) {
            tracing::debug!(domain, error = %e, "logo response does not decode");
            return ProviderOutcome::Error("logo response is not an image".to_string());
        }

        ProviderOutcome::from_candidates(vec![CandidateReference::bytes(
            SourceId::LogoDev,
            bytes.to_vec(),
        )])
    }
}
