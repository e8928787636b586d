//! Candidate sources
//!
//! A [`CandidateSource`] turns a query into an ordered list of candidate references.
//! Sources never return errors across this boundary: every internal fault is mapped
//! to [`ProviderOutcome::Error`], and a missing prerequisite (usually a credential)
//! to [`ProviderOutcome::Unavailable`], so the resolver can treat fallback as a
//! plain data-driven loop.
//!
//! | Source | Role | Prerequisite |
//! |---|---|---|
//! | [`SerpApiSource`] | primary web image search | `SERPAPI_KEY` |
//! | [`DuckDuckGoSource`] | secondary web image search | none |
//! | [`LogoDevSource`] | direct logo lookup by domain | none |
//! | [`UnsplashSource`] | stock photos | `UNSPLASH_ACCESS_KEY` |
//! | [`PexelsSource`] | stock photos | `PEXELS_API_KEY` |
//! | [`DirectSource`] | pass-through for caller-supplied URLs | none |

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{ProviderOutcome, SearchFilters, SourceId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

mod direct;
mod duckduckgo;
mod logo_dev;
mod pexels;
mod serpapi;
mod unsplash;

#[cfg(test)]
mod tests;

pub use direct::DirectSource;
pub use duckduckgo::DuckDuckGoSource;
pub use logo_dev::LogoDevSource;
pub use pexels::PexelsSource;
pub use serpapi::SerpApiSource;
pub use unsplash::UnsplashSource;

/// What a source is asked for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceQuery {
    /// Query text after any per-step rewrite (search terms, domain, or URL)
    pub text: String,
    /// Size/type hints; sources that cannot honour them ignore them
    pub filters: SearchFilters,
    /// Maximum number of candidates wanted
    pub limit: usize,
}

impl SourceQuery {
    /// Create a query without filters
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            filters: SearchFilters::default(),
            limit,
        }
    }
}

/// One external data source capable of yielding image references for a query
///
/// # Contract
///
/// - Never panics or returns an error; faults become [`ProviderOutcome::Error`].
/// - A missing prerequisite is [`ProviderOutcome::Unavailable`], distinguishable
///   from a fault so callers can fall back silently.
/// - A `Success` is never empty; zero candidates is `Error("no results")`.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Identifier used in chains and logs
    fn id(&self) -> SourceId;

    /// Look up candidates for `query`
    async fn resolve(&self, query: &SourceQuery) -> ProviderOutcome;
}

/// Build the HTTP client shared by all lookup calls
///
/// Carries the short lookup timeout and the configured user agent.
pub fn lookup_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeouts.lookup)
        .user_agent(config.search.user_agent.clone())
        .build()
        .map_err(Error::Network)
}

/// Construct every built-in source from one shared configuration
pub fn default_sources(config: Arc<Config>) -> Result<HashMap<SourceId, Arc<dyn CandidateSource>>> {
    let client = lookup_client(&config)?;

    let sources: Vec<Arc<dyn CandidateSource>> = vec![
        Arc::new(SerpApiSource::new(client.clone(), config.clone())),
        Arc::new(DuckDuckGoSource::new(client.clone(), config.clone())),
        Arc::new(LogoDevSource::new(client.clone(), config.clone())),
        Arc::new(UnsplashSource::new(client.clone(), config.clone())),
        Arc::new(PexelsSource::new(client, config)),
        Arc::new(DirectSource::new()),
    ];

    Ok(sources.into_iter().map(|s| (s.id(), s)).collect())
}

/// Send `request` and decode a JSON body, describing any failure as a cause string
async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> std::result::Result<T, String> {
    let response = request.send().await.map_err(describe_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| format!("malformed response: {}", e))
}

fn describe_reqwest(e: reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    }
}

/// Trim a trailing slash so paths can be appended with `format!`
fn base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}
