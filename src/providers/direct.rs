//! Pass-through source for references the caller already resolved.

use super::{CandidateSource, SourceQuery};
use crate::types::{CandidateReference, ProviderOutcome, SourceId};
use async_trait::async_trait;

/// Treats the query text as an http(s) URL
#[derive(Clone, Debug, Default)]
pub struct DirectSource;

impl DirectSource {
    /// Create the source
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CandidateSource for DirectSource {
    fn id(&self) -> SourceId {
        SourceId::Direct
    }

    async fn resolve(&self, query: &SourceQuery) -> ProviderOutcome {
        match url::Url::parse(query.text.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                ProviderOutcome::from_candidates(vec![CandidateReference::url(
                    SourceId::Direct,
                    url.as_str(),
                )])
            }
            Ok(url) => ProviderOutcome::Error(format!("unsupported URL scheme '{}'", url.scheme())),
            Err(e) => ProviderOutcome::Error(format!("invalid URL '{}': {}", query.text, e)),
        }
    }
}
