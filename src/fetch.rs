//! Payload downloads for URL candidates.

use crate::config::{Config, RetryConfig};
use crate::error::{Error, FetchError, Result};
use crate::retry::fetch_with_retry;

/// Downloads candidate payloads with the long download timeout
#[derive(Clone, Debug)]
pub struct PayloadFetcher {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl PayloadFetcher {
    /// Build a fetcher from the download timeout, user agent and retry settings
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeouts.download)
            .user_agent(config.search.user_agent.clone())
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    /// Download `url`, retrying transient failures
    pub async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        fetch_with_retry(&self.retry, || self.fetch_once(url)).await
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        Ok(bytes.to_vec())
    }
}
