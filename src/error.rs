//! Error types for image-acquire
//!
//! Only request-level failures live in [`Error`]. Provider faults never cross the
//! resolver boundary as errors: they are downgraded to
//! [`ProviderOutcome`](crate::types::ProviderOutcome) values and trigger fallback.
//! Candidate-level failures ([`FetchError`], [`NormalizeError`]) are logged and the
//! candidate is discarded.

use crate::types::AcquisitionMode;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for image-acquire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for image-acquire
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "search.overfetch_factor")
        key: Option<String>,
    },

    /// The request itself is malformed (zero count, empty query, ...)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network error outside of a provider call (e.g. building the HTTP client)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No provider in the chain yielded usable candidates
    #[error("all providers exhausted for {mode} request")]
    ChainExhausted {
        /// Mode whose chain was exhausted
        mode: AcquisitionMode,
    },

    /// Candidates were found but none of them produced an artifact
    #[error("no images stored for '{query}' ({attempted} candidates tried)")]
    NoResults {
        /// The original query
        query: String,
        /// How many candidates were tried before giving up
        attempted: usize,
    },

    /// The caller cancelled the acquisition before anything was stored
    #[error("acquisition cancelled")]
    Cancelled,
}

impl Error {
    /// Process exit code for this error
    ///
    /// Acquisition failures map to `1`, configuration and request errors to `2`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config { .. } | Error::InvalidRequest(_) => 2,
            _ => 1,
        }
    }

    /// Shorthand for a configuration error on a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Errors raised while turning raw bytes into a stored artifact
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Payload is not a recognizable image, or is truncated
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Re-encoding to the canonical format failed
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// Writing the artifact failed
    #[error("failed to write {path}: {source}")]
    Io {
        /// The artifact path being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The blocking codec task panicked or was cancelled
    #[error("codec task failed: {0}")]
    Join(String),
}

/// Errors raised while downloading a candidate's payload
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request exceeded the download timeout
    #[error("timed out fetching {url}")]
    Timeout {
        /// URL being fetched
        url: String,
    },

    /// Could not connect to the remote host
    #[error("connection failed for {url}: {source}")]
    Connect {
        /// URL being fetched
        url: String,
        /// Underlying error
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// URL being fetched
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Any other request failure
    #[error("failed to fetch {url}: {source}")]
    Request {
        /// URL being fetched
        url: String,
        /// Underlying error
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Classify a reqwest error for `url`
    pub fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
                source: e,
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source: e,
            }
        }
    }
}
