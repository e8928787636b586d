//! # image-acquire
//!
//! Acquire a single logical image from one of several interchangeable sources,
//! normalize it to a canonical PNG, and report what was produced.
//!
//! ## Design
//!
//! - **Ordered fallback** - each request mode has a fixed chain of providers, tried
//!   strictly in order until one yields candidates
//! - **Faults as data** - providers return a [`ProviderOutcome`] instead of errors, so
//!   fallback is a plain loop
//! - **Partial success** - broken candidates are skipped; a request succeeds as long
//!   as at least one image is stored
//! - **Explicit configuration** - credentials are resolved once into a [`Config`] and
//!   handed to every source
//!
//! ## Quick Start
//!
//! ```no_run
//! use image_acquire::{Acquirer, AcquisitionMode, AcquisitionRequest, Config};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let acquirer = Acquirer::new(Arc::new(Config::from_env()))?;
//!
//!     let request = AcquisitionRequest::new(AcquisitionMode::GenericSearch, "golden gate bridge", 3)?;
//!     let report = acquirer
//!         .acquire(&request, Path::new("images/golden-gate.png"))
//!         .await?;
//!
//!     for line in report.saved_lines() {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Acquisition orchestration
pub mod acquire;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Payload downloads
pub mod fetch;
/// Image decoding, flattening and storage
pub mod normalizer;
/// Output path generation
pub mod paths;
/// Candidate sources
pub mod providers;
/// Report rendering
pub mod report;
/// Fallback chains
pub mod resolver;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types
pub mod types;

// Re-export commonly used types
pub use acquire::Acquirer;
pub use config::{Config, Credentials};
pub use error::{Error, FetchError, NormalizeError, Result};
pub use normalizer::Normalizer;
pub use providers::{CandidateSource, SourceQuery};
pub use resolver::{ChainStep, ChainTable, DomainStrategy, HeuristicDomain, QueryRewrite, Resolver};
pub use types::{
    AcquisitionMode, AcquisitionReport, AcquisitionRequest, ArtifactFormat, CandidatePayload,
    CandidateReference, ProviderOutcome, SearchFilters, SizeFilter, SourceId, StoredArtifact,
    TypeFilter,
};

use tokio_util::sync::CancellationToken;

/// Cancel `token` when the process receives a termination signal
///
/// Spawns a background task; an in-flight acquisition observing the token stops
/// trying further providers and candidates and keeps what it already stored.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub fn cancel_on_signal(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => token.cancel(),
            _ = token.cancelled() => {}
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
