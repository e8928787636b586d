//! Acquisition orchestration
//!
//! [`Acquirer`] turns one [`AcquisitionRequest`] for `count` images into up to `count`
//! stored artifacts:
//!
//! 1. The resolver is called once for an ordered (over-fetched) candidate list.
//! 2. Candidates are walked in order. Each is downloaded if needed and normalized
//!    into the current slot's path. A broken candidate is discarded and the next
//!    one is tried for the same slot.
//! 3. The walk stops once `count` artifacts exist or candidates run out.
//! 4. Zero artifacts is a failure; a partial result is a success with a shortfall.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::PayloadFetcher;
use crate::normalizer::Normalizer;
use crate::paths::slot_path;
use crate::resolver::Resolver;
use crate::types::{AcquisitionReport, AcquisitionRequest, CandidatePayload, CandidateReference};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Drives resolution, download and normalization for acquisition requests
///
/// Holds no per-request state, so one instance can serve concurrent requests as
/// long as their output paths are disjoint.
pub struct Acquirer {
    resolver: Resolver,
    fetcher: PayloadFetcher,
    normalizer: Normalizer,
}

impl Acquirer {
    /// Build an acquirer over the standard chains and built-in sources
    pub fn new(config: Arc<Config>) -> Result<Self> {
        config.validate()?;
        let fetcher = PayloadFetcher::new(&config)?;
        let resolver = Resolver::from_config(config)?;
        Ok(Self::from_parts(resolver, fetcher, Normalizer::new()))
    }

    /// Assemble an acquirer from pre-built parts (custom sources, chains, strategies)
    pub fn from_parts(resolver: Resolver, fetcher: PayloadFetcher, normalizer: Normalizer) -> Self {
        Self {
            resolver,
            fetcher,
            normalizer,
        }
    }

    /// The resolver in use
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Acquire images for `request`, writing slot paths derived from `base_path`
    pub async fn acquire(
        &self,
        request: &AcquisitionRequest,
        base_path: &Path,
    ) -> Result<AcquisitionReport> {
        self.acquire_with_cancel(request, base_path, &CancellationToken::new())
            .await
    }

    /// Like [`acquire`](Self::acquire), stopping early when `cancel` fires
    ///
    /// Artifacts stored before cancellation are kept and reported. If nothing was
    /// stored the call fails with [`Error::Cancelled`].
    pub async fn acquire_with_cancel(
        &self,
        request: &AcquisitionRequest,
        base_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<AcquisitionReport> {
        let count = request.count();
        let candidates = self.resolver.resolve_with_cancel(request, cancel).await?;

        tracing::debug!(
            mode = %request.mode(),
            candidates = candidates.len(),
            count,
            "walking candidates"
        );

        let mut report = AcquisitionReport {
            mode: request.mode(),
            query: request.query().to_string(),
            requested: count,
            artifacts: Vec::with_capacity(count),
            attempted: 0,
            cancelled: false,
        };

        for candidate in candidates {
            if report.artifacts.len() >= count {
                break;
            }
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            report.attempted += 1;
            let path = slot_path(base_path, report.artifacts.len(), count);

            let raw = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                raw = self.load(&candidate) => raw,
            };
            let Some(raw) = raw else {
                continue;
            };

            match self.normalizer.normalize(raw, &path).await {
                Ok(artifact) => {
                    tracing::info!(
                        path = %artifact.path.display(),
                        bytes = artifact.byte_size,
                        source = %candidate.source,
                        "stored artifact"
                    );
                    report.artifacts.push(artifact);
                }
                Err(e) => {
                    tracing::warn!(
                        candidate = %candidate.describe(),
                        error = %e,
                        "discarding candidate"
                    );
                }
            }
        }

        if report.cancelled {
            tracing::info!(stored = report.artifacts.len(), "acquisition cancelled");
        }

        if report.artifacts.is_empty() {
            if report.cancelled {
                return Err(Error::Cancelled);
            }
            tracing::error!(query = %request.query(), attempted = report.attempted, "no images stored");
            return Err(Error::NoResults {
                query: request.query().to_string(),
                attempted: report.attempted,
            });
        }

        if report.shortfall() > 0 {
            tracing::warn!(
                stored = report.artifacts.len(),
                requested = count,
                "fewer images stored than requested"
            );
        }

        Ok(report)
    }

    /// Raw bytes for a candidate, or `None` if the download failed
    async fn load(&self, candidate: &CandidateReference) -> Option<Vec<u8>> {
        match &candidate.payload {
            CandidatePayload::Bytes(bytes) => Some(bytes.clone()),
            CandidatePayload::Url(url) => match self.fetcher.fetch(url).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "discarding candidate");
                    None
                }
            },
        }
    }
}
