//! Fallback resolution across prioritized candidate sources
//!
//! Each [`AcquisitionMode`] maps to a fixed, ordered chain of sources held in a
//! [`ChainTable`] built once at startup. The [`Resolver`] walks the chain strictly
//! sequentially and stops at the first source that yields candidates. `Unavailable`
//! and `Error` outcomes both advance to the next source; when the chain runs out the
//! request fails with [`Error::ChainExhausted`].
//!
//! Standard chains:
//!
//! | Mode | Chain |
//! |---|---|
//! | GenericSearch | SerpApi → DuckDuckGo |
//! | Logo | Logo.dev (by domain) → GenericSearch with "logo transparent" appended |
//! | Stock | Unsplash → Pexels → GenericSearch with "stock photo" appended |
//! | DirectUrl | Direct (no fallback) |

use crate::config::Config;
use crate::error::{Error, Result};
use crate::providers::{self, CandidateSource, SourceQuery};
use crate::types::{
    AcquisitionMode, AcquisitionRequest, CandidateReference, ProviderOutcome, SourceId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Maps a company name to a candidate domain for logo lookup
///
/// Swappable; chain semantics do not depend on the strategy. Closures
/// `Fn(&str) -> String` implement it directly.
pub trait DomainStrategy: Send + Sync {
    /// Candidate domain for `name`
    fn resolve_domain(&self, name: &str) -> String;
}

impl<F> DomainStrategy for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn resolve_domain(&self, name: &str) -> String {
        self(name)
    }
}

/// Lowercase, strip non-alphanumerics, append a top-level domain
///
/// "Goldman Sachs" becomes "goldmansachs.com".
#[derive(Clone, Debug)]
pub struct HeuristicDomain {
    tld: String,
}

impl HeuristicDomain {
    /// Heuristic with a custom top-level domain (without the dot)
    pub fn with_tld(tld: impl Into<String>) -> Self {
        Self { tld: tld.into() }
    }
}

impl Default for HeuristicDomain {
    fn default() -> Self {
        Self::with_tld("com")
    }
}

impl DomainStrategy for HeuristicDomain {
    fn resolve_domain(&self, name: &str) -> String {
        let label: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        format!("{}.{}", label, self.tld)
    }
}

/// How the request query is presented to one source
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryRewrite {
    /// Query passed as-is
    Verbatim,
    /// Query interpreted as a company/domain; names without a dot go through the
    /// [`DomainStrategy`]
    Domain,
    /// Query with text appended, separated by a space
    Suffix(String),
}

/// One entry in a mode's chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainStep {
    /// Ask a single source
    Source {
        /// The source to ask
        id: SourceId,
        /// How to present the query
        rewrite: QueryRewrite,
    },
    /// Re-enter another mode's chain with a suffixed query
    Reenter {
        /// Mode whose chain is re-entered
        mode: AcquisitionMode,
        /// Text appended to the query
        suffix: String,
    },
}

impl ChainStep {
    /// Source step with a verbatim query
    pub fn source(id: SourceId) -> Self {
        ChainStep::Source {
            id,
            rewrite: QueryRewrite::Verbatim,
        }
    }

    /// Re-entry step
    pub fn reenter(mode: AcquisitionMode, suffix: impl Into<String>) -> Self {
        ChainStep::Reenter {
            mode,
            suffix: suffix.into(),
        }
    }
}

/// A chain step after re-entries have been flattened
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedStep {
    /// Source to ask
    pub source: SourceId,
    /// How to present the query
    pub rewrite: QueryRewrite,
}

/// Fixed mode → ordered chain mapping
#[derive(Clone, Debug)]
pub struct ChainTable {
    chains: HashMap<AcquisitionMode, Vec<ChainStep>>,
}

impl ChainTable {
    /// Build and validate a table
    ///
    /// Every mode needs a non-empty chain. A re-entered chain may only contain
    /// verbatim source steps, which rules out cycles.
    pub fn new(chains: HashMap<AcquisitionMode, Vec<ChainStep>>) -> Result<Self> {
        for mode in [
            AcquisitionMode::GenericSearch,
            AcquisitionMode::Logo,
            AcquisitionMode::Stock,
            AcquisitionMode::DirectUrl,
        ] {
            if chains.get(&mode).is_none_or(|c| c.is_empty()) {
                return Err(Error::config("chains", format!("no chain for {} mode", mode)));
            }
        }

        for (mode, chain) in &chains {
            for step in chain {
                let ChainStep::Reenter { mode: target, .. } = step else {
                    continue;
                };
                let target_chain = chains.get(target).map(Vec::as_slice).unwrap_or_default();
                let only_verbatim = target_chain.iter().all(|s| {
                    matches!(
                        s,
                        ChainStep::Source {
                            rewrite: QueryRewrite::Verbatim,
                            ..
                        }
                    )
                });
                if !only_verbatim {
                    return Err(Error::config(
                        "chains",
                        format!(
                            "{} chain re-enters {} chain, which is not a plain source list",
                            mode, target
                        ),
                    ));
                }
            }
        }

        Ok(Self { chains })
    }

    /// The chain as configured for `mode`
    pub fn chain(&self, mode: AcquisitionMode) -> &[ChainStep] {
        self.chains.get(&mode).map(Vec::as_slice).unwrap_or_default()
    }

    /// Flatten `mode`'s chain into the ordered list of sources to ask
    pub fn expand(&self, mode: AcquisitionMode) -> Vec<ResolvedStep> {
        let mut steps = Vec::new();
        for step in self.chain(mode) {
            match step {
                ChainStep::Source { id, rewrite } => steps.push(ResolvedStep {
                    source: *id,
                    rewrite: rewrite.clone(),
                }),
                ChainStep::Reenter { mode, suffix } => {
                    steps.extend(self.chain(*mode).iter().filter_map(|s| match s {
                        ChainStep::Source { id, .. } => Some(ResolvedStep {
                            source: *id,
                            rewrite: QueryRewrite::Suffix(suffix.clone()),
                        }),
                        ChainStep::Reenter { .. } => None,
                    }))
                }
            }
        }
        steps
    }

    /// Every source referenced by any chain
    fn referenced_sources(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.chains.values().flatten().filter_map(|s| match s {
            ChainStep::Source { id, .. } => Some(*id),
            ChainStep::Reenter { .. } => None,
        })
    }
}

impl Default for ChainTable {
    fn default() -> Self {
        use AcquisitionMode::*;

        let chains = HashMap::from([
            (
                GenericSearch,
                vec![
                    ChainStep::source(SourceId::SerpApi),
                    ChainStep::source(SourceId::DuckDuckGo),
                ],
            ),
            (
                Logo,
                vec![
                    ChainStep::Source {
                        id: SourceId::LogoDev,
                        rewrite: QueryRewrite::Domain,
                    },
                    ChainStep::reenter(GenericSearch, "logo transparent"),
                ],
            ),
            (
                Stock,
                vec![
                    ChainStep::source(SourceId::Unsplash),
                    ChainStep::source(SourceId::Pexels),
                    ChainStep::reenter(GenericSearch, "stock photo"),
                ],
            ),
            (DirectUrl, vec![ChainStep::source(SourceId::Direct)]),
        ]);

        Self { chains }
    }
}

/// Drives a mode's chain until candidates are found or the chain is exhausted
pub struct Resolver {
    table: ChainTable,
    sources: HashMap<SourceId, Arc<dyn CandidateSource>>,
    domains: Arc<dyn DomainStrategy>,
    overfetch_factor: usize,
}

impl Resolver {
    /// Create a resolver over `sources`
    ///
    /// Fails if the table references a source that is not provided.
    pub fn new(
        table: ChainTable,
        sources: HashMap<SourceId, Arc<dyn CandidateSource>>,
    ) -> Result<Self> {
        if let Some(missing) = table.referenced_sources().find(|id| !sources.contains_key(id)) {
            return Err(Error::config(
                "chains",
                format!("chain references unknown source '{}'", missing),
            ));
        }

        Ok(Self {
            table,
            sources,
            domains: Arc::new(HeuristicDomain::default()),
            overfetch_factor: 3,
        })
    }

    /// Standard chains over the built-in sources
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let overfetch = config.search.overfetch_factor;
        let sources = providers::default_sources(config)?;
        Ok(Self::new(ChainTable::default(), sources)?.with_overfetch(overfetch))
    }

    /// Replace the domain strategy used in logo mode
    #[must_use]
    pub fn with_domain_strategy(mut self, strategy: impl DomainStrategy + 'static) -> Self {
        self.domains = Arc::new(strategy);
        self
    }

    /// Candidates requested per wanted image
    #[must_use]
    pub fn with_overfetch(mut self, factor: usize) -> Self {
        self.overfetch_factor = factor.max(1);
        self
    }

    /// The chain table in use
    pub fn table(&self) -> &ChainTable {
        &self.table
    }

    /// Resolve `request` into an ordered candidate list
    pub async fn resolve(&self, request: &AcquisitionRequest) -> Result<Vec<CandidateReference>> {
        self.resolve_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Resolve `request`, checking `cancel` before every provider attempt
    pub async fn resolve_with_cancel(
        &self,
        request: &AcquisitionRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<CandidateReference>> {
        let mode = request.mode();
        let limit = request.count().saturating_mul(self.overfetch_factor);

        for step in self.table.expand(mode) {
            if cancel.is_cancelled() {
                tracing::info!(%mode, "resolution cancelled");
                return Err(Error::Cancelled);
            }

            let Some(source) = self.sources.get(&step.source) else {
                continue;
            };

            let query = SourceQuery {
                text: self.rewrite_query(request.query(), &step.rewrite),
                filters: *request.filters(),
                limit,
            };

            tracing::debug!(source = %step.source, query = %query.text, limit, "trying source");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(%mode, source = %step.source, "resolution cancelled");
                    return Err(Error::Cancelled);
                }
                outcome = source.resolve(&query) => outcome,
            };

            match outcome {
                ProviderOutcome::Success(refs) if !refs.is_empty() => {
                    tracing::info!(source = %step.source, candidates = refs.len(), "source returned candidates");
                    return Ok(refs);
                }
                ProviderOutcome::Success(_) => {
                    tracing::warn!(source = %step.source, "source returned an empty success, falling back");
                }
                ProviderOutcome::Unavailable(reason) => {
                    tracing::debug!(source = %step.source, %reason, "source unavailable, falling back");
                }
                ProviderOutcome::Error(cause) => {
                    tracing::warn!(source = %step.source, %cause, "source failed, falling back");
                }
            }
        }

        tracing::error!(%mode, query = %request.query(), "all providers exhausted");
        Err(Error::ChainExhausted { mode })
    }

    /// Apply `rewrite` to the request query
    pub fn rewrite_query(&self, query: &str, rewrite: &QueryRewrite) -> String {
        match rewrite {
            QueryRewrite::Verbatim => query.to_string(),
            QueryRewrite::Suffix(suffix) => format!("{} {}", query, suffix),
            QueryRewrite::Domain => {
                let trimmed = query.trim();
                if trimmed.contains('.') {
                    trimmed.to_string()
                } else {
                    let domain = self.domains.resolve_domain(trimmed);
                    tracing::info!(name = %trimmed, %domain, "resolved company name to domain");
                    domain
                }
            }
        }
    }
}
