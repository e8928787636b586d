//! Scripted candidate sources

use async_trait::async_trait;
use image_acquire::{CandidateReference, CandidateSource, ProviderOutcome, SourceId, SourceQuery};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Source that returns a fixed outcome and records how it was called
pub struct ScriptedSource {
    id: SourceId,
    outcome: ProviderOutcome,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    limits: Mutex<Vec<usize>>,
}

impl ScriptedSource {
    pub fn new(id: SourceId, outcome: ProviderOutcome) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcome,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            limits: Mutex::new(Vec::new()),
        })
    }

    pub fn unavailable(id: SourceId) -> Arc<Self> {
        Self::new(id, ProviderOutcome::Unavailable("no credentials".into()))
    }

    pub fn failing(id: SourceId) -> Arc<Self> {
        Self::new(id, ProviderOutcome::Error("HTTP 500".into()))
    }

    /// Source returning URL candidates
    pub fn urls(id: SourceId, urls: &[String]) -> Arc<Self> {
        let refs = urls
            .iter()
            .map(|u| CandidateReference::url(id, u.clone()))
            .collect();
        Self::new(id, ProviderOutcome::Success(refs))
    }

    /// Source returning in-memory candidates
    pub fn bytes(id: SourceId, payloads: Vec<Vec<u8>>) -> Arc<Self> {
        let refs = payloads
            .into_iter()
            .map(|b| CandidateReference::bytes(id, b))
            .collect();
        Self::new(id, ProviderOutcome::Success(refs))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Candidate limits the source was asked for
    pub fn limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }
}

#[async_trait]
impl CandidateSource for ScriptedSource {
    fn id(&self) -> SourceId {
        self.id
    }

    async fn resolve(&self, query: &SourceQuery) -> ProviderOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.text.clone());
        self.limits.lock().unwrap().push(query.limit);
        self.outcome.clone()
    }
}
