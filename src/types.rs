//! Core types for image-acquire

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a request is resolved into candidates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMode {
    /// Free-text web image search
    GenericSearch,
    /// Company logo, keyed by domain
    Logo,
    /// License-clear stock photography
    Stock,
    /// A single reference the caller already resolved
    DirectUrl,
}

impl std::fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AcquisitionMode::GenericSearch => "search",
            AcquisitionMode::Logo => "logo",
            AcquisitionMode::Stock => "stock",
            AcquisitionMode::DirectUrl => "direct URL",
        };
        f.write_str(s)
    }
}

/// Size hint forwarded to providers that support it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeFilter {
    /// Large images
    Large,
    /// Medium images
    Medium,
    /// Icon-sized images
    Icon,
}

impl SizeFilter {
    /// Google Images `imgsz` parameter value
    pub fn as_param(&self) -> &'static str {
        match self {
            SizeFilter::Large => "l",
            SizeFilter::Medium => "m",
            SizeFilter::Icon => "i",
        }
    }
}

/// Image type hint forwarded to providers that support it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    /// Photographs
    Photo,
    /// Clip art
    Clipart,
    /// Faces
    Face,
    /// Line drawings
    Lineart,
}

impl TypeFilter {
    /// Google Images `imgtype` parameter value
    pub fn as_param(&self) -> &'static str {
        match self {
            TypeFilter::Photo => "photo",
            TypeFilter::Clipart => "clipart",
            TypeFilter::Face => "face",
            TypeFilter::Lineart => "lineart",
        }
    }
}

/// Optional size/type tags attached to a request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Size filter
    #[serde(default)]
    pub size: Option<SizeFilter>,
    /// Type filter
    #[serde(default)]
    pub kind: Option<TypeFilter>,
}

/// A request for `count` images. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionRequest {
    mode: AcquisitionMode,
    query: String,
    count: usize,
    filters: SearchFilters,
}

impl AcquisitionRequest {
    /// Create a request
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when `count` is zero or `query` is blank.
    pub fn new(mode: AcquisitionMode, query: impl Into<String>, count: usize) -> Result<Self> {
        let query = query.into();
        if count == 0 {
            return Err(Error::InvalidRequest(
                "count must be a positive integer".to_string(),
            ));
        }
        if query.trim().is_empty() {
            return Err(Error::InvalidRequest("query must not be empty".to_string()));
        }
        Ok(Self {
            mode,
            query,
            count,
            filters: SearchFilters::default(),
        })
    }

    /// Attach size/type filters
    #[must_use]
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Acquisition mode
    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    /// Original query (search text, company/domain, or direct reference)
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Number of images requested
    pub fn count(&self) -> usize {
        self.count
    }

    /// Size/type filters
    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }
}

/// Identifies a candidate source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Quota-gated primary web image search
    SerpApi,
    /// Keyless secondary web image search
    DuckDuckGo,
    /// Direct logo lookup by domain
    LogoDev,
    /// Keyed stock photo provider
    Unsplash,
    /// Keyed stock photo provider
    Pexels,
    /// Pass-through for caller-supplied references
    Direct,
}

impl SourceId {
    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            SourceId::SerpApi => "serpapi",
            SourceId::DuckDuckGo => "duckduckgo",
            SourceId::LogoDev => "logo.dev",
            SourceId::Unsplash => "unsplash",
            SourceId::Pexels => "pexels",
            SourceId::Direct => "direct",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a candidate's raw bytes live
#[derive(Clone, PartialEq, Eq)]
pub enum CandidatePayload {
    /// Remote resource that still has to be downloaded
    Url(String),
    /// Bytes the provider already fetched
    Bytes(Vec<u8>),
}

impl std::fmt::Debug for CandidatePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidatePayload::Url(url) => f.debug_tuple("Url").field(url).finish(),
            CandidatePayload::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

/// An unvalidated pointer to a potential image
///
/// `source` is diagnostic only; nothing branches on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateReference {
    /// The raw data location
    pub payload: CandidatePayload,
    /// Source that produced the candidate
    pub source: SourceId,
}

impl CandidateReference {
    /// Candidate pointing at a remote URL
    pub fn url(source: SourceId, url: impl Into<String>) -> Self {
        Self {
            payload: CandidatePayload::Url(url.into()),
            source,
        }
    }

    /// Candidate carrying in-memory bytes
    pub fn bytes(source: SourceId, bytes: Vec<u8>) -> Self {
        Self {
            payload: CandidatePayload::Bytes(bytes),
            source,
        }
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match &self.payload {
            CandidatePayload::Url(url) => url.clone(),
            CandidatePayload::Bytes(bytes) => format!("<{} bytes from {}>", bytes.len(), self.source),
        }
    }
}

/// Result of a single provider lookup
///
/// `Unavailable` and `Error` are both soft: the resolver falls through to the next
/// source on either. A `Success` is never empty; use [`ProviderOutcome::from_candidates`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// Ordered, non-empty candidate list
    Success(Vec<CandidateReference>),
    /// A prerequisite (usually a credential) is missing
    Unavailable(String),
    /// The provider was reachable in principle but failed
    Error(String),
}

impl ProviderOutcome {
    /// Wrap a candidate list, mapping an empty list to `Error("no results")`
    pub fn from_candidates(candidates: Vec<CandidateReference>) -> Self {
        if candidates.is_empty() {
            ProviderOutcome::Error("no results".to_string())
        } else {
            ProviderOutcome::Success(candidates)
        }
    }

    /// Shorthand for an error outcome
    pub fn error(cause: impl std::fmt::Display) -> Self {
        ProviderOutcome::Error(cause.to_string())
    }

    /// Whether this outcome carries candidates
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success(refs) if !refs.is_empty())
    }
}

/// Canonical on-disk encoding of every artifact
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// 8-bit RGB PNG
    #[default]
    Png,
}

impl ArtifactFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Png => "png",
        }
    }
}

/// A normalized image written to disk
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArtifact {
    /// Location of the file
    pub path: PathBuf,
    /// Size of the file in bytes
    pub byte_size: u64,
    /// Encoding of the file
    pub format: ArtifactFormat,
}

/// Outcome of one acquisition, returned once to the caller
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AcquisitionReport {
    /// Mode the request was resolved with
    pub mode: AcquisitionMode,
    /// Original query
    pub query: String,
    /// Number of images requested
    pub requested: usize,
    /// Artifacts stored, in slot order
    pub artifacts: Vec<StoredArtifact>,
    /// Candidates consumed (successful or not)
    pub attempted: usize,
    /// Whether the run stopped early because the caller cancelled it
    #[serde(default)]
    pub cancelled: bool,
}

impl AcquisitionReport {
    /// Requested-but-unfulfilled slots
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.artifacts.len())
    }

    /// At least one artifact was stored
    pub fn is_success(&self) -> bool {
        !self.artifacts.is_empty()
    }

    /// Process exit code for this report
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_rejects_zero_count() {
        let err = AcquisitionRequest::new(AcquisitionMode::GenericSearch, "cat", 0).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn request_rejects_blank_query() {
        let err = AcquisitionRequest::new(AcquisitionMode::Stock, "   ", 1).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn request_keeps_filters() {
        let filters = SearchFilters {
            size: Some(SizeFilter::Large),
            kind: Some(TypeFilter::Clipart),
        };
        let req = AcquisitionRequest::new(AcquisitionMode::GenericSearch, "cat", 2)
            .unwrap()
            .with_filters(filters);
        assert_eq!(req.filters(), &filters);
        assert_eq!(req.count(), 2);
        assert_eq!(req.query(), "cat");
    }

    #[test]
    fn empty_candidate_list_is_an_error() {
        assert_eq!(
            ProviderOutcome::from_candidates(vec![]),
            ProviderOutcome::Error("no results".to_string())
        );
        let outcome =
            ProviderOutcome::from_candidates(vec![CandidateReference::url(SourceId::Direct, "x")]);
        assert!(outcome.is_success());
    }

    #[test]
    fn filter_params() {
        assert_eq!(SizeFilter::Large.as_param(), "l");
        assert_eq!(SizeFilter::Medium.as_param(), "m");
        assert_eq!(SizeFilter::Icon.as_param(), "i");
        assert_eq!(TypeFilter::Lineart.as_param(), "lineart");
    }

    #[test]
    fn report_shortfall_and_exit_code() {
        let artifact = StoredArtifact {
            path: PathBuf::from("images/a_1.png"),
            byte_size: 10,
            format: ArtifactFormat::Png,
        };
        let report = AcquisitionReport {
            mode: AcquisitionMode::GenericSearch,
            query: "a".into(),
            requested: 5,
            artifacts: vec![artifact.clone(), artifact],
            attempted: 15,
            cancelled: false,
        };
        assert_eq!(report.shortfall(), 3);
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);

        let empty = AcquisitionReport {
            artifacts: vec![],
            ..report
        };
        assert_eq!(empty.shortfall(), 5);
        assert_eq!(empty.exit_code(), 1);
    }

    #[test]
    fn bytes_payload_debug_hides_contents() {
        let c = CandidateReference::bytes(SourceId::LogoDev, vec![0u8; 512]);
        assert_eq!(format!("{:?}", c.payload), "Bytes(512 bytes)");
        assert_eq!(c.describe(), "<512 bytes from logo.dev>");
    }
}
