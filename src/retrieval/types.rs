// src/retrieval/types.rs

use std::time::Duration;

/// Immutable retrieval query: free text plus optional lookback window and
/// result cap. Carries no identity beyond its value; the cache key is derived
/// from it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub lookback: Option<Duration>,
    pub max_results: Option<usize>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lookback: None,
            max_results: None,
        }
    }

    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = Some(lookback);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Copy of the query with its text normalized (lowercase, trimmed,
    /// whitespace collapsed). Adapters and the cache both see this form.
    pub fn normalized(&self) -> Self {
        Self {
            text: crate::retrieval::normalize_query(&self.text),
            lookback: self.lookback,
            max_results: self.max_results,
        }
    }
}

/// One retrieved item. All fields are denormalized; records carry no
/// relationships to each other.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    pub description: String,
    pub published_at: u64, // unix seconds
    pub source: String,
    pub url: String,
}

/// Ordered records plus the adapter that produced them. Immutable once
/// produced; success/failure is carried by the surrounding `Result`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ResultSet {
    pub adapter: String,
    pub records: Vec<Record>,
}

impl ResultSet {
    pub fn new(adapter: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            adapter: adapter.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The four canonical failure kinds every adapter must map its provider's
/// errors onto, so the coordinator never needs provider-specific knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Unauthorized,
    RateLimited,
    Unreachable,
    Malformed,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate limited",
            Self::Unreachable => "unreachable",
            Self::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

/// Adapter-level error. Unauthorized/Malformed indicate configuration
/// problems worth surfacing; RateLimited/Unreachable are expected
/// operational conditions.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("unreachable: {0}")]
    Unreachable(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Unauthorized(_) => FetchErrorKind::Unauthorized,
            Self::RateLimited(_) => FetchErrorKind::RateLimited,
            Self::Unreachable(_) => FetchErrorKind::Unreachable,
            Self::Malformed(_) => FetchErrorKind::Malformed,
        }
    }

    /// True for kinds that point at a configuration bug rather than a
    /// transient condition.
    pub fn is_config_problem(&self) -> bool {
        matches!(
            self.kind(),
            FetchErrorKind::Unauthorized | FetchErrorKind::Malformed
        )
    }
}

/// Coordinator-level error: every adapter in the chain failed. Carries the
/// ordered per-adapter failure kinds for diagnostics.
#[derive(Debug, thiserror::Error)]
#[error("all sources exhausted after {} adapters", .failures.len())]
pub struct AllSourcesExhausted {
    pub failures: Vec<(String, FetchErrorKind)>,
}

/// Uniform interface to one external data provider. An empty result is a
/// valid success and must not be reported as an error. Implementations must
/// bound every network call with a timeout.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, query: &Query) -> Result<ResultSet, FetchError>;
    fn name(&self) -> &'static str;
}
