use thiserror::Error;

/// Machine-checkable category of a search failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Upstream,
    TrendingUnavailable,
}

/// Failures seen by the client while running a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("{0}")]
    Validation(String),

    #[error("City not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Trending cities unavailable: {0}")]
    TrendingUnavailable(String),
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::Validation(_) => ErrorKind::Validation,
            SearchError::NotFound(_) => ErrorKind::NotFound,
            SearchError::Upstream(_) => ErrorKind::Upstream,
            SearchError::TrendingUnavailable(_) => ErrorKind::TrendingUnavailable,
        }
    }

    /// Whether this error aborts the whole search rather than one section.
    pub fn is_critical(&self) -> bool {
        !matches!(self, SearchError::TrendingUnavailable(_))
    }
}

/// Failures of the advice proxy handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error("{0}")]
    MalformedInput(String),

    #[error("{0}")]
    Unexpected(String),
}
