//! Error types surfaced through `FetchOutcome::Err`.
//!
//! # Design
//! There are exactly three ways a fetch can fail. `InvalidUrl` is detected
//! before the transport is contacted and keeps the attempted URL for
//! diagnostics. `InvalidResponse` covers a transport that finished with
//! neither a payload nor an error. `Transport` wraps whatever the transport
//! reported, untouched, so callers can downcast it.

/// Opaque error reported by a transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classified failure of a single fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Host, port, path or parameters could not form a request URL.
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: UrlError,
    },

    /// The transport completed with no payload and no error.
    #[error("transport returned neither a payload nor an error")]
    InvalidResponse,

    /// The transport itself failed.
    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),
}

impl FetchError {
    /// The URL that failed to assemble, for `InvalidUrl`.
    pub fn attempted_url(&self) -> Option<&str> {
        match self {
            FetchError::InvalidUrl { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Why URL assembly was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("bad host: {0}")]
    Host(#[from] url::ParseError),

    #[error("path `{0}` must be empty or start with '/'")]
    RelativePath(String),
}

/// The transport dropped the completion without ever calling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("transport dropped the request without completing it")]
pub struct CompletionDropped;
