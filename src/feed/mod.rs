// src/feed/mod.rs
//! Feed access: wire types, the transport seam, and the connectivity-aware
//! `FeedSource` wrapper the runtime drives.

pub mod connectivity;
pub mod http;
pub mod scripted;
pub mod source;
pub mod types;

pub use connectivity::{Connectivity, ConnectivityChange};
pub use source::FeedSource;
pub use types::{FeedEntry, HoursBack};

/// Why a feed (or probe/article) request did not produce usable data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed feed response: {0}")]
    MalformedResponse(String),
    #[error("feed returned no entries")]
    EmptyResult,
}

/// Notification category for a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Timeout,
    Generic,
    Empty,
}

impl FetchError {
    pub fn failure(&self) -> Failure {
        match self {
            FetchError::Timeout => Failure::Timeout,
            FetchError::EmptyResult => Failure::Empty,
            FetchError::Network(_) | FetchError::MalformedResponse(_) => Failure::Generic,
        }
    }

    /// True when the server could not be reached at all. A malformed or
    /// empty answer still proves connectivity.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, FetchError::Timeout | FetchError::Network(_))
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::Network(_) => "network",
            FetchError::MalformedResponse(_) => "malformed",
            FetchError::EmptyResult => "empty",
        }
    }
}

/// Which timing domain issued a feed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Startup, manual refresh, the 3-minute resync, or a reconnect re-fetch.
    /// Updates connectivity and participates in failure fallback.
    Foreground,
    /// Silent 10-second refresh. Failures are logged and dropped.
    Background,
}

/// Raw access to the feed and article endpoints.
#[async_trait::async_trait]
pub trait FeedTransport: Send + Sync {
    async fn fetch_feed(&self, hours: HoursBack) -> Result<Vec<FeedEntry>, FetchError>;
    async fn probe(&self) -> Result<(), FetchError>;
    async fn fetch_article(&self, url: &str) -> Result<String, FetchError>;
    fn name(&self) -> &'static str;
}
