// src/feed/types.rs
use serde::{Deserialize, Serialize};

use super::FetchError;

/// One news item as delivered by `GET /getFeed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    #[serde(default)]
    pub title: String,
    /// Display-formatted time, e.g. "14:05".
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Unix seconds; a missing value counts as 0.
    #[serde(default)]
    pub timestamp: i64,
}

impl FeedEntry {
    pub fn new(title: impl Into<String>, date: impl Into<String>, timestamp: i64) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            link: None,
            timestamp,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Recency window for incoming entries, restricted to {1,2,4,8,16} hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub struct HoursBack(u32);

impl HoursBack {
    pub const OPTIONS: [u32; 5] = [1, 2, 4, 8, 16];
    pub const DEFAULT: HoursBack = HoursBack(4);

    /// Exact match against the allowed set.
    pub fn new(hours: u32) -> Option<Self> {
        Self::OPTIONS.contains(&hours).then_some(Self(hours))
    }

    /// Any value outside the allowed set becomes the default (4h).
    pub fn coerce(hours: u32) -> Self {
        Self::new(hours).unwrap_or(Self::DEFAULT)
    }

    /// Lenient parse of a stored/typed value.
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<u32>()
            .map(Self::coerce)
            .unwrap_or(Self::DEFAULT)
    }

    pub fn hours(self) -> u32 {
        self.0
    }

    pub fn as_secs(self) -> i64 {
        i64::from(self.0) * 3600
    }
}

impl Default for HoursBack {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for HoursBack {
    fn from(v: u32) -> Self {
        Self::coerce(v)
    }
}

impl From<HoursBack> for u32 {
    fn from(h: HoursBack) -> Self {
        h.0
    }
}

impl std::fmt::Display for HoursBack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h", self.0)
    }
}

#[derive(Deserialize)]
struct FeedResponse {
    entries: Vec<FeedEntry>,
}

#[derive(Deserialize)]
struct ArticleResponse {
    #[serde(default)]
    body: Option<String>,
}

/// Decode a `/getFeed` body. Anything without an array-valued `entries`
/// field is `MalformedResponse`; a well-formed empty list is `EmptyResult`.
pub fn decode_feed(body: &str) -> Result<Vec<FeedEntry>, FetchError> {
    let resp: FeedResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
    if resp.entries.is_empty() {
        return Err(FetchError::EmptyResult);
    }
    Ok(resp.entries)
}

/// Decode a `/getArticle` body. Absent or unparsable bodies become "".
pub fn decode_article(body: &str) -> String {
    serde_json::from_str::<ArticleResponse>(body)
        .ok()
        .and_then(|r| r.body)
        .unwrap_or_default()
}
