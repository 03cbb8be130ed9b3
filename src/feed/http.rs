// src/feed/http.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};

use super::types::{decode_article, decode_feed};
use super::{FeedEntry, FeedTransport, FetchError, HoursBack};

/// `reqwest` client for the feed server:
/// - `GET  {base}/getFeed?hours=N` → `{ "entries": [...] }`
/// - `HEAD {base}/getFeed`         → 2xx when healthy
/// - `GET  {base}/getArticle?url=` → `{ "body": "..." }`
///
/// Overall request bounds are applied by `FeedSource`; the client only carries
/// a connect timeout.
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rotter-ticker/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .build()
            .context("building feed http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn fetch_feed(&self, hours: HoursBack) -> Result<Vec<FeedEntry>, FetchError> {
        let body = self
            .client
            .get(self.endpoint("/getFeed"))
            .query(&[("hours", hours.hours())])
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?
            .text()
            .await
            .map_err(classify)?;
        decode_feed(&body)
    }

    async fn probe(&self) -> Result<(), FetchError> {
        self.client
            .head(self.endpoint("/getFeed"))
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;
        Ok(())
    }

    async fn fetch_article(&self, url: &str) -> Result<String, FetchError> {
        let body = self
            .client
            .get(self.endpoint("/getArticle"))
            .query(&[("url", url)])
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?
            .text()
            .await
            .map_err(classify)?;
        Ok(decode_article(&body))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
