// src/feed/scripted.rs
//! In-memory transport with queued responses. Used by tests and by anyone
//! who wants to drive the ticker without a server.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{FeedEntry, FeedTransport, FetchError, HoursBack};

pub struct ScriptedTransport {
    feeds: Mutex<VecDeque<Result<Vec<FeedEntry>, FetchError>>>,
    probe: Mutex<Result<(), FetchError>>,
    articles: Mutex<HashMap<String, Result<String, FetchError>>>,
    calls: Mutex<Calls>,
    delay: Option<Duration>,
}

/// What the transport has been asked for so far.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub feed_hours: Vec<HoursBack>,
    pub probes: usize,
    pub articles: Vec<String>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            feeds: Mutex::new(VecDeque::new()),
            probe: Mutex::new(Ok(())),
            articles: Mutex::new(HashMap::new()),
            calls: Mutex::new(Calls::default()),
            delay: None,
        }
    }

    /// Every request sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue the next `/getFeed` answer. An empty queue answers with a network error.
    pub fn push_feed(&self, res: Result<Vec<FeedEntry>, FetchError>) {
        self.feeds
            .lock()
            .expect("scripted feeds mutex poisoned")
            .push_back(res);
    }

    pub fn set_probe(&self, res: Result<(), FetchError>) {
        *self.probe.lock().expect("scripted probe mutex poisoned") = res;
    }

    pub fn set_article(&self, url: &str, res: Result<String, FetchError>) {
        self.articles
            .lock()
            .expect("scripted articles mutex poisoned")
            .insert(url.to_string(), res);
    }

    pub fn calls(&self) -> Calls {
        self.calls
            .lock()
            .expect("scripted calls mutex poisoned")
            .clone()
    }

    async fn pause(&self) {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn fetch_feed(&self, hours: HoursBack) -> Result<Vec<FeedEntry>, FetchError> {
        self.calls
            .lock()
            .expect("scripted calls mutex poisoned")
            .feed_hours
            .push(hours);
        self.pause().await;
        self.feeds
            .lock()
            .expect("scripted feeds mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Network("no scripted response".into())))
    }

    async fn probe(&self) -> Result<(), FetchError> {
        self.calls.lock().expect("scripted calls mutex poisoned").probes += 1;
        self.pause().await;
        self.probe
            .lock()
            .expect("scripted probe mutex poisoned")
            .clone()
    }

    async fn fetch_article(&self, url: &str) -> Result<String, FetchError> {
        self.calls
            .lock()
            .expect("scripted calls mutex poisoned")
            .articles
            .push(url.to_string());
        self.pause().await;
        self.articles
            .lock()
            .expect("scripted articles mutex poisoned")
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Network(format!("no article for {url}"))))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
