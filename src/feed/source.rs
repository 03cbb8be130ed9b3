// src/feed/source.rs
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};

use super::{
    Connectivity, ConnectivityChange, FeedEntry, FeedTransport, FetchError, FetchKind, HoursBack,
};
use crate::config::TickerConfig;

/// Connectivity-aware front of a `FeedTransport`.
///
/// Requests are returned as `'static` futures so the runtime can spawn them and
/// keep mutating its own state while they are in flight; outcomes are fed back
/// through [`FeedSource::record`] on the event loop.
pub struct FeedSource {
    transport: Arc<dyn FeedTransport>,
    connectivity: Connectivity,
    foreground_timeout: Duration,
    background_timeout: Duration,
}

impl FeedSource {
    pub fn new(transport: Arc<dyn FeedTransport>, cfg: &TickerConfig) -> Self {
        Self::with_timeouts(
            transport,
            cfg.foreground_timeout(),
            cfg.background_timeout(),
        )
    }

    pub fn with_timeouts(
        transport: Arc<dyn FeedTransport>,
        foreground_timeout: Duration,
        background_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            connectivity: Connectivity::default(),
            foreground_timeout,
            background_timeout,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.connectivity.is_offline()
    }

    /// Feed a probe/foreground outcome into the connectivity state.
    pub fn record(&mut self, reachable: bool) -> Option<ConnectivityChange> {
        let change = self.connectivity.record(reachable);
        if let Some(c) = change {
            tracing::info!(target: "feed", transport = self.transport.name(), change = ?c, "connectivity changed");
        }
        change
    }

    pub fn fetch_feed(
        &self,
        hours: HoursBack,
        kind: FetchKind,
    ) -> impl Future<Output = Result<Vec<FeedEntry>, FetchError>> + Send + 'static {
        let transport = Arc::clone(&self.transport);
        let limit = match kind {
            FetchKind::Foreground => self.foreground_timeout,
            FetchKind::Background => self.background_timeout,
        };
        async move {
            let t0 = Instant::now();
            let res = tokio::time::timeout(limit, transport.fetch_feed(hours))
                .await
                .unwrap_or(Err(FetchError::Timeout));

            histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
            if let Err(e) = &res {
                counter!("feed_fetch_errors_total", "kind" => e.kind()).increment(1);
            }
            res
        }
    }

    pub fn probe(&self) -> impl Future<Output = Result<(), FetchError>> + Send + 'static {
        let transport = Arc::clone(&self.transport);
        let limit = self.background_timeout;
        async move {
            tokio::time::timeout(limit, transport.probe())
                .await
                .unwrap_or(Err(FetchError::Timeout))
        }
    }

    /// Article bodies never fail hard: any error becomes "".
    pub fn fetch_article(&self, url: String) -> impl Future<Output = String> + Send + 'static {
        let transport = Arc::clone(&self.transport);
        let limit = self.foreground_timeout;
        async move {
            match tokio::time::timeout(limit, transport.fetch_article(&url)).await {
                Ok(Ok(body)) => body,
                Ok(Err(e)) => {
                    tracing::debug!(target: "feed", %url, error = %e, "article fetch failed");
                    String::new()
                }
                Err(_) => {
                    tracing::debug!(target: "feed", %url, "article fetch timed out");
                    String::new()
                }
            }
        }
    }
}
