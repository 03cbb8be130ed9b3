// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn describe() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ticker_ingest_total", "Feed responses merged into the queue.");
        describe_counter!(
            "ticker_new_items_total",
            "Items newer than the last-seen watermark at ingest time."
        );
        describe_counter!(
            "ticker_auto_advance_total",
            "Items shown by the auto-advance timer."
        );
        describe_counter!(
            "feed_fetch_errors_total",
            "Failed feed requests, labelled by error kind."
        );
        describe_gauge!("ticker_queue_len", "Items currently in the rotation.");
        describe_gauge!(
            "ticker_last_seen_ts",
            "Unix ts of the newest entry ever received."
        );
        describe_histogram!("feed_fetch_ms", "Feed request time in milliseconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Only one recorder per process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        router_for(self.handle.clone())
    }

    /// Serve `/metrics` on `addr` until the task is dropped.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding metrics listener on {addr}"))?;
        tracing::info!(target: "metrics", %addr, "serving /metrics");
        axum::serve(listener, self.router())
            .await
            .context("metrics server")?;
        Ok(())
    }
}

pub fn router_for(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.render() }
        }),
    )
}
