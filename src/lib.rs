// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod article;
pub mod config;
pub mod engine;
pub mod feed;
pub mod gesture;
pub mod input;
pub mod metrics;
pub mod notify;
pub mod render;
pub mod runtime;
pub mod storage;
pub mod text;
pub mod timer;

// ---- Re-exports for stable public API ----
pub use crate::config::{load_config_default, TickerConfig};
pub use crate::engine::{Direction, EngineSettings, Phase, TickerEngine, TickerItem};
pub use crate::feed::{FeedEntry, FeedSource, FeedTransport, FetchError, FetchKind, HoursBack};
pub use crate::runtime::{Event, Schedule, TickerRuntime};
pub use crate::storage::{FileStore, MemoryStore, PersistentCache};

use std::sync::Arc;

use crate::feed::http::HttpTransport;
use crate::render::Renderer;

/// Wire a runtime against the HTTP feed and a file-backed store from `cfg`.
pub fn build_runtime<R: Renderer>(cfg: &TickerConfig, renderer: R) -> anyhow::Result<TickerRuntime<R>> {
    let transport = HttpTransport::new(&cfg.base_url)?;
    let source = FeedSource::new(Arc::new(transport), cfg);
    let cache = PersistentCache::new(FileStore::new(cfg.state_path.clone()));
    let engine = TickerEngine::new(EngineSettings::from_config(cfg), cache, renderer);
    Ok(TickerRuntime::new(engine, source, Schedule::from_config(cfg)))
}
