// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PATH: &str = "TICKER_CONFIG_PATH";
const ENV_BASE_URL: &str = "TICKER_BASE_URL";
const ENV_STATE_PATH: &str = "TICKER_STATE_PATH";

/// Runtime knobs. Every field has a default so partial files are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub base_url: String,
    pub state_path: PathBuf,
    pub display_ms: u64,
    pub fade_ms: u64,
    pub foreground_timeout_ms: u64,
    pub background_timeout_ms: u64,
    pub background_refresh_secs: u64,
    pub full_refresh_secs: u64,
    pub probe_interval_secs: u64,
    pub swipe_threshold_px: f32,
    pub tap_slop_px: f32,
    /// e.g. "127.0.0.1:9100"; exporter is off when unset.
    pub metrics_addr: Option<String>,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            state_path: PathBuf::from("state/ticker.json"),
            display_ms: 5_000,
            fade_ms: 500,
            foreground_timeout_ms: 10_000,
            background_timeout_ms: 5_000,
            background_refresh_secs: 10,
            full_refresh_secs: 180,
            probe_interval_secs: 30,
            swipe_threshold_px: 40.0,
            tap_slop_px: 10.0,
            metrics_addr: None,
        }
    }
}

impl TickerConfig {
    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn foreground_timeout(&self) -> Duration {
        Duration::from_millis(self.foreground_timeout_ms)
    }

    pub fn background_timeout(&self) -> Duration {
        Duration::from_millis(self.background_timeout_ms)
    }

    pub fn background_refresh(&self) -> Duration {
        Duration::from_secs(self.background_refresh_secs)
    }

    pub fn full_refresh(&self) -> Duration {
        Duration::from_secs(self.full_refresh_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    /// Replace zero durations and non-positive thresholds with defaults.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        fn or_default(v: &mut u64, dflt: u64) {
            if *v == 0 {
                *v = dflt;
            }
        }
        or_default(&mut self.display_ms, d.display_ms);
        or_default(&mut self.fade_ms, d.fade_ms);
        or_default(&mut self.foreground_timeout_ms, d.foreground_timeout_ms);
        or_default(&mut self.background_timeout_ms, d.background_timeout_ms);
        or_default(&mut self.background_refresh_secs, d.background_refresh_secs);
        or_default(&mut self.full_refresh_secs, d.full_refresh_secs);
        or_default(&mut self.probe_interval_secs, d.probe_interval_secs);
        if !self.swipe_threshold_px.is_finite() || self.swipe_threshold_px <= 0.0 {
            self.swipe_threshold_px = d.swipe_threshold_px;
        }
        if !self.tap_slop_px.is_finite() || self.tap_slop_px <= 0.0 {
            self.tap_slop_px = d.tap_slop_px;
        }
        if self.base_url.trim().is_empty() {
            self.base_url = d.base_url;
        }
        if self.metrics_addr.as_deref().is_some_and(|a| a.trim().is_empty()) {
            self.metrics_addr = None;
        }
        self
    }

    fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        if let Ok(p) = std::env::var(ENV_STATE_PATH) {
            if !p.trim().is_empty() {
                self.state_path = PathBuf::from(p.trim());
            }
        }
        self
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<TickerConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading ticker config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing ticker config {}", path.display()))?;
    Ok(cfg.sanitized())
}

/// Load config using env var + fallbacks, then env overrides:
/// 1) $TICKER_CONFIG_PATH
/// 2) config/ticker.toml
/// 3) config/ticker.json
/// 4) built-in defaults
pub fn load_config_default() -> Result<TickerConfig> {
    let base = if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
        load_config_from(&pb)?
    } else {
        let toml_p = PathBuf::from("config/ticker.toml");
        let json_p = PathBuf::from("config/ticker.json");
        if toml_p.exists() {
            load_config_from(&toml_p)?
        } else if json_p.exists() {
            load_config_from(&json_p)?
        } else {
            TickerConfig::default()
        }
    };
    Ok(base.apply_env().sanitized())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<TickerConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => toml::from_str(s)
            .map_err(anyhow::Error::from)
            .or_else(|_| serde_json::from_str(s).map_err(anyhow::Error::from))
            .map_err(|_| anyhow!("unsupported config format")),
    }
}
