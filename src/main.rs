//! Rotter Ticker: Binary Entrypoint
//! Loads config, wires the HTTP feed and the console renderer, and feeds
//! stdin commands into the ticker loop.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rotter_ticker::input::{parse_command, UserInput, HELP};
use rotter_ticker::metrics::Metrics;
use rotter_ticker::render::ConsoleRenderer;
use rotter_ticker::{build_runtime, load_config_default, Event};

/// Logs go to stderr; stdout belongs to the ticker itself.
/// `TICKER_LOG_FORMAT=json` switches to structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rotter_ticker=info,warn"));

    let json = std::env::var("TICKER_LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = load_config_default().context("loading ticker config")?;
    tracing::info!(base_url = %cfg.base_url, state = %cfg.state_path.display(), "starting ticker");

    if let Some(addr) = cfg.metrics_addr.clone() {
        let metrics = Metrics::init()?;
        tokio::spawn(async move {
            if let Err(e) = metrics.serve(&addr).await {
                tracing::warn!(error = ?e, "metrics server stopped");
            }
        });
    }

    let runtime = build_runtime(&cfg, ConsoleRenderer::default())?;
    let tx = runtime.sender();

    eprintln!("{HELP}");
    let stdin_tx = tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_command(&line) {
                    Some(input) => {
                        let quit = input == UserInput::Quit;
                        if stdin_tx.send(Event::Input(input)).is_err() || quit {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => eprintln!("{HELP}"),
                },
                Ok(None) => {
                    let _ = stdin_tx.send(Event::Shutdown);
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = ?e, "stdin read failed");
                    break;
                }
            }
        }
    });

    let ctrl_c_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c_tx.send(Event::Shutdown);
        }
    });

    let engine = runtime.run().await;
    tracing::info!(last_seen = engine.last_seen(), "bye");
    Ok(())
}
