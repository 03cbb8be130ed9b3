// src/runtime.rs
//! Single-writer event loop around a [`TickerEngine`].
//!
//! Every state change happens on this loop: user input, fetch completions,
//! the auto-advance deadline and the three refresh/probe intervals. Network
//! requests are spawned and report back as [`Event`]s.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::TickerConfig;
use crate::engine::{Direction, TickerEngine};
use crate::feed::{ConnectivityChange, FeedEntry, FeedSource, FetchError, FetchKind, HoursBack};
use crate::input::UserInput;
use crate::render::Renderer;
use crate::timer::wait_until;

#[derive(Debug)]
pub enum Event {
    Input(UserInput),
    FeedFetched {
        kind: FetchKind,
        /// Window the request was issued with.
        hours: HoursBack,
        result: Result<Vec<FeedEntry>, FetchError>,
    },
    ProbeFinished(Result<(), FetchError>),
    ArticleFetched {
        url: String,
        body: String,
    },
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub background: Duration,
    pub full: Duration,
    pub probe: Duration,
}

impl Schedule {
    pub fn from_config(cfg: &TickerConfig) -> Self {
        Self {
            background: cfg.background_refresh(),
            full: cfg.full_refresh(),
            probe: cfg.probe_interval(),
        }
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub struct TickerRuntime<R> {
    engine: TickerEngine<R>,
    source: FeedSource,
    schedule: Schedule,
    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
    foreground_in_flight: bool,
    clock: fn() -> i64,
}

impl<R: Renderer> TickerRuntime<R> {
    pub fn new(engine: TickerEngine<R>, source: FeedSource, schedule: Schedule) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine,
            source,
            schedule,
            tx,
            rx,
            foreground_in_flight: false,
            clock: unix_now,
        }
    }

    /// Replace the wall clock used for the hours-back window.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn sender(&self) -> UnboundedSender<Event> {
        self.tx.clone()
    }

    pub fn engine(&self) -> &TickerEngine<R> {
        &self.engine
    }

    /// Run until `Event::Shutdown` or `UserInput::Quit`; returns the engine
    /// after the watermark has been persisted.
    pub async fn run(mut self) -> TickerEngine<R> {
        self.engine.start();
        self.spawn_foreground();

        let start = Instant::now();
        let mut background = ticker(start, self.schedule.background);
        let mut full = ticker(start, self.schedule.full);
        let mut probe = ticker(start, self.schedule.probe);

        loop {
            let deadline = self.engine.advance_deadline();
            tokio::select! {
                ev = self.rx.recv() => match ev {
                    Some(ev) => {
                        if !self.handle(ev) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = wait_until(deadline) => {
                    self.engine.on_timer(Instant::now());
                }
                _ = background.tick() => self.background_refresh(),
                _ = full.tick() => self.full_refresh(),
                _ = probe.tick() => self.spawn_probe(),
            }
        }

        self.engine.shutdown();
        self.engine
    }

    /// Apply one event. Returns false when the loop should stop.
    fn handle(&mut self, ev: Event) -> bool {
        match ev {
            Event::Input(input) => return self.on_input(input),
            Event::FeedFetched { kind, hours, result } => {
                if kind == FetchKind::Foreground {
                    self.foreground_in_flight = false;
                    let reachable = result.as_ref().map_or_else(|e| !e.is_unreachable(), |_| true);
                    if let Some(change) = self.source.record(reachable) {
                        self.engine.connectivity_changed(change);
                    }
                }
                if hours != self.engine.hours_back() {
                    debug!(
                        target: "runtime",
                        ?kind,
                        requested = hours.hours(),
                        current = self.engine.hours_back().hours(),
                        "dropping feed result for a previous hours window"
                    );
                    if kind == FetchKind::Foreground {
                        self.spawn_foreground();
                    }
                    return true;
                }
                self.engine.on_feed_result(kind, result, (self.clock)());
            }
            Event::ProbeFinished(result) => {
                let reachable = result.map_or_else(|e| !e.is_unreachable(), |_| true);
                if let Some(change) = self.source.record(reachable) {
                    self.engine.connectivity_changed(change);
                    if change == ConnectivityChange::Reconnected {
                        self.spawn_foreground();
                    }
                }
            }
            Event::ArticleFetched { url, body } => self.engine.on_article_body(&url, &body),
            Event::Shutdown => return false,
        }
        true
    }

    fn on_input(&mut self, input: UserInput) -> bool {
        debug!(target: "runtime", ?input, "input");
        match input {
            UserInput::Next => self.engine.advance(Direction::Next),
            UserInput::Prev => self.engine.advance(Direction::Prev),
            UserInput::ToggleExpand => {
                if let Some(req) = self.engine.toggle_expand() {
                    self.spawn_article(req.url);
                }
            }
            UserInput::Refresh => {
                self.engine.begin_refresh();
                self.spawn_foreground();
            }
            UserInput::SetHours(hours) => {
                if self.engine.set_hours_back(hours) {
                    self.spawn_foreground();
                }
            }
            UserInput::PointerDown => self.engine.pointer_down(),
            UserInput::Pointer(g) => {
                self.engine.gesture(g);
            }
            UserInput::Visibility(visible) => self.engine.set_visible(visible),
            UserInput::Quit => return false,
        }
        true
    }

    fn background_refresh(&mut self) {
        if !self.engine.is_visible() || self.source.is_offline() || self.foreground_in_flight {
            debug!(target: "runtime", "background refresh skipped");
            return;
        }
        self.spawn_fetch(FetchKind::Background);
    }

    fn full_refresh(&mut self) {
        if !self.engine.is_visible() || self.source.is_offline() {
            debug!(target: "runtime", "periodic refresh skipped");
            return;
        }
        self.spawn_foreground();
    }

    /// At most one foreground request; a second caller rides on the first.
    fn spawn_foreground(&mut self) {
        if self.foreground_in_flight {
            debug!(target: "runtime", "foreground fetch already in flight");
            return;
        }
        self.foreground_in_flight = true;
        self.spawn_fetch(FetchKind::Foreground);
    }

    fn spawn_fetch(&self, kind: FetchKind) {
        let hours = self.engine.hours_back();
        let fut = self.source.fetch_feed(hours, kind);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fut.await;
            // Receiver gone means the loop has already stopped.
            let _ = tx.send(Event::FeedFetched { kind, hours, result });
        });
    }

    fn spawn_probe(&self) {
        let fut = self.source.probe();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(Event::ProbeFinished(fut.await));
        });
    }

    fn spawn_article(&self, url: String) {
        info!(target: "runtime", %url, "fetching article body");
        let fut = self.source.fetch_article(url.clone());
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let body = fut.await;
            let _ = tx.send(Event::ArticleFetched { url, body });
        });
    }
}

fn ticker(start: Instant, period: Duration) -> Interval {
    let mut iv = interval_at(start + period, period);
    iv.set_missed_tick_behavior(MissedTickBehavior::Delay);
    iv
}
