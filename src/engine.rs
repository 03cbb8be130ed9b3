//! # Ticker Engine
//! The display state machine: merges feed entries into a rotating queue with
//! unseen items first, keeps the last-seen watermark, drives auto-advance and
//! applies manual navigation, expand and visibility overrides.
//!
//! No network I/O happens here. Article bodies are requested through the
//! return value of [`TickerEngine::toggle_expand`] and fed back with
//! [`TickerEngine::on_article_body`]; feed results arrive through
//! [`TickerEngine::on_feed_result`]. The engine is the only writer of the
//! queue, the index and the auto-advance deadline.

use std::time::Duration;

use metrics::{counter, gauge};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::article::ArticleBodyCache;
use crate::config::TickerConfig;
use crate::feed::{ConnectivityChange, FeedEntry, FetchError, FetchKind, HoursBack};
use crate::gesture::{self, GestureThresholds, PointerGesture};
use crate::notify::Notice;
use crate::render::{BodyView, Frame, Placeholder, Renderer, Transition};
use crate::storage::PersistentCache;
use crate::text::{clean_body, clean_title};
use crate::timer::Deadline;

/// Display-ready item derived 1:1 from a `FeedEntry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerItem {
    pub title: String,
    pub time: String,
    pub link: Option<String>,
    pub timestamp: i64,
    /// Cleared the first time the item is painted.
    pub is_new: bool,
}

impl TickerItem {
    fn from_entry(entry: &FeedEntry, as_of: i64) -> Self {
        Self {
            title: clean_title(&entry.title),
            time: entry.date.clone(),
            link: entry
                .link
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            timestamp: entry.timestamp,
            is_new: entry.timestamp > as_of,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing to show yet, or a manual refresh is running.
    Loading,
    /// Queue non-empty, auto-advance armed.
    Displaying,
    /// Queue non-empty, surface hidden or under the user's finger.
    Paused,
    /// Queue empty; a placeholder is shown until the next successful ingest.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub display: Duration,
    pub fade: Duration,
    pub gestures: GestureThresholds,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            display: Duration::from_millis(5_000),
            fade: Duration::from_millis(500),
            gestures: GestureThresholds::default(),
        }
    }
}

impl EngineSettings {
    pub fn from_config(cfg: &TickerConfig) -> Self {
        Self {
            display: cfg.display(),
            fade: cfg.fade(),
            gestures: GestureThresholds {
                tap_slop: cfg.tap_slop_px,
                swipe: cfg.swipe_threshold_px,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    pub new_items: usize,
    pub queue_len: usize,
    /// The hours-back filter removed everything, so the unfiltered set was used.
    pub used_unfiltered: bool,
}

/// Article body the caller should fetch and hand back via `on_article_body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRequest {
    pub url: String,
}

pub struct TickerEngine<R> {
    settings: EngineSettings,
    cache: PersistentCache,
    bodies: ArticleBodyCache,
    renderer: R,

    queue: Vec<TickerItem>,
    index: usize,
    phase: Phase,
    expanded: bool,
    visible: bool,
    interacting: bool,
    refresh_pending: bool,

    last_seen: i64,
    hours_back: HoursBack,
    auto_timer: Deadline,
    /// What the renderer was last asked to paint, if an item is up.
    on_screen: Option<Shown>,
}

/// Identity of a painted frame: the item plus its "X / N" counter.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Shown {
    timestamp: i64,
    title: String,
    position: usize,
    total: usize,
}

impl<R: Renderer> TickerEngine<R> {
    pub fn new(settings: EngineSettings, mut cache: PersistentCache, renderer: R) -> Self {
        crate::metrics::describe();
        let last_seen = cache.last_seen();
        let hours_back = cache.hours_back();
        Self {
            settings,
            cache,
            bodies: ArticleBodyCache::new(),
            renderer,
            queue: Vec::new(),
            index: 0,
            phase: Phase::Loading,
            expanded: false,
            visible: true,
            interacting: false,
            refresh_pending: false,
            last_seen,
            hours_back,
            auto_timer: Deadline::default(),
            on_screen: None,
        }
    }

    /// Paint the loading state and, if the cache has entries, start rotating them.
    pub fn start(&mut self) {
        self.renderer.notify(&Notice::Loading);
        self.renderer.placeholder(Placeholder::Loading);
        let cached = self.cache.entries();
        if !cached.is_empty() {
            debug!(target: "engine", cached = cached.len(), "restoring from cache");
            self.restore(&cached);
        }
    }

    // ---- accessors ----

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queue(&self) -> &[TickerItem] {
        &self.queue
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&TickerItem> {
        match self.phase {
            Phase::Displaying | Phase::Paused => self.queue.get(self.index),
            Phase::Loading | Phase::Empty => None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn last_seen(&self) -> i64 {
        self.last_seen
    }

    pub fn hours_back(&self) -> HoursBack {
        self.hours_back
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// When the pending auto-advance fires, if any.
    pub fn advance_deadline(&self) -> Option<Instant> {
        self.auto_timer.at()
    }

    pub fn bodies(&self) -> &ArticleBodyCache {
        &self.bodies
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    // ---- ingest ----

    /// Ingest against the current watermark.
    pub fn ingest(&mut self, entries: &[FeedEntry], now: i64) -> IngestReport {
        self.ingest_as_of(entries, self.last_seen, now)
    }

    /// Rebuild the queue from `entries`: filter to the hours-back window
    /// (falling back to the unfiltered set if that empties it), then put
    /// entries newer than `as_of` first, each partition in input order.
    pub fn ingest_as_of(&mut self, entries: &[FeedEntry], as_of: i64, now: i64) -> IngestReport {
        let window = self.hours_back.as_secs();
        let recent: Vec<&FeedEntry> = entries
            .iter()
            .filter(|e| now.saturating_sub(e.timestamp) <= window)
            .collect();
        let used_unfiltered = recent.is_empty() && !entries.is_empty();
        let chosen: Vec<&FeedEntry> = if used_unfiltered {
            entries.iter().collect()
        } else {
            recent
        };

        let was_empty = self.queue.is_empty();
        let (new_items, clamped) = self.rebuild(&chosen, as_of);

        if let Some(newest) = entries.iter().map(|e| e.timestamp).max() {
            if newest > self.last_seen {
                self.last_seen = newest;
                self.cache.set_last_seen(newest);
                gauge!("ticker_last_seen_ts").set(newest as f64);
            }
        }

        counter!("ticker_ingest_total").increment(1);
        counter!("ticker_new_items_total").increment(new_items as u64);
        gauge!("ticker_queue_len").set(self.queue.len() as f64);
        info!(
            target: "engine",
            received = entries.len(),
            queued = self.queue.len(),
            new_items,
            used_unfiltered,
            last_seen = self.last_seen,
            "ingest"
        );

        if new_items > 0 {
            self.renderer.notify(&Notice::NewItems(new_items));
        }
        self.settle(new_items, was_empty || clamped);

        IngestReport {
            new_items,
            queue_len: self.queue.len(),
            used_unfiltered,
        }
    }

    /// Rebuild from cached entries without touching the watermark or notifying.
    pub fn restore(&mut self, entries: &[FeedEntry]) {
        let was_empty = self.queue.is_empty();
        let refs: Vec<&FeedEntry> = entries.iter().collect();
        let (new_items, clamped) = self.rebuild(&refs, self.last_seen);
        gauge!("ticker_queue_len").set(self.queue.len() as f64);
        self.settle(new_items, was_empty || clamped);
    }

    /// Apply a completed feed request.
    pub fn on_feed_result(
        &mut self,
        kind: FetchKind,
        result: Result<Vec<FeedEntry>, FetchError>,
        now: i64,
    ) {
        match (kind, result) {
            (FetchKind::Foreground, Ok(entries)) => {
                self.cache.save_entries(&entries);
                self.ingest(&entries, now);
            }
            (FetchKind::Foreground, Err(e)) => self.fetch_failed(&e),
            (FetchKind::Background, Ok(entries)) => {
                let newest = entries.iter().map(|e| e.timestamp).max().unwrap_or(0);
                if newest > self.last_seen {
                    self.cache.save_entries(&entries);
                    self.ingest(&entries, now);
                } else {
                    debug!(target: "engine", newest, last_seen = self.last_seen, "background refresh: nothing newer");
                }
            }
            (FetchKind::Background, Err(e)) => {
                debug!(target: "engine", error = %e, "background refresh failed");
            }
        }

        if kind == FetchKind::Foreground && self.refresh_pending {
            self.finish_refresh();
        }
    }

    fn fetch_failed(&mut self, err: &FetchError) {
        warn!(target: "engine", error = %err, "feed fetch failed");

        let cached = self.cache.entries();
        let nothing_to_show = cached.is_empty() && self.queue.is_empty();
        // Unreachable server is already signalled by the offline notice.
        if nothing_to_show || !err.is_unreachable() {
            self.renderer.notify(&Notice::FetchFailed(err.failure()));
        }

        if !cached.is_empty() {
            self.restore(&cached);
        } else if self.queue.is_empty() {
            self.enter_empty(Placeholder::Error(err.failure()));
        } else if self.phase == Phase::Loading {
            self.show_current(Transition::Fade);
        }
    }

    /// Returns the number of new items and whether the index had to be reset.
    fn rebuild(&mut self, entries: &[&FeedEntry], as_of: i64) -> (usize, bool) {
        let (mut fresh, seen): (Vec<TickerItem>, Vec<TickerItem>) = entries
            .iter()
            .map(|e| TickerItem::from_entry(e, as_of))
            .partition(|it| it.is_new);
        let new_items = fresh.len();
        fresh.extend(seen);
        self.queue = fresh;
        let clamped = self.index >= self.queue.len();
        if clamped {
            self.index = 0;
        }
        (new_items, clamped)
    }

    /// Show from the top when there is something new or nothing was on screen.
    fn settle(&mut self, new_items: usize, repaint: bool) {
        if self.queue.is_empty() {
            self.enter_empty(Placeholder::NoNews);
            return;
        }
        let idle = repaint || matches!(self.phase, Phase::Loading | Phase::Empty);
        if new_items > 0 || idle {
            self.index = 0;
            self.show_current(Transition::Fade);
        } else if self.phase == Phase::Displaying && !self.current_is_on_screen() {
            // Same position, different item or counter after the rebuild.
            self.show_current(Transition::Fade);
        }
    }

    fn current_frame(&self) -> Option<Shown> {
        self.queue.get(self.index).map(|it| Shown {
            timestamp: it.timestamp,
            title: it.title.clone(),
            position: self.index,
            total: self.queue.len(),
        })
    }

    fn current_is_on_screen(&self) -> bool {
        self.on_screen.is_some() && self.on_screen == self.current_frame()
    }

    // ---- manual refresh ----

    /// Switch to the Loading UI; the next foreground result completes it.
    pub fn begin_refresh(&mut self) {
        self.refresh_pending = true;
        self.auto_timer.cancel();
        self.collapse();
        self.on_screen = None;
        self.phase = Phase::Loading;
        self.renderer.notify(&Notice::Loading);
        self.renderer.placeholder(Placeholder::Loading);
    }

    /// Already showing the top item means the refresh result was painted by
    /// `settle`, which also started a fresh interval; nothing to redo.
    fn finish_refresh(&mut self) {
        self.refresh_pending = false;
        let at_top = self.phase == Phase::Displaying && self.index == 0;
        if !self.queue.is_empty() && !at_top {
            self.index = 0;
            self.show_current(Transition::Fade);
        }
    }

    /// Change the hours-back window. Returns true if a refresh was started.
    pub fn set_hours_back(&mut self, hours: u32) -> bool {
        let next = HoursBack::coerce(hours);
        if next == self.hours_back {
            return false;
        }
        info!(target: "engine", from = %self.hours_back, to = %next, "hours-back changed");
        self.hours_back = next;
        self.cache.set_hours_back(next);
        self.begin_refresh();
        true
    }

    // ---- navigation ----

    pub fn advance(&mut self, direction: Direction) {
        if self.queue.is_empty() {
            return;
        }
        let len = self.queue.len();
        let (index, transition) = match direction {
            Direction::Next => ((self.index + 1) % len, Transition::Cut),
            Direction::Prev => ((self.index + len - 1) % len, Transition::Cut),
            Direction::Auto => ((self.index + 1) % len, Transition::Fade),
        };
        self.index = index;
        if direction == Direction::Auto {
            counter!("ticker_auto_advance_total").increment(1);
        }
        self.show_current(transition);
    }

    /// Fire the auto-advance if it is due at `now`. Returns whether it fired.
    pub fn on_timer(&mut self, now: Instant) -> bool {
        if !self.auto_timer.is_due(now) {
            return false;
        }
        self.auto_timer.cancel();
        self.advance(Direction::Auto);
        true
    }

    /// Cancel the pending auto-advance and arm a fresh full interval.
    pub fn reschedule(&mut self) {
        self.auto_timer.cancel();
        if self.phase == Phase::Displaying {
            self.auto_timer.arm(self.dwell(Transition::Cut));
        }
    }

    fn dwell(&self, transition: Transition) -> Duration {
        let base = if self.expanded {
            self.settings.display * 2
        } else {
            self.settings.display
        };
        match transition {
            Transition::Cut => base,
            Transition::Fade => base + self.settings.fade,
        }
    }

    fn show_current(&mut self, transition: Transition) {
        self.auto_timer.cancel();
        if self.queue.is_empty() {
            self.enter_empty(Placeholder::NoNews);
            return;
        }
        if self.index >= self.queue.len() {
            self.index = 0;
        }
        self.collapse();
        if !self.visible || self.interacting {
            self.phase = Phase::Paused;
            return;
        }

        self.phase = Phase::Displaying;
        let total = self.queue.len();
        let item = &self.queue[self.index];
        debug!(target: "engine", index = self.index, total, is_new = item.is_new, ?transition, "display");
        self.renderer.paint(
            &Frame {
                item,
                position: self.index,
                total,
            },
            transition,
        );
        self.queue[self.index].is_new = false;
        self.on_screen = self.current_frame();
        self.auto_timer.arm(self.dwell(transition));
    }

    fn enter_empty(&mut self, placeholder: Placeholder) {
        self.auto_timer.cancel();
        self.collapse();
        self.index = 0;
        self.on_screen = None;
        self.phase = Phase::Empty;
        self.renderer.placeholder(placeholder);
    }

    fn collapse(&mut self) {
        if self.expanded {
            self.expanded = false;
            self.renderer.body(BodyView::Hidden);
        }
    }

    // ---- expand ----

    /// Flip expand on the current item. Returns a request when the body is not
    /// cached yet. Either way the countdown restarts (doubled while expanded).
    pub fn toggle_expand(&mut self) -> Option<ArticleRequest> {
        if self.phase != Phase::Displaying {
            return None;
        }
        self.expanded = !self.expanded;
        self.reschedule();

        if !self.expanded {
            self.renderer.body(BodyView::Hidden);
            return None;
        }

        let Some(url) = self.queue[self.index].link.clone() else {
            self.renderer.body(BodyView::Unavailable);
            return None;
        };
        if let Some(body) = self.bodies.get(&url) {
            let view = body_view(body);
            self.renderer.body(view);
            return None;
        }
        self.renderer.body(BodyView::Loading);
        Some(ArticleRequest { url })
    }

    /// Store a fetched body and show it only if `url` is still the expanded item.
    pub fn on_article_body(&mut self, url: &str, raw: &str) {
        let body = clean_body(raw);
        let still_current = self.expanded
            && self.phase == Phase::Displaying
            && self
                .queue
                .get(self.index)
                .and_then(|it| it.link.as_deref())
                == Some(url);

        if still_current {
            self.renderer.body(body_view(&body));
        } else {
            debug!(target: "engine", %url, "article body arrived for an item no longer expanded");
        }
        self.bodies.put(url, body);
    }

    // ---- visibility & pointer ----

    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if !visible {
            self.auto_timer.cancel();
            if self.phase == Phase::Displaying {
                self.phase = Phase::Paused;
            }
            debug!(target: "engine", "hidden; auto-advance paused");
        } else if !self.interacting && self.phase == Phase::Paused {
            self.show_current(Transition::Fade);
        }
    }

    /// A finger/pointer went down on the ticker surface.
    pub fn pointer_down(&mut self) {
        self.interacting = true;
        self.auto_timer.cancel();
        if self.phase == Phase::Displaying {
            self.phase = Phase::Paused;
        }
    }

    /// The pointer was released; dispatch navigation or resume.
    pub fn pointer_up(&mut self, g: PointerGesture) -> Option<Direction> {
        self.interacting = false;
        let direction = gesture::classify(g, self.settings.gestures);
        match direction {
            Some(d) if !self.queue.is_empty() => self.advance(d),
            _ => {
                if self.phase == Phase::Paused && self.visible {
                    if self.current_is_on_screen() {
                        self.phase = Phase::Displaying;
                        self.reschedule();
                    } else {
                        // The queue moved while the pointer was down.
                        self.show_current(Transition::Fade);
                    }
                }
            }
        }
        direction
    }

    /// Down + up in one call.
    pub fn gesture(&mut self, g: PointerGesture) -> Option<Direction> {
        self.pointer_down();
        self.pointer_up(g)
    }

    // ---- connectivity & lifecycle ----

    pub fn connectivity_changed(&mut self, change: ConnectivityChange) {
        match change {
            ConnectivityChange::WentOffline => {
                self.renderer.set_offline(true);
                self.renderer.notify(&Notice::Offline);
            }
            ConnectivityChange::Reconnected => {
                self.renderer.set_offline(false);
                self.renderer.notify(&Notice::Reconnected);
            }
        }
    }

    /// Final watermark write and timer cancel.
    pub fn shutdown(&mut self) {
        self.auto_timer.cancel();
        self.cache.set_last_seen(self.last_seen);
        info!(target: "engine", last_seen = self.last_seen, "ticker stopped");
    }
}

fn body_view(body: &str) -> BodyView {
    if body.is_empty() {
        BodyView::Unavailable
    } else {
        BodyView::Text(body.to_string())
    }
}
