// tests/engine_scenarios.rs
//
// End-to-end behavior of the ticker engine against an in-memory store and a
// recording renderer. No network, no runtime loop.

use rotter_ticker::engine::{Direction, EngineSettings, Phase, TickerEngine};
use rotter_ticker::feed::{ConnectivityChange, Failure, FeedEntry, FetchError, FetchKind};
use rotter_ticker::gesture::PointerGesture;
use rotter_ticker::notify::Notice;
use rotter_ticker::render::{BodyView, Placeholder, RecordingRenderer, RenderLog, Transition};
use rotter_ticker::storage::{MemoryStore, PersistentCache};

struct Harness {
    engine: TickerEngine<RecordingRenderer>,
    log: RenderLog,
    store: MemoryStore,
}

fn harness_with(store: MemoryStore) -> Harness {
    let renderer = RecordingRenderer::new();
    let log = renderer.log();
    let engine = TickerEngine::new(
        EngineSettings::default(),
        PersistentCache::new(store.clone()),
        renderer,
    );
    Harness { engine, log, store }
}

fn harness() -> Harness {
    harness_with(MemoryStore::new())
}

fn titles(e: &TickerEngine<RecordingRenderer>) -> Vec<&str> {
    e.queue().iter().map(|i| i.title.as_str()).collect()
}

fn entry(title: &str, ts: i64) -> FeedEntry {
    FeedEntry::new(title, "12:00", ts)
}

#[tokio::test]
async fn first_ingest_shows_everything_as_new_in_feed_order() {
    let mut h = harness();
    let report = h.engine.ingest(&[entry("A", 100), entry("B", 50)], 100);

    assert_eq!(titles(&h.engine), vec!["A", "B"]);
    assert_eq!(report.new_items, 2);
    assert_eq!(h.engine.last_seen(), 100);
    assert_eq!(h.engine.phase(), Phase::Displaying);
    assert_eq!(h.engine.index(), 0);
    assert_eq!(h.log.paints(), vec![("A".to_string(), 0, true, Transition::Fade)]);
    assert!(h.engine.advance_deadline().is_some());
    assert_eq!(h.store.snapshot().get("last_seen_ts").map(String::as_str), Some("100"));
}

#[tokio::test]
async fn unseen_items_move_to_the_front() {
    let mut h = harness();
    h.engine.ingest(&[entry("A", 100), entry("B", 50)], 100);
    h.log.clear();

    let report = h
        .engine
        .ingest(&[entry("A", 100), entry("B", 50), entry("C", 150)], 150);

    assert_eq!(titles(&h.engine), vec!["C", "A", "B"]);
    assert_eq!(report.new_items, 1);
    assert_eq!(h.engine.last_seen(), 150);
    assert_eq!(h.log.notices(), vec![Notice::NewItems(1)]);
    assert_eq!(h.log.painted_titles(), vec!["C".to_string()]);
}

#[tokio::test]
async fn refetch_without_news_keeps_position_and_stays_quiet() {
    let mut h = harness();
    let feed = [entry("A", 100), entry("B", 50), entry("C", 40)];
    h.engine.ingest(&feed, 100);
    h.engine.advance(Direction::Next);
    h.log.clear();

    let report = h.engine.ingest(&feed, 100);
    assert_eq!(report.new_items, 0);
    assert_eq!(h.engine.index(), 1);
    assert!(h.log.notices().is_empty());
    assert!(h.log.paints().is_empty());
}

#[tokio::test]
async fn shrinking_rebuild_restarts_from_the_top() {
    let mut h = harness();
    h.engine
        .ingest(&[entry("A", 100), entry("B", 50), entry("C", 40)], 100);
    h.engine.advance(Direction::Prev); // wraps to C
    assert_eq!(h.engine.index(), 2);
    h.log.clear();

    h.engine.ingest(&[entry("A", 100), entry("B", 50)], 100);
    assert_eq!(h.engine.index(), 0);
    assert_eq!(h.log.painted_titles(), vec!["A".to_string()]);
}

#[tokio::test]
async fn hours_filter_falls_back_to_everything_when_it_empties_the_feed() {
    let mut h = harness();
    let day = 24 * 3600;
    let report = h
        .engine
        .ingest(&[entry("old", 1_000), entry("older", 900)], 1_000 + day);
    assert!(report.used_unfiltered);
    assert_eq!(titles(&h.engine), vec!["old", "older"]);

    let now = 10 * day;
    let report = h
        .engine
        .ingest(&[entry("fresh", now - 60), entry("stale", now - day)], now);
    assert!(!report.used_unfiltered);
    assert_eq!(titles(&h.engine), vec!["fresh"]);
}

#[tokio::test]
async fn failed_fetch_with_cache_rotates_cached_entries_offline() {
    let store = MemoryStore::new();
    PersistentCache::new(store.clone()).save_entries(&[
        entry("c1", 300),
        entry("c2", 200),
        entry("c3", 100),
    ]);
    let mut h = harness_with(store);

    h.engine.connectivity_changed(ConnectivityChange::WentOffline);
    h.engine.on_feed_result(
        FetchKind::Foreground,
        Err(FetchError::Network("connection refused".into())),
        300,
    );

    assert_eq!(titles(&h.engine), vec!["c1", "c2", "c3"]);
    assert_eq!(h.engine.phase(), Phase::Displaying);
    assert_eq!(h.log.offline_flags(), vec![true]);
    // Unreachable server is reported by the offline notice alone.
    assert_eq!(h.log.notices(), vec![Notice::Offline]);
}

#[tokio::test]
async fn failed_fetch_without_cache_shows_error_placeholder() {
    let mut h = harness();
    h.engine.start();
    h.engine
        .on_feed_result(FetchKind::Foreground, Err(FetchError::Timeout), 100);

    assert_eq!(h.engine.phase(), Phase::Empty);
    assert!(h.engine.queue().is_empty());
    assert_eq!(
        h.log.placeholders(),
        vec![Placeholder::Loading, Placeholder::Error(Failure::Timeout)]
    );
    assert_eq!(
        h.log.notices(),
        vec![Notice::Loading, Notice::FetchFailed(Failure::Timeout)]
    );
    assert!(h.engine.advance_deadline().is_none());
}

#[tokio::test]
async fn empty_result_is_reported_even_with_a_cache() {
    let store = MemoryStore::new();
    PersistentCache::new(store.clone()).save_entries(&[entry("c1", 10)]);
    let mut h = harness_with(store);

    h.engine
        .on_feed_result(FetchKind::Foreground, Err(FetchError::EmptyResult), 10);
    assert_eq!(titles(&h.engine), vec!["c1"]);
    assert_eq!(h.log.notices(), vec![Notice::FetchFailed(Failure::Empty)]);
}

#[tokio::test]
async fn left_swipe_moves_forward_with_a_cut() {
    let mut h = harness();
    h.engine
        .ingest(&[entry("A", 100), entry("B", 50), entry("C", 40)], 100);
    let before = h.engine.advance_deadline().unwrap();
    h.log.clear();

    let dir = h.engine.gesture(PointerGesture::drag(300.0, 250.0, 400.0));
    assert_eq!(dir, Some(Direction::Next));
    assert_eq!(h.engine.index(), 1);
    assert_eq!(h.log.paints(), vec![("B".to_string(), 1, true, Transition::Cut)]);
    let after = h.engine.advance_deadline().unwrap();
    assert_ne!(before, after);
}

#[tokio::test]
async fn taps_navigate_by_half_and_small_drags_only_resume() {
    let mut h = harness();
    h.engine
        .ingest(&[entry("A", 100), entry("B", 50), entry("C", 40)], 100);

    h.engine.gesture(PointerGesture::tap(50.0, 400.0));
    assert_eq!(h.engine.index(), 2);
    h.engine.gesture(PointerGesture::tap(350.0, 400.0));
    assert_eq!(h.engine.index(), 0);

    h.log.clear();
    assert_eq!(h.engine.gesture(PointerGesture::drag(200.0, 225.0, 400.0)), None);
    assert_eq!(h.engine.index(), 0);
    assert!(h.log.paints().is_empty());
    assert_eq!(h.engine.phase(), Phase::Displaying);
    assert!(h.engine.advance_deadline().is_some());
}

#[tokio::test]
async fn pointer_hold_pauses_auto_advance() {
    let mut h = harness();
    h.engine.ingest(&[entry("A", 100), entry("B", 50)], 100);

    h.engine.pointer_down();
    assert_eq!(h.engine.phase(), Phase::Paused);
    assert!(h.engine.advance_deadline().is_none());
    assert!(!h.engine.on_timer(tokio::time::Instant::now() + std::time::Duration::from_secs(60)));
}

#[tokio::test(start_paused = true)]
async fn auto_advance_wraps_and_counts_positions() {
    let mut h = harness();
    h.engine.ingest(&[entry("A", 100), entry("B", 50)], 100);

    for _ in 0..3 {
        let due = h.engine.advance_deadline().unwrap();
        tokio::time::sleep_until(due).await;
        assert!(h.engine.on_timer(tokio::time::Instant::now()));
    }

    let paints = h.log.paints();
    let positions: Vec<usize> = paints.iter().map(|p| p.1).collect();
    assert_eq!(positions, vec![0, 1, 0, 1]);
    assert!(paints.iter().all(|p| p.3 == Transition::Fade));
    // Only the first pass shows the new marker.
    let new_flags: Vec<bool> = paints.iter().map(|p| p.2).collect();
    assert_eq!(new_flags, vec![true, true, false, false]);
}

#[tokio::test]
async fn manual_refresh_completes_with_the_next_foreground_result() {
    let mut h = harness();
    h.engine.ingest(&[entry("A", 100), entry("B", 50)], 100);
    h.engine.advance(Direction::Next);

    h.engine.begin_refresh();
    assert_eq!(h.engine.phase(), Phase::Loading);
    assert!(h.engine.advance_deadline().is_none());
    h.log.clear();

    h.engine.on_feed_result(
        FetchKind::Foreground,
        Ok(vec![entry("A", 100), entry("B", 50)]),
        100,
    );
    assert!(!h.engine.refresh_pending());
    assert_eq!(h.engine.index(), 0);
    assert_eq!(h.engine.phase(), Phase::Displaying);
    assert_eq!(h.log.painted_titles().first().map(String::as_str), Some("A"));
}

#[tokio::test]
async fn background_result_only_applies_when_newer() {
    let mut h = harness();
    h.engine.ingest(&[entry("A", 100)], 100);
    h.log.clear();

    h.engine
        .on_feed_result(FetchKind::Background, Ok(vec![entry("A", 100)]), 100);
    assert!(h.log.events().is_empty());

    h.engine.on_feed_result(
        FetchKind::Background,
        Err(FetchError::Network("down".into())),
        100,
    );
    assert!(h.log.events().is_empty());

    h.engine.on_feed_result(
        FetchKind::Background,
        Ok(vec![entry("A", 100), entry("N", 120)]),
        120,
    );
    assert_eq!(titles(&h.engine), vec!["N", "A"]);
    assert_eq!(h.log.notices(), vec![Notice::NewItems(1)]);
}

#[tokio::test]
async fn expanded_body_only_lands_on_its_own_item() {
    let mut h = harness();
    h.engine.ingest(
        &[
            entry("A", 100).with_link("http://rotter/a"),
            entry("B", 90).with_link("http://rotter/b"),
        ],
        100,
    );

    let req = h.engine.toggle_expand().expect("body request");
    assert_eq!(req.url, "http://rotter/a");
    h.engine.on_article_body(&req.url, "<p>Body &amp; more</p>");
    assert_eq!(
        h.log.bodies(),
        vec![BodyView::Loading, BodyView::Text("Body & more".into())]
    );

    let req_b = {
        h.engine.advance(Direction::Next);
        h.engine.toggle_expand().expect("body request for B")
    };
    h.engine.advance(Direction::Next);
    h.log.clear();
    h.engine.on_article_body(&req_b.url, "late");
    assert!(h.log.bodies().is_empty());
}

#[tokio::test]
async fn empty_article_body_reads_as_unavailable() {
    let mut h = harness();
    h.engine
        .ingest(&[entry("A", 100).with_link("http://rotter/a")], 100);
    let req = h.engine.toggle_expand().unwrap();
    h.engine.on_article_body(&req.url, "");
    assert_eq!(h.log.bodies().last(), Some(&BodyView::Unavailable));
}

#[tokio::test]
async fn startup_restores_cache_against_persisted_watermark() {
    let store = MemoryStore::new();
    {
        let mut cache = PersistentCache::new(store.clone());
        cache.save_entries(&[entry("old", 100), entry("newer", 200)]);
        cache.set_last_seen(150);
    }
    let mut h = harness_with(store);
    h.engine.start();

    assert_eq!(titles(&h.engine), vec!["newer", "old"]);
    assert_eq!(h.engine.last_seen(), 150);
    assert_eq!(h.log.notices(), vec![Notice::Loading]);
    assert_eq!(h.engine.phase(), Phase::Displaying);
}

#[tokio::test]
async fn empty_feed_after_filtering_shows_no_news() {
    let mut h = harness();
    h.engine.ingest(&[], 100);
    assert_eq!(h.engine.phase(), Phase::Empty);
    assert_eq!(h.log.placeholders(), vec![Placeholder::NoNews]);
}

#[tokio::test]
async fn hidden_ticker_does_not_paint_new_items_until_shown() {
    let mut h = harness();
    h.engine.set_visible(false);
    h.engine.ingest(&[entry("A", 100)], 100);
    assert_eq!(h.engine.phase(), Phase::Paused);
    assert!(h.log.paints().is_empty());

    h.engine.set_visible(true);
    assert_eq!(h.log.paints(), vec![("A".to_string(), 0, true, Transition::Fade)]);
}

#[tokio::test]
async fn shutdown_persists_watermark() {
    let mut h = harness();
    h.engine.ingest(&[entry("A", 4242)], 4242);
    h.engine.shutdown();
    assert!(h.engine.advance_deadline().is_none());

    let mut reopened = PersistentCache::new(h.store.clone());
    assert_eq!(reopened.last_seen(), 4242);
}

#[tokio::test(start_paused = true)]
async fn news_arriving_under_a_held_pointer_is_painted_on_release() {
    let mut h = harness();
    h.engine.ingest(&[entry("A", 100), entry("B", 50)], 100);
    h.engine.advance(Direction::Next);
    h.engine.pointer_down();

    let report = h.engine.ingest(&[entry("C", 150), entry("A", 100), entry("B", 50)], 150);
    assert_eq!(report.new_items, 1);
    assert_eq!(h.engine.index(), 0);
    assert_eq!(h.engine.phase(), Phase::Paused);
    h.log.clear();

    assert_eq!(h.engine.pointer_up(PointerGesture::drag(200.0, 220.0, 400.0)), None);
    assert_eq!(h.log.paints(), vec![("C".to_string(), 0, true, Transition::Fade)]);
    assert!(!h.engine.queue()[0].is_new);
    assert_eq!(h.engine.phase(), Phase::Displaying);

    let due = h.engine.advance_deadline().unwrap();
    tokio::time::sleep_until(due).await;
    assert!(h.engine.on_timer(tokio::time::Instant::now()));
    assert_eq!(h.log.paints()[1], ("A".to_string(), 1, false, Transition::Fade));
}

#[tokio::test]
async fn refresh_finishing_under_a_held_pointer_is_painted_on_release() {
    let mut h = harness();
    let feed = [entry("A", 100), entry("B", 50)];
    h.engine.ingest(&feed, 100);
    h.engine.advance(Direction::Next);

    h.engine.begin_refresh();
    h.engine.pointer_down();
    h.engine.on_feed_result(FetchKind::Foreground, Ok(feed.to_vec()), 100);
    assert!(!h.engine.refresh_pending());
    h.log.clear();

    h.engine.pointer_up(PointerGesture::drag(200.0, 225.0, 400.0));
    assert_eq!(h.log.paints(), vec![("A".to_string(), 0, false, Transition::Fade)]);
    assert!(h.engine.advance_deadline().is_some());
}

#[tokio::test]
async fn shrunken_queue_repaints_the_item_now_at_the_same_position() {
    let mut h = harness();
    h.engine
        .ingest(&[entry("A", 100), entry("B", 50), entry("C", 40)], 100);
    h.engine.advance(Direction::Next);
    h.log.clear();

    let report = h.engine.ingest(&[entry("B", 50), entry("C", 40)], 100);
    assert_eq!(report.new_items, 0);
    assert_eq!(h.engine.index(), 1);
    assert_eq!(h.log.paints(), vec![("C".to_string(), 1, false, Transition::Fade)]);
}
