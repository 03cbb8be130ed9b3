// tests/config_load.rs
use std::{env, fs};

use rotter_ticker::config::{load_config_default, load_config_from};
use rotter_ticker::engine::EngineSettings;
use rotter_ticker::runtime::Schedule;
use std::time::Duration;

#[test]
fn toml_file_drives_engine_and_schedule() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("ticker.toml");
    fs::write(
        &p,
        r#"
base_url = "http://rotter.local:3000/"
display_ms = 4000
fade_ms = 250
background_refresh_secs = 15
probe_interval_secs = 0
swipe_threshold_px = 60.0
metrics_addr = "127.0.0.1:9100"
"#,
    )
    .unwrap();

    let cfg = load_config_from(&p).unwrap();
    assert_eq!(cfg.metrics_addr.as_deref(), Some("127.0.0.1:9100"));

    let settings = EngineSettings::from_config(&cfg);
    assert_eq!(settings.display, Duration::from_millis(4_000));
    assert_eq!(settings.fade, Duration::from_millis(250));
    assert_eq!(settings.gestures.swipe, 60.0);
    assert_eq!(settings.gestures.tap_slop, 10.0);

    let schedule = Schedule::from_config(&cfg);
    assert_eq!(schedule.background, Duration::from_secs(15));
    assert_eq!(schedule.full, Duration::from_secs(180));
    assert_eq!(schedule.probe, Duration::from_secs(30));
}

#[test]
fn unreadable_or_unknown_files_are_errors() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(load_config_from(&tmp.path().join("nope.toml")).is_err());

    let p = tmp.path().join("ticker.yaml");
    fs::write(&p, "display_ms: [").unwrap();
    assert!(load_config_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn env_overrides_apply_on_top_of_files() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("ticker.json");
    fs::write(&p, r#"{"base_url":"http://from-file","state_path":"from-file.json"}"#).unwrap();

    env::set_var("TICKER_CONFIG_PATH", p.display().to_string());
    env::set_var("TICKER_STATE_PATH", "/tmp/ticker-state.json");
    env::remove_var("TICKER_BASE_URL");

    let cfg = load_config_default().unwrap();
    assert_eq!(cfg.base_url, "http://from-file");
    assert_eq!(cfg.state_path.to_str(), Some("/tmp/ticker-state.json"));

    env::remove_var("TICKER_CONFIG_PATH");
    env::remove_var("TICKER_STATE_PATH");
}
