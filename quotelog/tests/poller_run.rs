mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{TimedSource, closed_time, open_time};
use quotelog::Poller;

fn timed_poller(src: &TimedSource, dir: &std::path::Path, calls_per_hour: f64) -> Poller {
    Poller::builder()
        .with_source(Arc::new(src.clone()))
        .instruments(["AAPL", "KO"])
        .calls_per_hour(calls_per_hour)
        .data_dir(dir)
        .wall_clock(open_time)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn calls_are_spaced_by_the_budget() {
    let src = TimedSource::default();
    let dir = tempfile::tempdir().unwrap();
    let mut p = timed_poller(&src, dir.path(), 400.0);
    assert_eq!(p.spacing(), Duration::from_secs(9));

    let state = p
        .run_until(tokio::time::sleep(Duration::from_secs(40)))
        .await;

    let starts = src.starts();
    assert_eq!(starts.len(), 5, "ticks at 0, 9, 18, 27 and 36 s");
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(9));
    }
    assert_eq!(src.instruments(), vec!["AAPL", "KO", "AAPL", "KO", "AAPL"]);
    assert_eq!(state.next_instrument_index, 1);
}

#[tokio::test(start_paused = true)]
async fn closed_market_keeps_ticking_without_calls() {
    let src = TimedSource::default();
    let dir = tempfile::tempdir().unwrap();
    let mut p = Poller::builder()
        .with_source(Arc::new(src.clone()))
        .instruments(["AAPL"])
        .calls_per_hour(3600.0)
        .data_dir(dir.path())
        .wall_clock(closed_time)
        .build()
        .unwrap();

    let state = p
        .run_until(tokio::time::sleep(Duration::from_secs(30)))
        .await;

    assert!(src.starts().is_empty());
    assert!(state.last_tick_at.is_some());
    assert_eq!(state.last_call_at, None);
}

#[tokio::test(start_paused = true)]
async fn run_keeps_writing_across_iterations() {
    let src = TimedSource::default();
    let dir = tempfile::tempdir().unwrap();
    let mut p = timed_poller(&src, dir.path(), 7200.0);

    p.run_until(tokio::time::sleep(Duration::from_millis(2_100)))
        .await;

    let body = std::fs::read_to_string(dir.path().join("AAPL20241008.csv")).unwrap();
    assert_eq!(body.lines().count(), 1 + 3, "header plus ticks at 0, 1 and 2 s");
}
