mod helpers;

use std::sync::Arc;

use helpers::{closed_time, dt, open_time};
use quotelog::{DailyTable, Poller, QuotelogError, SchedulerState, Snapshot, Step};
use quotelog_mock::{DynamicMockSource, MockBehavior, MockSource};

fn poller(dir: &std::path::Path, tickers: &[&str]) -> Poller {
    Poller::builder()
        .with_source(Arc::new(MockSource::new()))
        .instruments(tickers.iter().copied())
        .data_dir(dir)
        .build()
        .expect("poller builds")
}

#[tokio::test]
async fn closed_market_idles_without_calling() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    let dir = tempfile::tempdir().unwrap();
    let mut p = Poller::builder()
        .with_source(mock)
        .instruments(["AAPL"])
        .data_dir(dir.path())
        .build()
        .unwrap();
    let mut state = SchedulerState::default();

    assert_eq!(p.step(&mut state, closed_time()).await, Step::Idle);
    assert_eq!(p.step(&mut state, dt(2024, 10, 8, 21, 0, 0)).await, Step::Idle);
    assert!(controller.calls().await.is_empty());
    assert_eq!(state, SchedulerState::default());
}

#[tokio::test]
async fn open_market_records_to_the_daily_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = poller(dir.path(), &["AAPL"]);
    let mut state = SchedulerState::default();

    let step = p.step(&mut state, open_time()).await;
    let expected = dir.path().join("AAPL20241008.csv");
    assert_eq!(
        step,
        Step::Recorded {
            instrument: "AAPL".into(),
            path: expected.clone()
        }
    );
    assert_eq!(state.last_call_at, Some(open_time()));

    let table = DailyTable::load(&expected).unwrap().unwrap();
    assert_eq!(table.header().first().map(String::as_str), Some("symbol"));
    assert_eq!(table.header().last().map(String::as_str), Some("timestamp"));
    assert_eq!(table.raw(0, "currentPrice"), Some("190"));
}

#[tokio::test]
async fn round_robin_wraps_around() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    for sym in ["A", "B", "C"] {
        controller
            .set_behavior(sym, MockBehavior::Return(Snapshot::new().with("symbol", sym)))
            .await;
    }
    let dir = tempfile::tempdir().unwrap();
    let mut p = Poller::builder()
        .with_source(mock)
        .instruments(["A", "B", "C"])
        .data_dir(dir.path())
        .build()
        .unwrap();
    let mut state = SchedulerState::default();

    for _ in 0..5 {
        p.step(&mut state, open_time()).await;
    }
    assert_eq!(controller.calls().await, vec!["A", "B", "C", "A", "B"]);
    assert_eq!(state.next_instrument_index, 2);
}

#[tokio::test]
async fn source_failure_is_isolated_and_index_advances() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = poller(dir.path(), &["AAPL", "FAIL", "KO"]);
    let mut state = SchedulerState::default();

    assert!(matches!(p.step(&mut state, open_time()).await, Step::Recorded { .. }));
    match p.step(&mut state, open_time()).await {
        Step::SourceFailed { instrument, error } => {
            assert_eq!(instrument, "FAIL");
            assert!(error.is_source_failure());
        }
        other => panic!("expected source failure, got {other:?}"),
    }
    assert!(matches!(p.step(&mut state, open_time()).await, Step::Recorded { ref instrument, .. } if instrument == "KO"));
    assert!(!dir.path().join("FAIL20241008.csv").exists());
}

#[tokio::test(start_paused = true)]
async fn slow_source_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = Poller::builder()
        .with_source(Arc::new(MockSource::new()))
        .instruments(["TIMEOUT", "KO"])
        .provider_timeout_secs(5)
        .data_dir(dir.path())
        .build()
        .unwrap();
    let mut state = SchedulerState::default();

    let step = p.step(&mut state, open_time()).await;
    assert_eq!(
        step,
        Step::SourceFailed {
            instrument: "TIMEOUT".into(),
            error: QuotelogError::source_timeout("quotelog-mock", "TIMEOUT"),
        }
    );
    assert_eq!(state.next_instrument_index, 1);
}

#[tokio::test]
async fn snapshot_without_identifier_is_rejected() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    controller
        .set_behavior(
            "KO",
            MockBehavior::Return(Snapshot::new().with("currentPrice", 60.0)),
        )
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut p = Poller::builder()
        .with_source(mock)
        .instruments(["KO"])
        .data_dir(dir.path())
        .build()
        .unwrap();

    let step = p.step(&mut SchedulerState::default(), open_time()).await;
    assert!(matches!(
        step,
        Step::SourceFailed {
            error: QuotelogError::Data(_),
            ..
        }
    ));
    assert!(p.store().daily_files("KO").unwrap().is_empty());
}

#[tokio::test]
async fn store_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();
    let mut p = poller(&blocker, &["AAPL", "KO"]);
    let mut state = SchedulerState::default();

    assert!(matches!(
        p.step(&mut state, open_time()).await,
        Step::StoreFailed { .. }
    ));
    assert!(matches!(
        p.step(&mut state, open_time()).await,
        Step::StoreFailed { ref instrument, .. } if instrument == "KO"
    ));
}

#[tokio::test]
async fn builder_rejects_bad_configuration() {
    let no_source = Poller::builder().instruments(["AAPL"]).build();
    assert!(matches!(no_source, Err(QuotelogError::ConfigInvalid(_))));

    let no_instruments = Poller::builder()
        .with_source(Arc::new(MockSource::new()))
        .build();
    assert!(matches!(no_instruments, Err(QuotelogError::ConfigInvalid(_))));

    let zero_budget = Poller::builder()
        .with_source(Arc::new(MockSource::new()))
        .instruments(["AAPL"])
        .calls_per_hour(0.0)
        .build();
    assert!(matches!(zero_budget, Err(QuotelogError::ConfigInvalid(_))));
}
