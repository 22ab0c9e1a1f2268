use std::time::Duration;

use quotelog_core::{QuoteSource, QuotelogError, Snapshot};
use quotelog_mock::{DynamicMockSource, MockBehavior};

fn snap(sym: &str, px: f64) -> Snapshot {
    Snapshot::new().with("symbol", sym).with("currentPrice", px)
}

#[tokio::test]
async fn test_mock_snapshot_return() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    controller
        .set_behavior("AAPL", MockBehavior::Return(snap("AAPL", 190.0)))
        .await;

    let got = mock.snapshot("AAPL").await.expect("snapshot ok");
    assert_eq!(got, snap("AAPL", 190.0));
    assert_eq!(mock.name(), "P0");
}

#[tokio::test]
async fn test_mock_snapshot_fail() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    let err = QuotelogError::source("P0", "boom");
    controller
        .set_behavior("MSFT", MockBehavior::Fail(err.clone()))
        .await;

    let got = mock.snapshot("MSFT").await.expect_err("err");
    assert_eq!(got, err);
}

#[tokio::test]
async fn test_queued_behaviors_run_before_standing_rule() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    controller
        .set_behavior("KO", MockBehavior::Return(snap("KO", 60.0)))
        .await;
    controller
        .push_behavior("KO", MockBehavior::Fail(QuotelogError::source("P0", "once")))
        .await;

    assert!(mock.snapshot("KO").await.is_err());
    assert_eq!(mock.snapshot("KO").await.unwrap(), snap("KO", 60.0));
}

#[tokio::test]
async fn test_unscripted_symbol_is_not_found_and_logged() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    let err = mock.snapshot("ZZZ").await.expect_err("err");
    assert!(matches!(err, QuotelogError::NotFound { .. }));
    let _ = mock.snapshot("AAPL").await;
    assert_eq!(controller.calls().await, vec!["ZZZ", "AAPL"]);

    controller.clear_all_behaviors().await;
    assert!(controller.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hang_never_resolves() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    controller.set_behavior("AAPL", MockBehavior::Hang).await;
    let res = tokio::time::timeout(Duration::from_secs(5), mock.snapshot("AAPL")).await;
    assert!(res.is_err());
}
