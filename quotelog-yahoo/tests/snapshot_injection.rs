#![cfg(feature = "test-adapters")]

use quotelog_core::{FieldValue, QuoteSource, QuotelogError};
use quotelog_yahoo::{YahooSource, adapter};

fn meta(json: &str) -> serde_json::Map<String, serde_json::Value> {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn snapshot_uses_injected_adapter() {
    let chart = <dyn adapter::YahooChart>::from_fn(|symbol| {
        assert_eq!(symbol, "AAPL");
        Ok(meta(
            r#"{"currency":"USD","symbol":"AAPL","regularMarketPrice":227.5,
                "validRanges":["1d","5d"],"longName":null}"#,
        ))
    });
    let yf = YahooSource::from_chart(chart);

    let snap = yf.snapshot("AAPL").await.unwrap();
    assert_eq!(
        snap.field_names().collect::<Vec<_>>(),
        vec!["currency", "symbol", "regularMarketPrice", "longName"]
    );
    assert_eq!(snap.identifier("symbol"), Some("AAPL"));
    assert_eq!(snap.get("regularMarketPrice"), Some(&FieldValue::Number(227.5)));
}

#[tokio::test]
async fn source_error_preserves_source_name() {
    let chart = <dyn adapter::YahooChart>::from_fn(|_| {
        Err(QuotelogError::source("reqwest", "connection reset"))
    });
    let err = YahooSource::from_chart(chart).snapshot("AAPL").await.unwrap_err();
    match err {
        QuotelogError::Source { source_name, .. } => assert_eq!(source_name, "quotelog-yahoo"),
        other => panic!("expected source error, got {other:?}"),
    }
}

#[tokio::test]
async fn not_found_message_maps_to_not_found() {
    let chart = <dyn adapter::YahooChart>::from_fn(|_| {
        Err(QuotelogError::source("quotelog-yahoo", "No data found, symbol may be delisted"))
    });
    let err = YahooSource::from_chart(chart).snapshot("ZZZ").await.unwrap_err();
    assert!(matches!(err, QuotelogError::NotFound { .. }));
}

#[tokio::test]
async fn meta_without_scalars_is_a_data_error() {
    let chart = <dyn adapter::YahooChart>::from_fn(|_| Ok(meta(r#"{"validRanges":["1d"]}"#)));
    let err = YahooSource::from_chart(chart).snapshot("AAPL").await.unwrap_err();
    assert!(matches!(err, QuotelogError::Data(_)));
}
