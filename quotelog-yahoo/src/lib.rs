//! quotelog-yahoo
//!
//! Quote source backed by the Yahoo Finance v8 chart endpoint. Each call fetches
//! `chart.result[0].meta` for one symbol and flattens its scalar members into a
//! [`Snapshot`], keeping the response's key order.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;

use std::sync::Arc;

use adapter::{RealAdapter, SOURCE_NAME, YahooChart};
use async_trait::async_trait;
use quotelog_core::{QuoteSource, QuotelogError, Snapshot};

#[cfg(feature = "test-adapters")]
type ChartAdapter = Arc<dyn YahooChart>;
#[cfg(not(feature = "test-adapters"))]
type ChartAdapter = Arc<RealAdapter>;

/// Public source type. Production users will construct with `YahooSource::try_new_default()`.
pub struct YahooSource {
    chart: ChartAdapter,
}

impl YahooSource {
    /// Source name used in logs and errors.
    pub const NAME: &'static str = SOURCE_NAME;

    fn looks_like_not_found(msg: &str) -> bool {
        let m = msg.to_ascii_lowercase();
        m.contains("not found") || m.contains("no data") || m.contains("delisted")
    }

    fn normalize_error(e: QuotelogError, what: &str) -> QuotelogError {
        match e {
            QuotelogError::Source { source_name: _, msg } => {
                if Self::looks_like_not_found(&msg) {
                    QuotelogError::not_found(what.to_string())
                } else {
                    QuotelogError::source(SOURCE_NAME, msg)
                }
            }
            other => other,
        }
    }

    /// Build with a fresh HTTP client against the public endpoint.
    ///
    /// # Errors
    /// Returns `Source` if the HTTP client cannot be constructed.
    pub fn try_new_default() -> Result<Self, QuotelogError> {
        let a = RealAdapter::try_new_default()?;
        Ok(Self::from_adapter(&a))
    }

    /// Build from a provided `reqwest::Client` and base URL.
    #[must_use]
    pub fn new_with_reqwest_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self::from_adapter(&RealAdapter::new(http, base_url))
    }

    /// Build from a concrete `RealAdapter`.
    #[must_use]
    pub fn from_adapter(adapter: &RealAdapter) -> Self {
        Self {
            chart: Arc::new(adapter.clone()),
        }
    }

    /// For tests/injection (requires the `test-adapters` feature).
    #[cfg(feature = "test-adapters")]
    #[must_use]
    pub fn from_chart(chart: Arc<dyn YahooChart>) -> Self {
        Self { chart }
    }
}

#[async_trait]
impl QuoteSource for YahooSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "quotelog_yahoo::snapshot",
            skip(self),
            fields(instrument = %instrument),
        )
    )]
    async fn snapshot(&self, instrument: &str) -> Result<Snapshot, QuotelogError> {
        let what = format!("snapshot for {instrument}");
        let meta = self
            .chart
            .meta(instrument)
            .await
            .map_err(|e| Self::normalize_error(e, &what))?;
        let snap = Snapshot::from_json_object(&meta);
        if snap.is_empty() {
            return Err(QuotelogError::Data(format!("{what}: no scalar fields")));
        }
        Ok(snap)
    }
}
