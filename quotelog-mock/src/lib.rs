//! Mock quote sources for tests and demos.
//!
//! [`MockSource`] serves fixed fixtures and never touches the network.
//! [`DynamicMockSource`] is scripted at runtime through a [`DynamicMockController`].
#![warn(missing_docs)]

use std::time::Duration;

use async_trait::async_trait;
use quotelog_core::{QuoteSource, QuotelogError, Snapshot};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};

/// How long the `TIMEOUT` symbol stalls; longer than any sensible call timeout.
pub const TIMEOUT_DELAY: Duration = Duration::from_secs(120);

/// Quote source backed by static fixtures.
///
/// Known symbols: `AAPL`, `MSFT`, `KO` and `VFIAX` (which reports `navPrice` in
/// place of `currentPrice`). `FAIL` always errors, `TIMEOUT` sleeps for
/// [`TIMEOUT_DELAY`], and anything else is `NotFound`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSource;

impl MockSource {
    /// Create the mock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuoteSource for MockSource {
    fn name(&self) -> &'static str {
        "quotelog-mock"
    }

    async fn snapshot(&self, instrument: &str) -> Result<Snapshot, QuotelogError> {
        match instrument {
            "FAIL" => {
                return Err(QuotelogError::source(
                    self.name(),
                    "forced failure: snapshot",
                ));
            }
            "TIMEOUT" => tokio::time::sleep(TIMEOUT_DELAY).await,
            _ => {}
        }
        fixtures::snapshots::by_symbol(instrument)
            .ok_or_else(|| QuotelogError::not_found(format!("snapshot for {instrument}")))
    }
}
