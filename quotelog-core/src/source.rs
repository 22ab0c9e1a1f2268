use std::sync::Arc;

use async_trait::async_trait;

use quotelog_types::{QuotelogError, Snapshot};

/// Remote quote provider polled by the scheduler.
///
/// Implementations return one field-to-value mapping per call. Every field is
/// optional except the instrument identifier; latency and availability are outside
/// the caller's control.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Stable source name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Fetch a point-in-time snapshot for `instrument`.
    async fn snapshot(&self, instrument: &str) -> Result<Snapshot, QuotelogError>;
}

#[async_trait]
impl<T: QuoteSource + ?Sized> QuoteSource for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn snapshot(&self, instrument: &str) -> Result<Snapshot, QuotelogError> {
        (**self).snapshot(instrument).await
    }
}
