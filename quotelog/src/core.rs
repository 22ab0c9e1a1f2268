use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quotelog_core::{
    MarketClock, MarketHours, PollerConfig, QuoteSource, QuotelogError, RateBudget, SnapshotStore,
};

/// Wall-clock reader consulted by the market clock on every iteration.
pub type WallClock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Polls one quote source for a fixed list of instruments and appends every
/// snapshot to the daily files.
pub struct Poller {
    pub(crate) source: Arc<dyn QuoteSource>,
    pub(crate) store: SnapshotStore,
    pub(crate) clock: MarketClock,
    pub(crate) budget: RateBudget,
    pub(crate) instruments: Vec<String>,
    pub(crate) identifier_field: String,
    pub(crate) provider_timeout: Duration,
    pub(crate) wall_clock: WallClock,
}

/// Builder for constructing a `Poller` with custom configuration.
pub struct PollerBuilder {
    source: Option<Arc<dyn QuoteSource>>,
    cfg: PollerConfig,
    wall_clock: WallClock,
}

impl Default for PollerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PollerBuilder {
    /// Create a new builder with the defaults of [`PollerConfig`].
    ///
    /// Behavior and trade-offs:
    /// - Starts with no source and no instruments; both are required by [`build`](Self::build).
    /// - Defaults are conservative: 400 calls per hour (one call every 9 s), a
    ///   12:00-21:00 UTC window, and a 30 s per-call timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            cfg: PollerConfig::default(),
            wall_clock: Arc::new(Utc::now),
        }
    }

    /// Start from an already loaded configuration.
    #[must_use]
    pub fn from_config(cfg: PollerConfig) -> Self {
        Self {
            cfg,
            ..Self::new()
        }
    }

    /// Register the quote source.
    ///
    /// Behavior and trade-offs:
    /// - Exactly one source is polled; registering again replaces the previous one.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn QuoteSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the instruments, in round-robin order.
    ///
    /// Behavior and trade-offs:
    /// - Every instrument gets `1 / n` of the hourly budget. Adding instruments
    ///   lowers how often each one is sampled; it never raises the call rate.
    #[must_use]
    pub fn instruments<I, S>(mut self, instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cfg.tickers = instruments.into_iter().map(Into::into).collect();
        self
    }

    /// Set the global hourly call ceiling.
    #[must_use]
    pub const fn calls_per_hour(mut self, calls: f64) -> Self {
        self.cfg.calls_per_hour = calls;
        self
    }

    /// Set the directory holding the daily files.
    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.data_dir = dir.into();
        self
    }

    /// Set the snapshot field that must carry the instrument identifier.
    #[must_use]
    pub fn identifier_field(mut self, field: impl Into<String>) -> Self {
        self.cfg.identifier_field = field.into();
        self
    }

    /// Set the open window of the market clock.
    #[must_use]
    pub const fn market_hours(mut self, hours: MarketHours) -> Self {
        self.cfg.market_hours = hours;
        self
    }

    /// Set the per-call timeout, in whole seconds.
    ///
    /// Behavior and trade-offs:
    /// - A call that exceeds it is recorded as a `SourceTimeout` and skipped; the
    ///   round-robin index still advances.
    #[must_use]
    pub const fn provider_timeout_secs(mut self, secs: u64) -> Self {
        self.cfg.provider_timeout_secs = secs;
        self
    }

    /// Replace the wall-clock reader used by the market clock in `run`.
    #[must_use]
    pub fn wall_clock<F>(mut self, now: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.wall_clock = Arc::new(now);
        self
    }

    /// Build the `Poller`.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` if no source has been registered or if the
    /// configuration fails [`PollerConfig::validate`].
    pub fn build(self) -> Result<Poller, QuotelogError> {
        let Some(source) = self.source else {
            return Err(QuotelogError::config(
                "no quote source registered; add one via with_source(...)",
            ));
        };
        self.cfg.validate()?;
        let budget = RateBudget::new(self.cfg.calls_per_hour)?;
        Ok(Poller {
            source,
            store: SnapshotStore::new(self.cfg.data_dir.clone()),
            clock: MarketClock::new(self.cfg.market_hours),
            budget,
            provider_timeout: self.cfg.provider_timeout(),
            instruments: self.cfg.tickers,
            identifier_field: self.cfg.identifier_field,
            wall_clock: self.wall_clock,
        })
    }
}

impl Poller {
    /// Start building a new `Poller`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use quotelog::Poller;
    /// use quotelog_yahoo::YahooSource;
    ///
    /// let mut poller = Poller::builder()
    ///     .with_source(Arc::new(YahooSource::try_new_default()?))
    ///     .instruments(["AAPL", "KO", "VFIAX"])
    ///     .calls_per_hour(400.0)
    ///     .data_dir("workdir")
    ///     .build()?;
    /// poller.run().await;
    /// ```
    #[must_use]
    pub fn builder() -> PollerBuilder {
        PollerBuilder::new()
    }

    /// Build directly from a loaded configuration and a source.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` if the configuration fails validation.
    pub fn from_config(cfg: PollerConfig, source: Arc<dyn QuoteSource>) -> Result<Self, QuotelogError> {
        PollerBuilder::from_config(cfg).with_source(source).build()
    }

    /// Instruments in polling order.
    #[must_use]
    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Spacing between consecutive iterations.
    #[must_use]
    pub fn spacing(&self) -> Duration {
        self.budget.spacing()
    }

    /// The market clock in use.
    #[must_use]
    pub const fn clock(&self) -> &MarketClock {
        &self.clock
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Wrap a source future with a timeout and standardized timeout error mapping.
    #[tracing::instrument(
        name = "quotelog::core::provider_call_with_timeout",
        skip(fut),
        fields(
            source = source_name,
            instrument = instrument,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        ),
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        source_name: &'static str,
        instrument: &str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, QuotelogError>
    where
        Fut: core::future::Future<Output = Result<T, QuotelogError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(QuotelogError::source_timeout(source_name, instrument)))
    }
}
