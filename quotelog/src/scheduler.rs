use std::future::Future;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use quotelog_core::QuotelogError;
use tokio::time::Instant;

use crate::core::Poller;

/// Loop state carried from one iteration to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    /// Position in the instrument list of the next call.
    pub next_instrument_index: usize,
    /// Wall-clock time of the most recent source call.
    pub last_call_at: Option<DateTime<Utc>>,
    /// Monotonic time the most recent iteration started.
    pub last_tick_at: Option<Instant>,
}

/// Result of one scheduler iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The market was closed; no call was made.
    Idle,
    /// A snapshot was appended to `path`.
    Recorded {
        /// Instrument polled.
        instrument: String,
        /// Daily file written.
        path: PathBuf,
    },
    /// The source failed, timed out or returned an unusable snapshot.
    SourceFailed {
        /// Instrument polled.
        instrument: String,
        /// What went wrong.
        error: QuotelogError,
    },
    /// The snapshot could not be written.
    StoreFailed {
        /// Instrument polled.
        instrument: String,
        /// What went wrong.
        error: QuotelogError,
    },
}

impl Poller {
    /// Run exactly one iteration at wall-clock time `now`.
    ///
    /// When the market is open, polls the next instrument, checks the identifier
    /// field, stamps the snapshot with `now` and appends it. The round-robin index
    /// advances whatever the outcome. Failures are logged and returned, never raised.
    #[tracing::instrument(
        name = "quotelog::poller::step",
        skip(self, state),
        fields(index = state.next_instrument_index),
    )]
    pub async fn step(&mut self, state: &mut SchedulerState, now: DateTime<Utc>) -> Step {
        if !self.clock.is_open(now) {
            tracing::info!("pulse");
            return Step::Idle;
        }

        let idx = state.next_instrument_index % self.instruments.len();
        state.next_instrument_index = (idx + 1) % self.instruments.len();
        state.last_call_at = Some(now);
        let instrument = self.instruments[idx].clone();

        let fetched = Self::provider_call_with_timeout(
            self.source.name(),
            &instrument,
            self.provider_timeout,
            self.source.snapshot(&instrument),
        )
        .await
        .and_then(|snap| {
            if snap.identifier(&self.identifier_field).is_some() {
                Ok(snap)
            } else {
                Err(QuotelogError::Data(format!(
                    "snapshot for {instrument} has no {} field",
                    self.identifier_field
                )))
            }
        });

        let snapshot = match fetched {
            Ok(s) => s,
            Err(error) => {
                tracing::warn!(instrument = %instrument, error = %error, "source call failed");
                return Step::SourceFailed { instrument, error };
            }
        };

        match self.store.record(&instrument, now, snapshot) {
            Ok(path) => {
                tracing::info!(instrument = %instrument, path = %path.display(), "snapshot recorded");
                Step::Recorded { instrument, path }
            }
            Err(error) => {
                tracing::error!(instrument = %instrument, error = %error, "failed to store snapshot");
                Step::StoreFailed { instrument, error }
            }
        }
    }

    /// Poll forever.
    ///
    /// Iterations start at `t0, t0 + s, t0 + 2s, ...` where `s` is the budget
    /// spacing; closed-market iterations keep the same cadence. Only process
    /// termination stops the loop.
    pub async fn run(&mut self) {
        self.run_until(std::future::pending::<()>()).await;
    }

    /// Poll until `stop` resolves, then return the loop state.
    ///
    /// `stop` is checked while waiting for the next tick and during a source call;
    /// an in-flight call is dropped when it fires.
    pub async fn run_until<F>(&mut self, stop: F) -> SchedulerState
    where
        F: Future<Output = ()>,
    {
        let spacing = self.spacing();
        let mut state = SchedulerState::default();
        tokio::pin!(stop);

        tracing::info!(
            instruments = self.instruments.len(),
            spacing_ms = u64::try_from(spacing.as_millis()).unwrap_or(u64::MAX),
            source = self.source.name(),
            "poller started"
        );

        loop {
            if let Some(last) = state.last_tick_at {
                let stopped = tokio::select! {
                    biased;
                    () = &mut stop => true,
                    () = tokio::time::sleep_until(last + spacing) => false,
                };
                if stopped {
                    return state;
                }
            }

            state.last_tick_at = Some(Instant::now());
            let now = (self.wall_clock)();
            let stopped = tokio::select! {
                biased;
                () = &mut stop => true,
                _ = self.step(&mut state, now) => false,
            };
            if stopped {
                return state;
            }
        }
    }
}
