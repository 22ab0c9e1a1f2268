//! quotelog polls a quote source on a fixed budget and keeps every snapshot in
//! per-instrument daily CSV files, which can later be stitched into series.
//!
//! Overview
//! - One source, many instruments, polled round-robin.
//! - A global hourly call budget sets a fixed spacing between iterations.
//! - A market clock decides, on every iteration, whether to poll or idle.
//! - Each failure (source, timeout, malformed snapshot, storage) stays confined
//!   to its own iteration.
//!
//! Key behaviors and trade-offs
//! - Spacing: iterations are scheduled from the previous tick, not from the end of
//!   the previous call, so a slow call eats into the wait instead of delaying the
//!   schedule. Calls still never start closer than the spacing.
//! - Fairness: the index advances even when a call fails, so one broken instrument
//!   cannot starve the others.
//! - Storage: a daily file's header is fixed by its first snapshot. Fields that
//!   appear later in the day are dropped until the next day's file.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use quotelog::{Poller, PollerConfig};
//! use quotelog_yahoo::YahooSource;
//!
//! let cfg = PollerConfig::load("parameters.json")?;
//! let mut poller = Poller::from_config(cfg, Arc::new(YahooSource::try_new_default()?))?;
//! poller.run().await;
//! ```
//!
//! Stitching a field, with a fallback for days that lack it:
//! ```rust,ignore
//! use quotelog::SeriesStitcher;
//!
//! let files = store.daily_files("VFIAX")?;
//! let stitcher = SeriesStitcher::open(files.iter().map(|f| &f.path))?;
//! let prices = stitcher.stitch("currentPrice", Some("navPrice"));
//! ```
#![warn(missing_docs)]

/// Helpers shared by the binaries.
pub mod cli;
pub(crate) mod core;
mod scheduler;

pub use core::{Poller, PollerBuilder, WallClock};
pub use scheduler::{SchedulerState, Step};

// Re-export core types for convenience
pub use quotelog_core::{
    Cell, DailyFile, DailyTable, FieldRequest, FieldValue, ForwardFill, MarketClock, MarketHours,
    MarketSession, NA, PollerConfig, QuoteSource, QuotelogError, RateBudget, SeriesStitcher,
    Snapshot, SnapshotStore, SpanOutcome, Stitched, StitchedSeries, TIMESTAMP_FIELD, stitch,
};
