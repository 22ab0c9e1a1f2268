//! quotelog-core
//!
//! Building blocks shared by the quotelog poller and the analysis tools.
//!
//! - `clock`: the open/closed market policy.
//! - `budget`: converts an hourly call budget into a fixed spacing between calls.
//! - `source`: the `QuoteSource` trait every quote provider implements.
//! - `store`: append-only daily CSV files keyed by instrument and UTC day.
//! - `series`: reads daily files back and stitches them into numeric series.
//!
//! Nothing here owns a runtime. `QuoteSource` is an `async_trait` and is expected to
//! be driven by Tokio; the store and the stitcher are synchronous.
//!
#![warn(missing_docs)]

/// Hourly call budget and the spacing it implies.
pub mod budget;
/// Market open/closed policy.
pub mod clock;
/// Daily file reading and series stitching.
pub mod series;
/// Quote source contract.
pub mod source;
/// Daily snapshot files.
pub mod store;

pub use budget::RateBudget;
pub use clock::{MarketClock, MarketSession};
pub use series::{
    Cell, DailyTable, FieldRequest, ForwardFill, SeriesStitcher, SpanOutcome, Stitched,
    StitchedSeries, stitch,
};
pub use source::QuoteSource;
pub use store::{DailyFile, SnapshotStore};

pub use quotelog_types::{
    FieldValue, MarketHours, NA, PollerConfig, QuotelogError, Snapshot, TIMESTAMP_FIELD,
};
