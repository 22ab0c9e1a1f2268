//! Snapshot, configuration and error types shared by every quotelog crate.
#![warn(missing_docs)]

mod config;
mod error;
mod snapshot;

pub use config::{MarketHours, PollerConfig};
pub use error::QuotelogError;
pub use snapshot::{FieldValue, NA, Snapshot, TIMESTAMP_FIELD};
