use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the quotelog workspace.
///
/// Source-side failures (unavailable, timed out, malformed) are isolated per call by
/// the scheduler; configuration failures are fatal at startup; storage failures carry
/// the offending path.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuotelogError {
    /// A quote source call failed (transport, HTTP status, rate limit, ...).
    #[error("{source_name} failed: {msg}")]
    Source {
        /// Name of the quote source that failed.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A quote source call exceeded the configured timeout.
    #[error("source timed out: {instrument} via {source_name}")]
    SourceTimeout {
        /// Name of the quote source that timed out.
        source_name: String,
        /// Instrument being polled.
        instrument: String,
    },

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "quote for AAPL".
        what: String,
    },

    /// Issues with the returned or expected data (missing identifier, undecodable body).
    #[error("data issue: {0}")]
    Data(String),

    /// The configuration cannot be used; raised before any polling begins.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Filesystem failure while reading or writing a daily file.
    #[error("io error at {path}: {msg}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error message.
        msg: String,
    },

    /// A daily file could not be encoded or decoded as CSV.
    #[error("csv error at {path}: {msg}")]
    Csv {
        /// Path being accessed.
        path: String,
        /// Underlying error message.
        msg: String,
    },
}

impl QuotelogError {
    /// Helper: build a `Source` error with the source name and message.
    pub fn source(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `SourceTimeout` error.
    pub fn source_timeout(source_name: impl Into<String>, instrument: impl Into<String>) -> Self {
        Self::SourceTimeout {
            source_name: source_name.into(),
            instrument: instrument.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ConfigInvalid` error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigInvalid(msg.into())
    }

    /// Helper: build an `Io` error from a path and any displayable cause.
    pub fn io(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            msg: err.to_string(),
        }
    }

    /// Helper: build a `Csv` error from a path and any displayable cause.
    pub fn csv(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::Csv {
            path: path.as_ref().display().to_string(),
            msg: err.to_string(),
        }
    }

    /// Returns true if this error came from a quote source call.
    ///
    /// These are the failures the scheduler isolates to a single iteration.
    #[must_use]
    pub const fn is_source_failure(&self) -> bool {
        matches!(
            self,
            Self::Source { .. } | Self::SourceTimeout { .. } | Self::NotFound { .. } | Self::Data(_)
        )
    }

    /// Returns true if this error must stop the process before polling starts.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigInvalid(_))
    }
}
